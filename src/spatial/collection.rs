//! Read-only feature collections with nearest-feature lookup.

use hashbrown::HashMap;
use tracing::{debug, info};

use super::index::{distance_2, FeatureIndex};
use crate::error::{AccessError, Result};
use crate::models::{Category, Feature, GeoPoint, NearestResult};

/// Ordered features of one category, indexed for nearest lookups.
///
/// Positions are projected to EPSG:3857 once at construction; the
/// collection is never mutated afterwards.
pub struct FeatureCollection {
    category: Category,
    features: Vec<Feature>,
    planar: Vec<[f64; 2]>,
    by_id: HashMap<i64, usize>,
    index: FeatureIndex,
}

impl FeatureCollection {
    /// Build a collection, rejecting duplicate ids and unprojectable points
    pub fn new(category: Category, features: Vec<Feature>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(features.len());
        let mut planar = Vec::with_capacity(features.len());

        for (position, feature) in features.iter().enumerate() {
            if feature.category != category {
                return Err(AccessError::dataset(
                    category.to_string(),
                    format!(
                        "feature {} belongs to '{}', not '{}'",
                        feature.id, feature.category, category
                    ),
                ));
            }

            feature.location.validate().map_err(|e| {
                AccessError::dataset(category.to_string(), format!("feature {}: {}", feature.id, e))
            })?;

            if by_id.insert(feature.id, position).is_some() {
                return Err(AccessError::DuplicateFeatureId {
                    id: feature.id,
                    category,
                });
            }

            let p = feature.location.to_planar();
            planar.push([p.x(), p.y()]);
        }

        let index = FeatureIndex::build(&planar);
        info!("Collection '{}' ready with {} features", category, features.len());

        Ok(Self {
            category,
            features,
            planar,
            by_id,
            index,
        })
    }

    pub fn empty(category: Category) -> Self {
        Self {
            category,
            features: Vec::new(),
            planar: Vec::new(),
            by_id: HashMap::new(),
            index: FeatureIndex::build(&[]),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features in stored order
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn get(&self, id: i64) -> Option<&Feature> {
        self.by_id.get(&id).map(|&position| &self.features[position])
    }

    /// Nearest feature to `point` using the R-tree
    pub fn find_nearest(&self, point: &GeoPoint) -> Option<NearestResult<'_>> {
        let query = point.to_planar();
        let (position, distance) = self.index.nearest([query.x(), query.y()])?;

        debug!(
            "Nearest {} to ({}, {}): id={} at {:.1}m",
            self.category,
            point.x,
            point.y,
            self.features[position].id,
            distance
        );

        Some(NearestResult {
            feature: &self.features[position],
            distance,
        })
    }

    /// Brute-force scan with the same tie-break as [`Self::find_nearest`]
    pub fn find_nearest_linear(&self, point: &GeoPoint) -> Option<NearestResult<'_>> {
        let query = point.to_planar();
        let query = [query.x(), query.y()];

        let mut best: Option<(usize, f64)> = None;
        for (position, candidate) in self.planar.iter().enumerate() {
            let d2 = distance_2(candidate, &query);
            match best {
                Some((_, best_d2)) if d2 >= best_d2 => {}
                _ => best = Some((position, d2)),
            }
        }

        best.map(|(position, d2)| NearestResult {
            feature: &self.features[position],
            distance: d2.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stop(id: i64, x: f64, y: f64) -> Feature {
        Feature::new(id, Category::Stop, GeoPoint::web_mercator(x, y))
    }

    #[test]
    fn test_empty_collection_has_no_nearest() {
        let collection = FeatureCollection::empty(Category::Medical);
        assert!(collection.find_nearest(&GeoPoint::wgs84(0.0, 0.0)).is_none());
        assert!(collection.find_nearest_linear(&GeoPoint::wgs84(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = FeatureCollection::new(Category::Stop, vec![stop(1, 0.0, 0.0), stop(1, 5.0, 5.0)]);
        assert!(matches!(
            result,
            Err(AccessError::DuplicateFeatureId { id: 1, .. })
        ));
    }

    #[test]
    fn test_category_mismatch_rejected() {
        let medical = Feature::new(7, Category::Medical, GeoPoint::web_mercator(0.0, 0.0));
        assert!(FeatureCollection::new(Category::Stop, vec![medical]).is_err());
    }

    #[test]
    fn test_lookup_by_id() {
        let collection =
            FeatureCollection::new(Category::Stop, vec![stop(10, 0.0, 0.0), stop(20, 5.0, 5.0)]).unwrap();
        assert_eq!(collection.get(20).map(|f| f.location.x), Some(5.0));
        assert!(collection.get(30).is_none());
    }

    #[test]
    fn test_tie_returns_first_in_stored_order() {
        let collection = FeatureCollection::new(
            Category::Stop,
            vec![stop(5, 50.0, 0.0), stop(3, -50.0, 0.0), stop(1, 0.0, 50.0)],
        )
        .unwrap();

        let origin = GeoPoint::web_mercator(0.0, 0.0);
        assert_eq!(collection.find_nearest(&origin).unwrap().feature.id, 5);
        assert_eq!(collection.find_nearest_linear(&origin).unwrap().feature.id, 5);
    }

    #[test]
    fn test_geographic_query_against_projected_features() {
        let collection =
            FeatureCollection::new(Category::Stop, vec![stop(1, 3000.0, 4000.0), stop(2, 100.0, 0.0)]).unwrap();
        let nearest = collection.find_nearest(&GeoPoint::wgs84(0.0, 0.0)).unwrap();
        assert_eq!(nearest.feature.id, 2);
        assert!((nearest.distance - 100.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_index_matches_brute_force(
            coords in prop::collection::vec((-5000i32..5000, -5000i32..5000), 1..60),
            qx in -6000.0f64..6000.0,
            qy in -6000.0f64..6000.0,
        ) {
            // Integer grid coordinates make exact ties likely
            let features: Vec<Feature> = coords
                .iter()
                .enumerate()
                .map(|(i, (x, y))| stop(i as i64, *x as f64, *y as f64))
                .collect();
            let collection = FeatureCollection::new(Category::Stop, features).unwrap();
            let query = GeoPoint::web_mercator(qx.round(), qy.round());

            let indexed = collection.find_nearest(&query).unwrap();
            let linear = collection.find_nearest_linear(&query).unwrap();
            prop_assert_eq!(indexed.feature.id, linear.feature.id);
            prop_assert_eq!(indexed.distance, linear.distance);

            for feature in collection.features() {
                prop_assert!(indexed.distance <= query.planar_distance(&feature.location) + 1e-9);
            }
        }
    }
}
