//! Three-way nearest-facility distance aggregation.

use tracing::debug;

use crate::models::{DistanceTriple, GeoPoint, NearestResult};
use crate::spatial::{find_nearest, FeatureCollection};

/// Distance assumed when no facility of a kind exists
pub const DEFAULT_MISSING_DISTANCE_M: f64 = 9999.0;

/// Distances and the nearest entities they were measured to
#[derive(Debug, Clone, Copy)]
pub struct DistanceReport<'a> {
    pub distances: DistanceTriple,
    /// Nearest medical facility to the point
    pub medical_near: Option<NearestResult<'a>>,
    /// Nearest stop to the point
    pub stop_near: Option<NearestResult<'a>>,
    /// Nearest medical facility to `stop_near`
    pub stop_medical_near: Option<NearestResult<'a>>,
}

/// Run the point→medical, point→stop and stop→medical lookups.
///
/// Any lookup against an empty collection yields `sentinel` for its distance.
pub fn compute_distances<'a>(
    point: &GeoPoint,
    medical: &'a FeatureCollection,
    stops: &'a FeatureCollection,
    sentinel: f64,
) -> DistanceReport<'a> {
    let medical_near = find_nearest(point, medical);
    let stop_near = find_nearest(point, stops);
    let stop_medical_near =
        stop_near.and_then(|stop| find_nearest(&stop.feature.location, medical));

    let or_sentinel = |near: Option<NearestResult<'_>>| near.map_or(sentinel, |n| n.distance);
    let distances = DistanceTriple::new(
        or_sentinel(medical_near),
        or_sentinel(stop_near),
        or_sentinel(stop_medical_near),
    );

    debug!(
        "Distances from ({}, {}): direct={:.1} to_stop={:.1} via_stop={:.1}",
        point.x, point.y, distances.direct, distances.to_stop, distances.via_stop
    );

    DistanceReport {
        distances,
        medical_near,
        stop_near,
        stop_medical_near,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Feature};

    fn collection(category: Category, points: &[(i64, f64, f64)]) -> FeatureCollection {
        let features = points
            .iter()
            .map(|&(id, x, y)| Feature::new(id, category, GeoPoint::web_mercator(x, y)))
            .collect();
        FeatureCollection::new(category, features).unwrap()
    }

    #[test]
    fn test_all_three_distances() {
        let medical = collection(Category::Medical, &[(1, 2000.0, 0.0), (2, 0.0, 650.0)]);
        let stops = collection(Category::Stop, &[(10, 0.0, 150.0), (11, -900.0, 0.0)]);

        let report = compute_distances(&GeoPoint::web_mercator(0.0, 0.0), &medical, &stops, 9999.0);

        assert!((report.distances.direct - 650.0).abs() < 1e-9);
        assert!((report.distances.to_stop - 150.0).abs() < 1e-9);
        assert!((report.distances.via_stop - 500.0).abs() < 1e-9);
        assert_eq!(report.medical_near.unwrap().feature.id, 2);
        assert_eq!(report.stop_near.unwrap().feature.id, 10);
        assert_eq!(report.stop_medical_near.unwrap().feature.id, 2);
    }

    #[test]
    fn test_empty_medical_uses_sentinel() {
        let medical = FeatureCollection::empty(Category::Medical);
        let stops = collection(Category::Stop, &[(10, 0.0, 100.0)]);

        let report = compute_distances(&GeoPoint::web_mercator(0.0, 0.0), &medical, &stops, 9999.0);

        assert_eq!(report.distances.direct, 9999.0);
        assert_eq!(report.distances.via_stop, 9999.0);
        assert!((report.distances.to_stop - 100.0).abs() < 1e-9);
        assert!(report.medical_near.is_none());
        assert!(report.stop_medical_near.is_none());
    }

    #[test]
    fn test_empty_stops_skips_via_lookup() {
        let medical = collection(Category::Medical, &[(1, 300.0, 0.0)]);
        let stops = FeatureCollection::empty(Category::Stop);

        let report = compute_distances(&GeoPoint::web_mercator(0.0, 0.0), &medical, &stops, 5000.0);

        assert_eq!(report.distances.to_stop, 5000.0);
        assert_eq!(report.distances.via_stop, 5000.0);
        assert!(report.stop_medical_near.is_none());
    }
}
