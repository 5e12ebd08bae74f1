//! R-tree over the projected positions of a feature collection.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use tracing::debug;

/// Squared planar distance, shared by the R-tree and the linear scan
#[inline]
pub(crate) fn distance_2(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Projected feature position tagged with its stored order
#[derive(Debug, Clone, Copy)]
pub struct IndexedFeature {
    pub position: usize,
    point: [f64; 2],
}

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IndexedFeature {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        distance_2(&self.point, point)
    }
}

/// Nearest-neighbour index in EPSG:3857 meters
pub struct FeatureIndex {
    tree: RTree<IndexedFeature>,
}

impl FeatureIndex {
    /// Build from positions given in stored order
    pub fn build(points: &[[f64; 2]]) -> Self {
        let indexed: Vec<IndexedFeature> = points
            .iter()
            .enumerate()
            .map(|(position, point)| IndexedFeature {
                position,
                point: *point,
            })
            .collect();

        let tree = RTree::bulk_load(indexed);
        debug!("Feature index built with {} entries", tree.size());

        Self { tree }
    }

    /// Stored position and distance of the nearest entry.
    ///
    /// Entries at exactly the same distance resolve to the lowest position.
    pub fn nearest(&self, query: [f64; 2]) -> Option<(usize, f64)> {
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        let (first, best) = candidates.next()?;

        let mut position = first.position;
        for (candidate, d2) in candidates {
            if d2 > best {
                break;
            }
            position = position.min(candidate.position);
        }

        Some((position, best.sqrt()))
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
