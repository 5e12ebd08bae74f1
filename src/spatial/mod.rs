//! Planar nearest-feature search.
//!
//! Geographic inputs are projected to EPSG:3857 and distances are plain
//! Euclidean lengths in projected meters. An R-tree answers queries; the
//! linear scan is kept as the reference behaviour.

mod collection;
mod index;
pub mod projection;

pub use collection::FeatureCollection;
pub use index::FeatureIndex;

use crate::models::{GeoPoint, NearestResult};

/// Nearest feature of `collection` to `point`, absent when the collection is empty
pub fn find_nearest<'a>(point: &GeoPoint, collection: &'a FeatureCollection) -> Option<NearestResult<'a>> {
    collection.find_nearest(point)
}
