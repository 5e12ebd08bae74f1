//! Core data models for accessibility evaluation.

pub mod accessibility;
pub mod feature;

pub use accessibility::{
    AccessibilityLabel, DistanceTriple, Evaluation, NearestResult, PathSegment, SegmentKind,
    FEATURE_COUNT, FEATURE_NAMES,
};
pub use feature::{Category, Crs, Feature, GeoPoint};
