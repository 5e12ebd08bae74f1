//! Accessibility engine: distance aggregation, classification and path
//! rendering over an explicitly constructed [`AccessContext`].

mod classifier;
mod context;
pub mod distances;
mod forest;
pub mod paths;

pub use classifier::{Classifier, RuleClassifier, Thresholds};
pub use context::AccessContext;
pub use distances::{compute_distances, DistanceReport, DEFAULT_MISSING_DISTANCE_M};
pub use forest::ForestClassifier;
pub use paths::build_path_segments;
