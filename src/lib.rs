//! Medreach - accessibility of sport facilities to medical care
//!
//! This library provides the nearest-facility engine and accessibility
//! classifiers shared by the `serve` and `survey` binaries.

pub mod access;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod spatial;

pub use access::{AccessContext, Classifier, ForestClassifier, RuleClassifier, Thresholds};
pub use error::{AccessError, Result};
pub use models::{AccessibilityLabel, Category, Crs, DistanceTriple, Evaluation, Feature, GeoPoint};
pub use spatial::FeatureCollection;
