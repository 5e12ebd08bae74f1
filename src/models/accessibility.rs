//! Distance features, accessibility labels and rendered path segments.

use serde::{Deserialize, Serialize};

use super::{Feature, GeoPoint};

/// Number of values in a classifier feature vector
pub const FEATURE_COUNT: usize = 3;

/// Column names of the feature vector, in vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["direct_med_dist", "via_stop_dist", "nearest_stop_dist"];

/// Three-tier accessibility label, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessibilityLabel {
    /// Medical facility within walking distance
    Green,
    /// Reachable through a nearby stop
    Yellow,
    /// Neither
    Red,
}

impl AccessibilityLabel {
    pub fn all() -> &'static [AccessibilityLabel] {
        &[
            AccessibilityLabel::Green,
            AccessibilityLabel::Yellow,
            AccessibilityLabel::Red,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessibilityLabel::Green => "green",
            AccessibilityLabel::Yellow => "yellow",
            AccessibilityLabel::Red => "red",
        }
    }
}

impl std::fmt::Display for AccessibilityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccessibilityLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "green" => Ok(AccessibilityLabel::Green),
            "yellow" => Ok(AccessibilityLabel::Yellow),
            "red" => Ok(AccessibilityLabel::Red),
            other => Err(format!("unknown accessibility label '{}'", other)),
        }
    }
}

/// Distances in projected meters. Missing values hold the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceTriple {
    /// Point to nearest medical facility
    pub direct: f64,
    /// Point to nearest stop
    pub to_stop: f64,
    /// Nearest stop to its nearest medical facility
    pub via_stop: f64,
}

impl DistanceTriple {
    pub fn new(direct: f64, to_stop: f64, via_stop: f64) -> Self {
        Self {
            direct,
            to_stop,
            via_stop,
        }
    }

    /// Classifier input in [`FEATURE_NAMES`] order, NaN replaced by `sentinel`
    pub fn feature_vector(&self, sentinel: f64) -> [f64; FEATURE_COUNT] {
        let fill = |v: f64| if v.is_nan() { sentinel } else { v };
        [fill(self.direct), fill(self.via_stop), fill(self.to_stop)]
    }
}

/// Nearest feature of a collection and its distance
#[derive(Debug, Clone, Copy)]
pub struct NearestResult<'a> {
    pub feature: &'a Feature,
    pub distance: f64,
}

/// Kind of rendered path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Direct,
    ToStop,
    StopToMedical,
}

/// Straight segment between two features, for map rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub kind: SegmentKind,
    pub distance_m: f64,
}

/// Outcome of one accessibility query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Sport facility id, absent for ad-hoc points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport_id: Option<i64>,
    pub label: AccessibilityLabel,
    pub distances: DistanceTriple,
    pub path_segments: Vec<PathSegment>,
}
