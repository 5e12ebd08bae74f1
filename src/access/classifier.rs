//! Accessibility classifiers over a [`DistanceTriple`].

use serde::{Deserialize, Serialize};

use crate::error::{AccessError, Result};
use crate::models::{AccessibilityLabel, DistanceTriple};

/// Maps the three distances to a label.
///
/// Implementations must be reentrant: one instance serves all queries.
pub trait Classifier: Send + Sync {
    fn classify(&self, distances: &DistanceTriple) -> AccessibilityLabel;

    /// Short name for logs and health output
    fn name(&self) -> &'static str;

    /// Missing-distance value the classifier was fitted with, if it has one
    fn missing_value(&self) -> Option<f64> {
        None
    }
}

/// Distance limits of the rule-based classifier, in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Medical facility this close is reachable on foot
    pub green_radius_m: f64,
    /// A stop farther than this is not usable
    pub stop_radius_m: f64,
    /// Stop-to-medical limit for the transit route
    pub via_stop_radius_m: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            green_radius_m: 250.0,
            stop_radius_m: 250.0,
            via_stop_radius_m: 1000.0,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("green_radius_m", self.green_radius_m),
            ("stop_radius_m", self.stop_radius_m),
            ("via_stop_radius_m", self.via_stop_radius_m),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AccessError::InvalidInput(format!(
                    "threshold {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Fixed-threshold classifier
#[derive(Debug, Clone, Default)]
pub struct RuleClassifier {
    thresholds: Thresholds,
}

impl RuleClassifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}

impl Classifier for RuleClassifier {
    fn classify(&self, distances: &DistanceTriple) -> AccessibilityLabel {
        let t = &self.thresholds;

        if distances.direct <= t.green_radius_m {
            return AccessibilityLabel::Green;
        }

        // No usable stop nearby
        if distances.to_stop > t.stop_radius_m {
            return AccessibilityLabel::Red;
        }

        if distances.via_stop <= t.via_stop_radius_m {
            AccessibilityLabel::Yellow
        } else {
            AccessibilityLabel::Red
        }
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}
