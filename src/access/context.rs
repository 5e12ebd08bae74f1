//! Accessibility evaluation over loaded datasets.

use tracing::{debug, info, warn};

use super::distances::{compute_distances, DistanceReport};
use super::paths::build_path_segments;
use super::Classifier;
use crate::data::Datasets;
use crate::error::{AccessError, Result};
use crate::models::{Category, Evaluation, GeoPoint};
use crate::spatial::FeatureCollection;

/// Datasets and classifier shared by every query.
///
/// Built once at startup and only read afterwards, so one instance can be
/// shared across threads behind an `Arc`.
pub struct AccessContext {
    sport: FeatureCollection,
    medical: FeatureCollection,
    stops: FeatureCollection,
    classifier: Box<dyn Classifier>,
    missing_distance_m: f64,
}

impl AccessContext {
    /// Validate inputs and assemble the context
    pub fn new(
        datasets: Datasets,
        classifier: Box<dyn Classifier>,
        missing_distance_m: f64,
    ) -> Result<Self> {
        let Datasets {
            sport,
            medical,
            stops,
        } = datasets;

        for (collection, expected) in [
            (&sport, Category::Sport),
            (&medical, Category::Medical),
            (&stops, Category::Stop),
        ] {
            if collection.category() != expected {
                return Err(AccessError::dataset(
                    expected.to_string(),
                    format!("got a '{}' collection", collection.category()),
                ));
            }
        }

        if !missing_distance_m.is_finite() || missing_distance_m <= 0.0 {
            return Err(AccessError::InvalidInput(format!(
                "missing distance must be a positive number, got {}",
                missing_distance_m
            )));
        }

        if let Some(trained) = classifier.missing_value() {
            if trained != missing_distance_m {
                return Err(AccessError::model_mismatch(format!(
                    "model was fitted with missing distance {}, engine is configured with {}",
                    trained, missing_distance_m
                )));
            }
        }

        for collection in [&medical, &stops] {
            if collection.is_empty() {
                let degraded = AccessError::EmptyCollection {
                    category: collection.category(),
                };
                warn!("{}; distances to it will be {}", degraded, missing_distance_m);
            }
        }

        info!(
            "Access context ready: {} sport facilities, {} medical facilities, {} stops, classifier '{}'",
            sport.len(),
            medical.len(),
            stops.len(),
            classifier.name()
        );

        Ok(Self {
            sport,
            medical,
            stops,
            classifier,
            missing_distance_m,
        })
    }

    /// Evaluate a sport facility by id
    pub fn evaluate(&self, sport_id: i64) -> Result<Evaluation> {
        let facility = self
            .sport
            .get(sport_id)
            .ok_or(AccessError::NotFound { id: sport_id })?;

        let mut evaluation = self.assess(&facility.location);
        evaluation.sport_id = Some(sport_id);

        debug!("Sport facility {} classified {}", sport_id, evaluation.label);
        Ok(evaluation)
    }

    /// Evaluate an arbitrary point
    pub fn evaluate_point(&self, point: &GeoPoint) -> Result<Evaluation> {
        point.validate()?;
        Ok(self.assess(point))
    }

    /// Distances and nearest entities for a point, without classification
    pub fn report(&self, point: &GeoPoint) -> Result<DistanceReport<'_>> {
        point.validate()?;
        Ok(compute_distances(
            point,
            &self.medical,
            &self.stops,
            self.missing_distance_m,
        ))
    }

    fn assess(&self, point: &GeoPoint) -> Evaluation {
        let report = compute_distances(point, &self.medical, &self.stops, self.missing_distance_m);
        let label = self.classifier.classify(&report.distances);

        Evaluation {
            sport_id: None,
            label,
            distances: report.distances,
            path_segments: build_path_segments(point, label, &report),
        }
    }

    pub fn sport(&self) -> &FeatureCollection {
        &self.sport
    }

    pub fn medical(&self) -> &FeatureCollection {
        &self.medical
    }

    pub fn stops(&self) -> &FeatureCollection {
        &self.stops
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn missing_distance_m(&self) -> f64 {
        self.missing_distance_m
    }
}
