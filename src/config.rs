use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::access::{
    AccessContext, Classifier, ForestClassifier, RuleClassifier, Thresholds, DEFAULT_MISSING_DISTANCE_M,
};
use crate::data::load_data;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub sport: PathBuf,
    pub medical: PathBuf,
    pub stops: PathBuf,
    #[serde(default = "default_id_property")]
    pub id_property: String,
}

fn default_id_property() -> String {
    "global_id".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct AccessConfig {
    #[serde(flatten)]
    pub thresholds: Thresholds,
    pub missing_distance_m: f64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            missing_distance_m: DEFAULT_MISSING_DISTANCE_M,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Rules,
    Model,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub kind: ClassifierKind,
    pub model: Option<PathBuf>,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.access.thresholds.validate()?;
        if self.classifier.kind == ClassifierKind::Model && self.classifier.model.is_none() {
            bail!("classifier.kind = \"model\" requires classifier.model");
        }
        Ok(())
    }

    /// Classifier selected by `[classifier]`
    pub fn build_classifier(&self) -> Result<Box<dyn Classifier>> {
        match self.classifier.kind {
            ClassifierKind::Rules => Ok(Box::new(RuleClassifier::new(self.access.thresholds))),
            ClassifierKind::Model => {
                let path = self
                    .classifier
                    .model
                    .as_ref()
                    .context("classifier.model is not set")?;
                let model = ForestClassifier::load(path)
                    .with_context(|| format!("Failed to load model {}", path.display()))?;
                Ok(Box::new(model))
            }
        }
    }

    /// Load datasets and the classifier, then assemble the context
    pub fn build_context(&self) -> Result<AccessContext> {
        let classifier = self.build_classifier()?;
        let datasets = load_data(&self.data).context("Failed to load datasets")?;
        let context = AccessContext::new(datasets, classifier, self.access.missing_distance_m)?;
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccessibilityLabel, SegmentKind};

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [data]
            sport = "sport.geojson"
            medical = "med.geojson"
            stops = "stops.geojson"
            "#,
        )
        .unwrap();

        assert_eq!(config.data.id_property, "global_id");
        assert_eq!(config.access.thresholds, Thresholds::default());
        assert_eq!(config.access.missing_distance_m, 9999.0);
        assert_eq!(config.classifier.kind, ClassifierKind::Rules);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_overrides() {
        let config: Config = toml::from_str(
            r#"
            [data]
            sport = "sport.geojson"
            medical = "med.geojson"
            stops = "stops.geojson"
            id_property = "id"

            [access]
            green_radius_m = 300.0
            via_stop_radius_m = 1500.0
            missing_distance_m = 20000.0
            "#,
        )
        .unwrap();

        assert_eq!(config.data.id_property, "id");
        assert_eq!(config.access.thresholds.green_radius_m, 300.0);
        assert_eq!(config.access.thresholds.stop_radius_m, 250.0);
        assert_eq!(config.access.thresholds.via_stop_radius_m, 1500.0);
        assert_eq!(config.access.missing_distance_m, 20000.0);
    }

    #[test]
    fn test_model_kind_requires_path() {
        let config: Config = toml::from_str(
            r#"
            [data]
            sport = "sport.geojson"
            medical = "med.geojson"
            stops = "stops.geojson"

            [classifier]
            kind = "model"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    /// Writes one sport facility, one medical facility about 90 m away and
    /// no stops, plus a config pointing at them with `extra` appended.
    fn write_fixture(dir: &Path, extra: &str) -> PathBuf {
        let write = |name: &str, body: &str| {
            let path = dir.join(name);
            fs::write(&path, body).unwrap();
            path
        };

        let point = |id: i64, lon: f64, lat: f64| {
            format!(
                r#"{{ "type": "Feature", "geometry": {{ "type": "Point", "coordinates": [{lon}, {lat}] }}, "properties": {{ "global_id": {id} }} }}"#
            )
        };
        let collection = |features: Vec<String>| {
            format!(r#"{{ "type": "FeatureCollection", "features": [{}] }}"#, features.join(","))
        };

        let sport = write("sport.geojson", &collection(vec![point(1, 37.6173, 55.7558)]));
        let medical = write("med.geojson", &collection(vec![point(10, 37.6180, 55.7560)]));
        let stops = write("stops.geojson", &collection(vec![]));

        write(
            "config.toml",
            &format!(
                "[data]\nsport = {:?}\nmedical = {:?}\nstops = {:?}\n{}",
                sport.display().to_string(),
                medical.display().to_string(),
                stops.display().to_string(),
                extra
            ),
        )
    }

    #[test]
    fn test_build_context_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_fixture(dir.path(), "");

        let config = Config::load_from_file(&config_path).unwrap();
        let context = config.build_context().unwrap();
        assert_eq!(context.sport().len(), 1);
        assert!(context.stops().is_empty());

        let evaluation = context.evaluate(1).unwrap();
        assert_eq!(evaluation.label, AccessibilityLabel::Green);
        assert!(context.evaluate(2).is_err());
    }

    /// Green only when the stop distance is at most 10000 and the direct
    /// distance at most 5000. A missing stop is green only if it reaches the
    /// trees as 9999.
    const STOP_SENSITIVE_MODEL: &str = r#"{
        "feature_names": ["direct_med_dist", "via_stop_dist", "nearest_stop_dist"],
        "classes": ["green", "red", "yellow"],
        "missing_value": 9999.0,
        "trees": [{
            "children_left":  [1, 3, -1, -1, -1],
            "children_right": [2, 4, -1, -1, -1],
            "feature":        [2, 0, -2, -2, -2],
            "threshold":      [10000.0, 5000.0, -2.0, -2.0, -2.0],
            "value": [[2, 2, 2], [2, 0, 2], [0, 3, 0], [4, 0, 0], [0, 0, 4]]
        }]
    }"#;

    #[test]
    fn test_model_classifier_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        fs::write(&model_path, STOP_SENSITIVE_MODEL).unwrap();

        let config_path = write_fixture(
            dir.path(),
            &format!("[classifier]\nkind = \"model\"\nmodel = {:?}\n", model_path.display().to_string()),
        );

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.classifier.kind, ClassifierKind::Model);

        let context = config.build_context().unwrap();
        assert_eq!(context.classifier().name(), "model");
        assert_eq!(context.classifier().missing_value(), Some(9999.0));

        let evaluation = context.evaluate(1).unwrap();
        assert_eq!(evaluation.distances.to_stop, 9999.0);
        assert_eq!(evaluation.distances.via_stop, 9999.0);
        assert!(evaluation.distances.direct < 250.0);
        assert_eq!(evaluation.label, AccessibilityLabel::Green);

        assert_eq!(evaluation.path_segments.len(), 1);
        assert_eq!(evaluation.path_segments[0].kind, SegmentKind::Direct);
        assert_eq!(evaluation.path_segments[0].distance_m, evaluation.distances.direct);
    }

    #[test]
    fn test_model_sentinel_mismatch_fails_build() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        fs::write(&model_path, STOP_SENSITIVE_MODEL).unwrap();

        let config_path = write_fixture(
            dir.path(),
            &format!(
                "[access]\nmissing_distance_m = 20000.0\n[classifier]\nkind = \"model\"\nmodel = {:?}\n",
                model_path.display().to_string()
            ),
        );

        let config = Config::load_from_file(&config_path).unwrap();
        assert!(config.build_context().is_err());
    }
}
