//! Pre-trained decision-forest classifier.
//!
//! The model file is a JSON export of a random forest. Each tree is stored
//! as parallel node arrays (`children_left`, `children_right`, `feature`,
//! `threshold`, `value`); a node with `children_left == -1` is a leaf and its
//! `value` row holds per-class sample counts. Samples go left when
//! `x[feature] <= threshold`. The forest averages per-tree class
//! probabilities and picks the first class with the highest mean.
//!
//! ```json
//! {
//!   "feature_names": ["direct_med_dist", "via_stop_dist", "nearest_stop_dist"],
//!   "classes": ["green", "red", "yellow"],
//!   "missing_value": 9999.0,
//!   "trees": [{ "children_left": [1, -1, -1], "children_right": [2, -1, -1],
//!               "feature": [0, -2, -2], "threshold": [250.0, -2.0, -2.0],
//!               "value": [[5, 5, 0], [5, 0, 0], [0, 5, 0]] }]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::Classifier;
use crate::error::{AccessError, Result};
use crate::models::{AccessibilityLabel, DistanceTriple, FEATURE_COUNT, FEATURE_NAMES};

const LEAF: i64 = -1;

#[derive(Debug, Deserialize)]
struct ForestFile {
    feature_names: Vec<String>,
    classes: Vec<String>,
    missing_value: f64,
    trees: Vec<TreeFile>,
}

#[derive(Debug, Deserialize)]
struct TreeFile {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        proba: Vec<f64>,
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn from_file(tree: TreeFile, n_classes: usize, tree_idx: usize) -> Result<Self> {
        let n = tree.children_left.len();
        let mismatch = |reason: String| AccessError::model_mismatch(format!("tree {}: {}", tree_idx, reason));

        if n == 0 {
            return Err(mismatch("no nodes".into()));
        }
        if [
            tree.children_right.len(),
            tree.feature.len(),
            tree.threshold.len(),
            tree.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(mismatch("node arrays differ in length".into()));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let left = tree.children_left[i];
            let right = tree.children_right[i];

            if left == LEAF {
                let counts = &tree.value[i];
                if counts.len() != n_classes {
                    return Err(mismatch(format!(
                        "leaf {} has {} class values, expected {}",
                        i,
                        counts.len(),
                        n_classes
                    )));
                }
                if counts.iter().any(|c| !c.is_finite() || *c < 0.0) {
                    return Err(mismatch(format!("leaf {} has invalid class values", i)));
                }
                let total: f64 = counts.iter().sum();
                if total <= 0.0 {
                    return Err(mismatch(format!("leaf {} is empty", i)));
                }
                nodes.push(Node::Leaf {
                    proba: counts.iter().map(|c| c / total).collect(),
                });
                continue;
            }

            // Children always follow their parent, which also rules out cycles
            let child = |c: i64| -> Option<usize> {
                usize::try_from(c).ok().filter(|&c| c > i && c < n)
            };
            let (Some(left), Some(right)) = (child(left), child(right)) else {
                return Err(mismatch(format!("node {} has invalid children", i)));
            };

            let feature = usize::try_from(tree.feature[i])
                .ok()
                .filter(|&f| f < FEATURE_COUNT)
                .ok_or_else(|| {
                    mismatch(format!(
                        "node {} splits on feature {}, model input has {} features",
                        i, tree.feature[i], FEATURE_COUNT
                    ))
                })?;

            let threshold = tree.threshold[i];
            if !threshold.is_finite() {
                return Err(mismatch(format!("node {} has a non-finite threshold", i)));
            }

            nodes.push(Node::Split {
                feature,
                threshold,
                left,
                right,
            });
        }

        Ok(Self { nodes })
    }

    fn leaf_proba(&self, x: &[f64; FEATURE_COUNT]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { proba } => return proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // Trees are fitted on f32 inputs
                    let value = x[*feature] as f32 as f64;
                    idx = if value <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Random-forest classifier loaded from a JSON export
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    classes: Vec<AccessibilityLabel>,
    missing_value: f64,
    trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    /// Load and validate a model file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading classifier model from {}", path.display());
        let content = fs::read_to_string(path)?;
        let model = Self::from_json_str(&content)?;
        info!(
            "Model ready: {} trees, classes {:?}, missing value {}",
            model.trees.len(),
            model.classes,
            model.missing_value
        );
        Ok(model)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: ForestFile = serde_json::from_str(content)
            .map_err(|e| AccessError::model_mismatch(format!("unreadable model: {}", e)))?;
        Self::from_file(file)
    }

    fn from_file(file: ForestFile) -> Result<Self> {
        if file.feature_names.len() != FEATURE_COUNT
            || file.feature_names.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b)
        {
            return Err(AccessError::model_mismatch(format!(
                "model expects features {:?}, engine provides {:?}",
                file.feature_names, FEATURE_NAMES
            )));
        }

        if !file.missing_value.is_finite() {
            return Err(AccessError::model_mismatch("missing_value must be finite"));
        }

        let mut classes = Vec::with_capacity(file.classes.len());
        for name in &file.classes {
            let label: AccessibilityLabel = name.parse().map_err(AccessError::model_mismatch)?;
            if classes.contains(&label) {
                return Err(AccessError::model_mismatch(format!("duplicate class '{}'", name)));
            }
            classes.push(label);
        }
        if classes.is_empty() {
            return Err(AccessError::model_mismatch("model has no classes"));
        }

        if file.trees.is_empty() {
            return Err(AccessError::model_mismatch("model has no trees"));
        }
        let trees = file
            .trees
            .into_iter()
            .enumerate()
            .map(|(idx, tree)| DecisionTree::from_file(tree, classes.len(), idx))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            classes,
            missing_value: file.missing_value,
            trees,
        })
    }

    /// Mean class probabilities, in the order of [`Self::classes`]
    pub fn predict_proba(&self, distances: &DistanceTriple) -> Vec<f64> {
        let x = distances.feature_vector(self.missing_value);
        let mut mean = vec![0.0; self.classes.len()];

        for tree in &self.trees {
            for (acc, p) in mean.iter_mut().zip(tree.leaf_proba(&x)) {
                *acc += p;
            }
        }

        let n = self.trees.len() as f64;
        mean.iter_mut().for_each(|p| *p /= n);
        mean
    }

    pub fn classes(&self) -> &[AccessibilityLabel] {
        &self.classes
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for ForestClassifier {
    fn classify(&self, distances: &DistanceTriple) -> AccessibilityLabel {
        let proba = self.predict_proba(distances);

        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        self.classes[best]
    }

    fn name(&self) -> &'static str {
        "model"
    }

    fn missing_value(&self) -> Option<f64> {
        Some(self.missing_value)
    }
}
