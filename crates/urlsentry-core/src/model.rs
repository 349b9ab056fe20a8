//! Classifier artifact and inference
//!
//! The classifier is trained elsewhere and exported as JSON. Three estimator
//! types are understood, selected by the `type` tag:
//!
//! ```json
//! {
//!   "type": "decision_tree",
//!   "n_features": 21,
//!   "classes": [0, 1],
//!   "children_left":  [1, -1, -1],
//!   "children_right": [2, -1, -1],
//!   "feature":   [7, -2, -2],
//!   "threshold": [0.5, -2.0, -2.0],
//!   "value": [[60.0, 40.0], [58.0, 2.0], [2.0, 38.0]]
//! }
//! ```
//!
//! - `decision_tree`: parallel node arrays as stored by scikit-learn's
//!   `tree_` attribute. A node is a leaf when `children_left` is `-1`.
//! - `random_forest`: `{"trees": [<decision tree arrays>, ...]}`.
//! - `logistic_regression`: `{"coefficients": [...], "intercept": f}`.
//!
//! A [`Classifier`] is validated once at load time and is immutable
//! afterwards, so it can be shared between request handlers without locking.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Binary classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Safe,
    Malicious,
}

impl Label {
    /// Map a raw class value to a label (0 = Safe, 1 = Malicious)
    pub fn from_class(class: i64) -> Result<Self> {
        match class {
            0 => Ok(Label::Safe),
            1 => Ok(Label::Malicious),
            other => Err(ModelError::UnknownClass(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Safe => "Safe",
            Label::Malicious => "Malicious",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decision tree in scikit-learn's array layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights (counts or fractions)
    pub value: Vec<Vec<f64>>,
}

const LEAF: i64 = -1;

impl Tree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> std::result::Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(format!("tree arrays disagree on node count ({} nodes)", n));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(format!("node {} has only one child", node));
                }
                if self.value[node].len() != n_classes {
                    return Err(format!(
                        "leaf {} has {} class weights, expected {}",
                        node,
                        self.value[node].len(),
                        n_classes
                    ));
                }
                continue;
            }

            // Children always come after their parent, which rules out cycles
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {} has out-of-range child {}", node, child));
                }
            }

            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {} splits on unknown feature {}", node, feature));
            }
        }

        Ok(())
    }

    /// Class weights of the leaf `row` falls into
    fn leaf_value(&self, row: &[f64]) -> &[f64] {
        let mut node = 0;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        &self.value[node]
    }
}

/// Estimator-specific parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    DecisionTree(Tree),
    RandomForest { trees: Vec<Tree> },
    LogisticRegression { coefficients: Vec<f64>, intercept: f64 },
}

impl Estimator {
    pub fn kind(&self) -> &'static str {
        match self {
            Estimator::DecisionTree(_) => "decision_tree",
            Estimator::RandomForest { .. } => "random_forest",
            Estimator::LogisticRegression { .. } => "logistic_regression",
        }
    }
}

fn default_classes() -> Vec<i64> {
    vec![0, 1]
}

/// A loaded, validated classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classifier {
    pub n_features: usize,
    #[serde(default = "default_classes")]
    pub classes: Vec<i64>,
    #[serde(flatten)]
    pub estimator: Estimator,
}

impl Classifier {
    /// Read and validate a model artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Io(format!("{}: {}", path.display(), e)))?;
        let classifier = Self::from_json(&json)?;

        tracing::info!(
            "Loaded {} model ({} features, classes {:?}) from {:?}",
            classifier.estimator.kind(),
            classifier.n_features,
            classifier.classes,
            path
        );
        Ok(classifier)
    }

    /// Parse and validate a model artifact
    pub fn from_json(json: &str) -> Result<Self> {
        let classifier: Classifier = serde_json::from_str(json)?;
        classifier.validate()?;
        Ok(classifier)
    }

    /// Check the artifact can score feature rows without panicking
    pub fn validate(&self) -> Result<()> {
        if self.n_features != FEATURE_COUNT {
            return Err(ModelError::Invalid(format!(
                "model expects {} features, extractor produces {}",
                self.n_features, FEATURE_COUNT
            )));
        }
        if self.classes.len() < 2 {
            return Err(ModelError::Invalid(
                "model needs at least two classes".to_string(),
            ));
        }

        match &self.estimator {
            Estimator::DecisionTree(tree) => tree
                .validate(self.n_features, self.classes.len())
                .map_err(ModelError::Invalid),
            Estimator::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(ModelError::Invalid("forest has no trees".to_string()));
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(self.n_features, self.classes.len())
                        .map_err(|e| ModelError::Invalid(format!("tree {}: {}", i, e)))?;
                }
                Ok(())
            }
            Estimator::LogisticRegression { coefficients, .. } => {
                if coefficients.len() != self.n_features {
                    return Err(ModelError::Invalid(format!(
                        "{} coefficients for {} features",
                        coefficients.len(),
                        self.n_features
                    )));
                }
                if self.classes.len() != 2 {
                    return Err(ModelError::Invalid(
                        "logistic regression is binary only".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Predict the label of a single feature row
    pub fn predict(&self, row: &[f64]) -> Result<Label> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureCount {
                expected: self.n_features,
                actual: row.len(),
            });
        }

        let index = match &self.estimator {
            Estimator::DecisionTree(tree) => argmax(tree.leaf_value(row)),
            Estimator::RandomForest { trees } => {
                let mut proba = vec![0.0; self.classes.len()];
                for tree in trees {
                    let weights = tree.leaf_value(row);
                    let total: f64 = weights.iter().sum();
                    if total > 0.0 {
                        for (p, w) in proba.iter_mut().zip(weights) {
                            *p += w / total;
                        }
                    }
                }
                argmax(&proba)
            }
            Estimator::LogisticRegression {
                coefficients,
                intercept,
            } => {
                let decision: f64 = intercept
                    + coefficients
                        .iter()
                        .zip(row)
                        .map(|(w, x)| w * x)
                        .sum::<f64>();
                usize::from(decision > 0.0)
            }
        };

        Label::from_class(self.classes[index])
    }

    /// Predict the label of an extracted URL
    pub fn predict_features(&self, features: &FeatureVector) -> Result<Label> {
        self.predict(&features.to_row())
    }
}

/// Index of the largest weight, first one on ties
fn argmax(weights: &[f64]) -> usize {
    let mut best = 0;
    for (i, w) in weights.iter().enumerate() {
        if *w > weights[best] {
            best = i;
        }
    }
    best
}
