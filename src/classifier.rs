//! Pre-trained binary classifier.
//!
//! The model is exported offline as JSON: a column preprocessor (scaling for
//! numeric columns, one-hot blocks for categorical ones) followed by either a
//! logistic regression or a gradient-boosted tree ensemble. Scoring never
//! re-derives anything; it only replays the exported parameters.

use crate::errors::AppError;
use crate::models::{FeatureRecord, FeatureValue, FEATURE_COLUMNS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Scoring oracle: probability of the positive class for one record.
pub trait Classifier: Send + Sync {
    fn predict_proba(&self, record: &FeatureRecord) -> Result<f64, AppError>;
}

/// Numeric column, optionally standardized as `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumn {
    pub column: String,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub scale: Option<f64>,
}

/// Categorical column expanded into one indicator per known category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub column: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Preprocessor {
    #[serde(default)]
    pub numeric: Vec<NumericColumn>,
    #[serde(default)]
    pub categorical: Vec<CategoricalColumn>,
}

impl Preprocessor {
    /// Length of the encoded feature vector.
    pub fn width(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|c| c.categories.len())
                .sum::<usize>()
    }

    /// Encodes a record: numeric columns first, then one-hot blocks.
    ///
    /// Unknown categories encode as an all-zero block.
    pub fn transform(&self, record: &FeatureRecord) -> Result<Vec<f64>, AppError> {
        let mut encoded = Vec::with_capacity(self.width());

        for spec in &self.numeric {
            let raw = record
                .value(&spec.column)
                .and_then(|v| v.as_number())
                .ok_or_else(|| {
                    AppError::SchemaMismatch(format!(
                        "numeric column '{}' missing from feature record",
                        spec.column
                    ))
                })? as f64;

            let value = match (spec.mean, spec.scale) {
                (Some(mean), Some(scale)) if scale != 0.0 => (raw - mean) / scale,
                _ => raw,
            };
            encoded.push(value);
        }

        for spec in &self.categorical {
            let value = record.value(&spec.column).ok_or_else(|| {
                AppError::SchemaMismatch(format!(
                    "categorical column '{}' missing from feature record",
                    spec.column
                ))
            })?;
            let value = match value {
                FeatureValue::Text(s) => s,
                FeatureValue::Number(n) => n.to_string(),
            };
            encoded.extend(
                spec.categories
                    .iter()
                    .map(|category| if *category == value { 1.0 } else { 0.0 }),
            );
        }

        Ok(encoded)
    }
}

/// One node of a regression tree. Splits send `x < threshold` left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Node 0 is the root.
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn evaluate(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[feature] < threshold { left } else { right };
                }
            }
        }
    }

    /// Children must point forward so evaluation always terminates.
    fn check(&self, width: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = *node
            {
                if feature >= width {
                    return Err(format!(
                        "node {} splits on feature {} but only {} features are encoded",
                        i, feature, width
                    ));
                }
                for child in [left, right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(format!("node {} has invalid child {}", i, child));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    Logistic {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    GradientBoosting {
        #[serde(default)]
        base_margin: f64,
        trees: Vec<Tree>,
    },
}

impl Estimator {
    fn margin(&self, x: &[f64]) -> f64 {
        match self {
            Estimator::Logistic {
                coefficients,
                intercept,
            } => {
                coefficients
                    .iter()
                    .zip(x)
                    .map(|(w, v)| w * v)
                    .sum::<f64>()
                    + intercept
            }
            Estimator::GradientBoosting { base_margin, trees } => {
                base_margin + trees.iter().map(|t| t.evaluate(x)).sum::<f64>()
            }
        }
    }
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// A classifier as exported by the offline training job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub preprocessor: Preprocessor,
    pub estimator: Estimator,
}

impl ModelArtifact {
    /// Decodes and validates an artifact.
    ///
    /// # Returns
    ///
    /// * `ModelUnavailable` if the bytes are not a model artifact.
    /// * `SchemaMismatch` if the artifact does not fit the feature record.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AppError> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes).map_err(|e| {
            AppError::ModelUnavailable(format!("Failed to decode model artifact: {}", e))
        })?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Checks the artifact against the 18-column feature record.
    pub fn validate(&self) -> Result<(), AppError> {
        let expected: HashSet<&str> = FEATURE_COLUMNS.iter().copied().collect();
        let declared: HashSet<&str> = self.feature_names.iter().map(String::as_str).collect();

        if declared.len() != self.feature_names.len() {
            return Err(AppError::SchemaMismatch(
                "model declares duplicate feature names".to_string(),
            ));
        }
        if declared != expected {
            let mut missing: Vec<&str> = expected.difference(&declared).copied().collect();
            let mut unexpected: Vec<&str> = declared.difference(&expected).copied().collect();
            missing.sort_unstable();
            unexpected.sort_unstable();
            return Err(AppError::SchemaMismatch(format!(
                "model expects different columns (missing: {:?}, unexpected: {:?})",
                missing, unexpected
            )));
        }

        // Reference record used only to learn which columns are numeric.
        let probe = crate::features::assemble(&Default::default())?;

        for spec in &self.preprocessor.numeric {
            if !declared.contains(spec.column.as_str()) {
                return Err(AppError::SchemaMismatch(format!(
                    "preprocessor column '{}' is not a model feature",
                    spec.column
                )));
            }
            if probe.value(&spec.column).and_then(|v| v.as_number()).is_none() {
                return Err(AppError::SchemaMismatch(format!(
                    "column '{}' is categorical but the model scales it as numeric",
                    spec.column
                )));
            }
        }
        for spec in &self.preprocessor.categorical {
            if !declared.contains(spec.column.as_str()) {
                return Err(AppError::SchemaMismatch(format!(
                    "preprocessor column '{}' is not a model feature",
                    spec.column
                )));
            }
            if !matches!(probe.value(&spec.column), Some(FeatureValue::Text(_))) {
                return Err(AppError::SchemaMismatch(format!(
                    "column '{}' is numeric but the model one-hot encodes it",
                    spec.column
                )));
            }
        }

        let width = self.preprocessor.width();
        if width == 0 {
            return Err(AppError::SchemaMismatch(
                "model preprocessor encodes no features".to_string(),
            ));
        }

        match &self.estimator {
            Estimator::Logistic { coefficients, .. } => {
                if coefficients.len() != width {
                    return Err(AppError::SchemaMismatch(format!(
                        "logistic model has {} coefficients for {} encoded features",
                        coefficients.len(),
                        width
                    )));
                }
            }
            Estimator::GradientBoosting { trees, .. } => {
                for (i, tree) in trees.iter().enumerate() {
                    tree.check(width).map_err(|e| {
                        AppError::SchemaMismatch(format!("tree {}: {}", i, e))
                    })?;
                }
            }
        }

        Ok(())
    }
}

impl Classifier for ModelArtifact {
    fn predict_proba(&self, record: &FeatureRecord) -> Result<f64, AppError> {
        let x = self.preprocessor.transform(record)?;
        Ok(sigmoid(self.estimator.margin(&x)))
    }
}
