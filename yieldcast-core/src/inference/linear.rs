//! Linear yield model exported as a JSON artifact.

use crate::error::YieldError;
use crate::features::{FeatureSchema, FeatureVector};
use crate::inference::{YieldPredictor, check_columns};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// On-disk form of a fitted linear model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub intercept: f64,
    pub coefficients: HashMap<String, f64>,
}

/// A linear model whose weights are aligned to a feature schema.
#[derive(Debug, Clone)]
pub struct LinearYieldModel {
    columns: Vec<String>,
    weights: Vec<f64>,
    intercept: f64,
}

impl LinearYieldModel {
    /// Align an artifact's coefficients to `schema`. Every schema column needs
    /// a coefficient, and the artifact may carry no others.
    pub fn from_artifact(
        artifact: LinearArtifact,
        schema: &FeatureSchema,
    ) -> Result<Self, YieldError> {
        let mut coefficients = artifact.coefficients;
        let mut weights = Vec::with_capacity(schema.len());
        for column in schema.columns() {
            let weight = coefficients.remove(column).ok_or_else(|| {
                YieldError::schema_mismatch(format!(
                    "linear model has no coefficient for column '{column}'"
                ))
            })?;
            weights.push(weight);
        }
        if !coefficients.is_empty() {
            let mut extra: Vec<String> = coefficients.into_keys().collect();
            extra.sort();
            return Err(YieldError::schema_mismatch(format!(
                "linear model has coefficients for unknown column(s): {}",
                extra.join(", ")
            )));
        }
        Ok(Self {
            columns: schema.columns().to_vec(),
            weights,
            intercept: artifact.intercept,
        })
    }

    pub fn load(path: &Path, schema: &FeatureSchema) -> Result<Self, YieldError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            YieldError::model(format!("failed to read model {}: {e}", path.display()))
        })?;
        let artifact: LinearArtifact = serde_json::from_str(&content)?;
        let model = Self::from_artifact(artifact, schema)?;
        tracing::info!(path = %path.display(), "Loaded linear yield model");
        Ok(model)
    }
}

impl YieldPredictor for LinearYieldModel {
    fn name(&self) -> &str {
        "linear"
    }

    fn expected_columns(&self) -> &[String] {
        &self.columns
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64, YieldError> {
        check_columns(&self.columns, features)?;
        let dot: f64 = self
            .weights
            .iter()
            .zip(features.values())
            .map(|(w, x)| w * x)
            .sum();
        Ok(self.intercept + dot)
    }
}
