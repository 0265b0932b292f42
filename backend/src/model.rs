use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};

use serde::Deserialize;

use crate::features::{FEATURE_COLUMNS, FeatureVector};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] io::Error),
    #[error("invalid model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("artifact has {got} columns, training schema has {expected}")]
    Shape { expected: usize, got: usize },
    #[error("artifact column {index} is {found:?}, training schema expects {expected:?}")]
    ColumnMismatch {
        index: usize,
        found: String,
        expected: &'static str,
    },
    #[error("prediction produced a non-finite value")]
    NonFinite,
}

/// Opaque regression call: feature vector in, predicted energy (kWh) out.
///
/// Injected as `Arc<dyn EnergyModel>` so tests can substitute a stub.
pub trait EnergyModel: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}

/// What to do when a prediction fails mid-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionPolicy {
    /// Fail the whole operation. Used by single-prediction calls.
    FailRequest,
    /// Record 0 kWh for the failing candidate and keep scoring the rest.
    /// Used per candidate during route optimization.
    SubstituteZero,
}

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    columns: Vec<String>,
    weights: Vec<f64>,
    intercept: f64,
}

/// Linear regression artifact exported from the training pipeline.
#[derive(Debug)]
pub struct LinearModel {
    weights: [f64; 30],
    intercept: f64,
}

impl LinearModel {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        if artifact.columns.len() != FEATURE_COLUMNS.len() {
            return Err(ModelError::Shape {
                expected: FEATURE_COLUMNS.len(),
                got: artifact.columns.len(),
            });
        }
        if artifact.weights.len() != FEATURE_COLUMNS.len() {
            return Err(ModelError::Shape {
                expected: FEATURE_COLUMNS.len(),
                got: artifact.weights.len(),
            });
        }
        for (index, (found, expected)) in artifact
            .columns
            .iter()
            .zip(FEATURE_COLUMNS.iter())
            .enumerate()
        {
            if found != expected {
                return Err(ModelError::ColumnMismatch {
                    index,
                    found: found.clone(),
                    expected,
                });
            }
        }

        let mut weights = [0.0; 30];
        weights.copy_from_slice(&artifact.weights);
        Ok(Self {
            weights,
            intercept: artifact.intercept,
        })
    }
}

impl EnergyModel for LinearModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let energy = features
            .as_array()
            .iter()
            .zip(self.weights.iter())
            .map(|(value, weight)| value * weight)
            .sum::<f64>()
            + self.intercept;

        if !energy.is_finite() {
            return Err(ModelError::NonFinite);
        }
        Ok(energy)
    }
}
