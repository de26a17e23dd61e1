//! Inference engine implementation
//!
//! Wraps a loaded [`ArtifactBundle`] and turns survey records into encoded
//! Burnout_Level codes. The engine is immutable after construction and is
//! shared across request handlers behind an `Arc`.

use crate::error::{BurnoutError, Result};
use crate::export::ArtifactBundle;
use crate::preprocessing::{SurveyRecord, LABEL_COLUMN};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Description of the loaded model, for clients decoding predictions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Feature order the model was trained on
    pub features: Vec<String>,
    /// Burnout_Level values; a predicted code indexes this list
    pub labels: Vec<String>,
    /// Accepted values per categorical input column
    pub vocabularies: BTreeMap<String, Vec<String>>,
    pub n_trees: usize,
}

/// Prediction engine over a fitted artifact bundle
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    bundle: ArtifactBundle,
}

impl InferenceEngine {
    /// Wrap an in-memory bundle. Consistency is checked per prediction, so a
    /// broken bundle surfaces as a configuration error instead of a panic.
    pub fn new(bundle: ArtifactBundle) -> Self {
        Self { bundle }
    }

    /// Load artifacts from `dir`, failing if they are missing or inconsistent.
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self::new(ArtifactBundle::load(dir)?))
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    /// Predict the encoded Burnout_Level of one record.
    pub fn predict(&self, record: &SurveyRecord) -> Result<usize> {
        record.validate()?;
        let features = self.bundle.preprocessor.transform(record)?;

        let expected = self.bundle.model.n_features();
        if features.len() != expected {
            return Err(BurnoutError::ConfigError(format!(
                "feature vector has {} values, model expects {}",
                features.len(),
                expected
            )));
        }

        let code = self
            .bundle
            .model
            .predict_row(ArrayView1::from(features.as_slice()))?;
        debug!(code, "Predicted");
        Ok(code)
    }

    pub fn model_info(&self) -> ModelInfo {
        let encoders = self.bundle.preprocessor.encoders();
        let labels = encoders
            .get(LABEL_COLUMN)
            .map(|e| e.classes().to_vec())
            .unwrap_or_default();
        let vocabularies = encoders
            .iter()
            .filter(|(column, _)| column.as_str() != LABEL_COLUMN)
            .map(|(column, e)| (column.clone(), e.classes().to_vec()))
            .collect();

        ModelInfo {
            features: self.bundle.model.feature_names().to_vec(),
            labels,
            vocabularies,
            n_trees: self.bundle.model.n_trees(),
        }
    }
}
