//! Training configuration

use crate::error::{BurnoutError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default dataset location, relative to the working directory
pub const DEFAULT_DATA_PATH: &str = "data/raw/remote_work_health.csv";

/// Default artifact directory, relative to the working directory
pub const DEFAULT_MODELS_DIR: &str = "models";

/// Hyperparameters of the bagged tree ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: usize,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Seed for bootstrap and feature sampling
    pub random_state: u64,
    /// Weight per encoded Burnout_Level class
    pub class_weight: BTreeMap<usize, f64>,
}

impl Default for ForestParams {
    fn default() -> Self {
        // Misclassifying class 1 costs more than the others
        let class_weight = BTreeMap::from([(0, 1.0), (1, 1.5), (2, 0.8)]);
        Self {
            n_estimators: 100,
            max_depth: 20,
            min_samples_split: 5,
            random_state: 42,
            class_weight,
        }
    }
}

/// Configuration for a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Labeled CSV dataset
    pub data_path: PathBuf,
    /// Directory the artifacts are written to
    pub output_dir: PathBuf,
    /// Ensemble hyperparameters
    pub forest: ForestParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            output_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            forest: ForestParams::default(),
        }
    }
}

impl TrainingConfig {
    pub fn new(data_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            output_dir: output_dir.into(),
            forest: ForestParams::default(),
        }
    }

    /// Builder: override ensemble hyperparameters
    pub fn with_forest(mut self, forest: ForestParams) -> Self {
        self.forest = forest;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let f = &self.forest;
        if f.n_estimators == 0 {
            return Err(BurnoutError::ConfigError("n_estimators must be positive".to_string()));
        }
        if f.max_depth == 0 {
            return Err(BurnoutError::ConfigError("max_depth must be positive".to_string()));
        }
        if f.min_samples_split < 2 {
            return Err(BurnoutError::ConfigError(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if let Some((class, w)) = f.class_weight.iter().find(|(_, w)| !(w.is_finite() && **w > 0.0)) {
            return Err(BurnoutError::ConfigError(format!(
                "class weight for class {} must be positive, got {}",
                class, w
            )));
        }
        Ok(())
    }
}
