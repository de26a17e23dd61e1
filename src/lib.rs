//! Burnout Predictor - burnout level classifier for remote-work survey data
//!
//! This crate provides:
//! - A training pipeline: CSV dataset to fitted preprocessing state and a
//!   class-weighted Random Forest, persisted as JSON artifacts
//! - A prediction service that loads the artifacts once and classifies
//!   single survey records over HTTP
//!
//! # Modules
//!
//! - [`preprocessing`] - Imputation, label encoding, scaling, derived features
//! - [`training`] - Decision trees, Random Forest, training engine
//! - [`export`] - Artifact persistence and consistency checks
//! - [`inference`] - Record-level prediction over loaded artifacts
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface
//! - [`utils`] - Dataset loading

// Core error handling
pub mod error;

// Core ML modules
pub mod preprocessing;
pub mod training;
pub mod inference;
pub mod export;

// Services
pub mod server;
pub mod cli;

// Utilities
pub mod utils;

pub use error::{BurnoutError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{BurnoutError, Result};
    pub use crate::export::ArtifactBundle;
    pub use crate::inference::{InferenceEngine, ModelInfo};
    pub use crate::preprocessing::{FittedPreprocessor, SurveyRecord};
    pub use crate::training::{ForestParams, RandomForest, TrainEngine, TrainingConfig, TrainingReport};
    pub use crate::utils::{DataLoader, SurveyDataset};
}
