//! Model training module
//!
//! Provides the burnout classifier and the engine that fits it:
//! - Weighted Gini decision trees
//! - Random Forest with bootstrap sampling and per-class weights
//! - [`TrainEngine`] turning a labeled dataset into an artifact bundle

mod config;
mod engine;
pub mod decision_tree;
pub mod random_forest;

pub use config::{ForestParams, TrainingConfig, DEFAULT_DATA_PATH, DEFAULT_MODELS_DIR};
pub use decision_tree::{DecisionTree, TreeNode};
pub use engine::{TrainEngine, TrainingReport};
pub use random_forest::RandomForest;
