//! Inference engine module
//!
//! Loads the persisted artifacts and predicts the encoded burnout level of
//! one record at a time.

mod engine;

pub use engine::{InferenceEngine, ModelInfo};
