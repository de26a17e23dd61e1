//! Application state management

use crate::inference::InferenceEngine;
use chrono::{DateTime, Utc};

/// Application state shared across handlers. Read-only after startup.
#[derive(Debug)]
pub struct AppState {
    pub engine: InferenceEngine,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(engine: InferenceEngine) -> Self {
        Self {
            engine,
            started_at: Utc::now(),
        }
    }
}
