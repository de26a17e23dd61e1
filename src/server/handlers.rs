//! Request handlers

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use super::error::{Result, ServerError};
use super::state::AppState;
use crate::inference::ModelInfo;
use crate::preprocessing::SurveyRecord;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(rename = "Burnout_Level")]
    pub burnout_level: usize,
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SurveyRecord>, JsonRejection>,
) -> Result<Json<PredictResponse>> {
    let Json(record) = payload.map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "Rejected malformed prediction request");
        ServerError::InvalidInput(rejection.body_text())
    })?;

    let start = Instant::now();
    match state.engine.predict(&record) {
        Ok(code) => {
            info!(
                burnout_level = code,
                latency_us = start.elapsed().as_micros() as u64,
                "Prediction served"
            );
            Ok(Json(PredictResponse {
                burnout_level: code,
            }))
        }
        Err(e) if e.is_client_fault() => {
            warn!(error = %e, record = ?record, "Rejected prediction request");
            Err(e.into())
        }
        Err(e) => {
            error!(error = %e, record = ?record, "Prediction failed");
            Err(e.into())
        }
    }
}

pub async fn model_info(State(state): State<Arc<AppState>>) -> Json<ModelInfo> {
    Json(state.engine.model_info())
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let now = chrono::Utc::now();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "started_at": state.started_at.to_rfc3339(),
        "uptime_secs": now.signed_duration_since(state.started_at).num_seconds(),
    }))
}
