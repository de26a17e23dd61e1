//! Integration test: HTTP prediction service over trained artifacts

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use burnout_predictor::export::ArtifactBundle;
use burnout_predictor::inference::InferenceEngine;
use burnout_predictor::preprocessing::FittedPreprocessor;
use burnout_predictor::server::{create_router, AppState};
use burnout_predictor::training::{TrainEngine, TrainingConfig};
use burnout_predictor::utils::DataLoader;
use std::sync::Arc;
use tower::ServiceExt;

fn serve_test_app() -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let data = common::write_dataset(dir.path(), 50);
    let models = dir.path().join("models");
    TrainEngine::new(TrainingConfig::new(&data, &models))
        .run()
        .unwrap();

    let engine = InferenceEngine::load(&models).unwrap();
    let app = create_router(Arc::new(AppState::new(engine)));
    (app, dir)
}

fn post_predict(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Prediction
// ============================================================================

#[tokio::test]
async fn test_predict_returns_single_label_code() {
    let (app, _dir) = serve_test_app();
    let response = app
        .oneshot(post_predict(common::sample_request().to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 1, "response must hold exactly one field");
    let code = json["Burnout_Level"].as_u64().expect("integer Burnout_Level");
    assert!(code < 3);
}

#[tokio::test]
async fn test_predict_is_stable_across_requests() {
    let (app, _dir) = serve_test_app();
    let mut codes = Vec::new();
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(post_predict(common::sample_request().to_string()))
            .await
            .unwrap();
        codes.push(json_body(response).await["Burnout_Level"].clone());
    }
    assert!(codes.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn test_predict_without_mental_health_status() {
    let (app, _dir) = serve_test_app();
    let mut body = common::sample_request();
    body.as_object_mut().unwrap().remove("Mental_Health_Status");

    let response = app.oneshot(post_predict(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_predict_unknown_category_is_400() {
    let (app, _dir) = serve_test_app();
    let mut body = common::sample_request();
    body["Gender"] = serde_json::json!("Nonbinary2099");

    let response = app.oneshot(post_predict(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], true);
    assert_eq!(json["kind"], "unknown_category");
    assert_eq!(json["column"], "Gender");
    assert_eq!(json["value"], "Nonbinary2099");
    let valid: Vec<&str> = json["valid_values"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(valid, common::GENDERS.to_vec());
    assert!(json["message"].as_str().unwrap().contains("Gender"));
}

#[tokio::test]
async fn test_predict_missing_field_is_422() {
    let (app, _dir) = serve_test_app();
    let mut body = common::sample_request();
    body.as_object_mut().unwrap().remove("Age");

    let response = app.oneshot(post_predict(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(response).await;
    assert_eq!(json["kind"], "invalid_input");
}

#[tokio::test]
async fn test_predict_wrong_type_is_422() {
    let (app, _dir) = serve_test_app();
    let mut body = common::sample_request();
    body["Hours_Per_Week"] = serde_json::json!("forty");

    let response = app.oneshot(post_predict(body.to_string())).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_predict_with_invalid_json() {
    let (app, _dir) = serve_test_app();
    let response = app
        .oneshot(post_predict("not valid json".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_missing_encoder_is_generic_500() {
    let dir = tempfile::tempdir().unwrap();
    let data = common::write_dataset(dir.path(), 50);
    let dataset = DataLoader::new().load_dataset(&data).unwrap();
    let (bundle, _) = TrainEngine::new(TrainingConfig::default())
        .fit(&dataset)
        .unwrap();

    // Serve a bundle whose Gender encoder went missing after loading
    let mut encoders = bundle.preprocessor.encoders().clone();
    encoders.remove("Gender");
    let preprocessor = FittedPreprocessor::from_parts(
        bundle.preprocessor.mental_imputer().clone(),
        encoders,
        bundle.preprocessor.scaler().clone(),
    );
    let engine = InferenceEngine::new(ArtifactBundle::new(preprocessor, bundle.model));
    let app = create_router(Arc::new(AppState::new(engine)));

    let response = app
        .oneshot(post_predict(common::sample_request().to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(!text.contains("Gender"), "internal detail leaked: {}", text);
    assert!(!text.contains("encoder"), "internal detail leaked: {}", text);

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["error"], true);
    assert_eq!(json["kind"], "internal");
    assert_eq!(json["message"], "An internal error occurred");
}

// ============================================================================
// Model info, health, routing
// ============================================================================

#[tokio::test]
async fn test_model_info() {
    let (app, _dir) = serve_test_app();
    let response = app
        .oneshot(Request::builder().uri("/model").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["labels"], serde_json::json!(["High", "Low", "Medium"]));
    assert_eq!(json["features"].as_array().unwrap().len(), 15);
    assert_eq!(json["features"][14], "Age_Group");
    assert!(json["vocabularies"]["Work_Arrangement"].is_array());
}

#[tokio::test]
async fn test_health_check() {
    let (app, _dir) = serve_test_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["started_at"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (app, _dir) = serve_test_app();
    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["error"], true);
    assert_eq!(json["kind"], "not_found");
    assert!(json["message"].as_str().unwrap().contains("/predict"));
}

#[tokio::test]
async fn test_get_on_predict_is_405() {
    let (app, _dir) = serve_test_app();
    let response = app
        .oneshot(Request::builder().uri("/predict").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
