//! Integration tests for the scoring API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use jobguard_server::{create_router, AppState};
use scoring_lib::{ArtifactStore, ScoringService, FEATURE_COUNT};
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Logistic model over the full layout weighting title length only
fn title_model(weight: f64, intercept: f64) -> String {
    let mut coefficients = vec![0.0; FEATURE_COUNT];
    coefficients[0] = weight;
    json!({
        "kind": "logistic_regression",
        "coefficients": coefficients,
        "intercept": intercept
    })
    .to_string()
}

fn setup_test_app(models: &[&str]) -> (Router, Arc<AppState>, TempDir) {
    let dir = TempDir::new().unwrap();
    for name in models {
        fs::write(
            dir.path().join(format!("{}.json", name)),
            title_model(0.5, -3.0),
        )
        .unwrap();
    }

    let service = ScoringService::new(ArtifactStore::new(dir.path()), "Random_Forest");
    let state = Arc::new(AppState::new(Arc::new(service)));
    let router = create_router(state.clone());

    (router, state, dir)
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn scenario_body() -> String {
    json!({
        "title": "Data Entry",
        "description": "",
        "telecommuting": 1,
        "hasCompanyLogo": 0
    })
    .to_string()
}

#[tokio::test]
async fn test_health_reports_current_model() {
    let (app, state, _dir) = setup_test_app(&["Random_Forest"]);

    let (status, health) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["model_loaded"], false);
    assert_eq!(health["current_model"], "Random_Forest");

    state.service.warm_up().await.unwrap();
    let (_, health) = send(&app, get("/health")).await;
    assert_eq!(health["model_loaded"], true);
}

#[tokio::test]
async fn test_predict_returns_prediction_result() {
    let (app, _state, _dir) = setup_test_app(&["Random_Forest"]);

    let (status, body) = send(&app, post("/predict", scenario_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["model_name"], "Random_Forest");
    assert_eq!(body["prediction"], 1);
    assert_eq!(body["prediction_label"], "虚假职位");
    assert_eq!(body["probability"], 0.8808);
    assert_eq!(body["probability_percent"], "88.08%");
    assert_eq!(body["risk_score"], 6);
    assert_eq!(body["risk_level"], "高风险");
}

#[tokio::test]
async fn test_predict_missing_model_is_404_and_cache_stays_empty() {
    let (app, state, _dir) = setup_test_app(&[]);

    let (status, body) = send(&app, post("/predict", scenario_body())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "模型不存在: Random_Forest");
    assert!(state.service.cache().is_empty());
}

#[tokio::test]
async fn test_predict_rejects_empty_and_malformed_bodies() {
    let (app, _state, _dir) = setup_test_app(&["Random_Forest"]);

    for body in ["", "{}", "null"] {
        let (status, response) = send(&app, post("/predict", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(response["success"], false);
        assert_eq!(response["error"], "请求体为空");
    }

    for body in ["{broken", "[1, 2]", "\"text\""] {
        let (status, response) = send(&app, post("/predict", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(response["success"], false);
    }
}

#[tokio::test]
async fn test_predict_with_model_override() {
    let (app, state, _dir) = setup_test_app(&["Random_Forest", "Gradient_Boosting"]);

    let body = json!({"title": "Data Entry", "modelName": "Gradient_Boosting"}).to_string();
    let (status, response) = send(&app, post("/predict", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["model_name"], "Gradient_Boosting");
    assert_eq!(state.service.current_model().await, "Random_Forest");
}

#[tokio::test]
async fn test_feature_mismatch_is_422() {
    let (app, _state, dir) = setup_test_app(&[]);
    fs::write(
        dir.path().join("Random_Forest.json"),
        json!({"kind": "linear_svc", "coefficients": [1.0, 2.0], "intercept": 0.0}).to_string(),
    )
    .unwrap();

    let (status, body) = send(&app, post("/predict", scenario_body())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_corrupt_model_is_500() {
    let (app, _state, dir) = setup_test_app(&[]);
    fs::write(dir.path().join("Random_Forest.json"), "not a model").unwrap();

    let (status, body) = send(&app, post("/predict", scenario_body())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_switch_to_unknown_model_keeps_current() {
    let (app, state, _dir) = setup_test_app(&["Random_Forest"]);

    let body = json!({"modelName": "Neural_Net"}).to_string();
    let (status, response) = send(&app, post("/switch", body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["success"], false);
    assert_eq!(response["error"], "模型不存在: Neural_Net");

    let (_, health) = send(&app, get("/health")).await;
    assert_eq!(health["current_model"], "Random_Forest");
    assert_eq!(state.service.current_model().await, "Random_Forest");
}

#[tokio::test]
async fn test_switch_requires_model_name() {
    let (app, _state, _dir) = setup_test_app(&["Random_Forest"]);

    for body in ["", "{}", r#"{"modelName": ""}"#, r#"{"modelName": 3}"#] {
        let (status, response) = send(&app, post("/switch", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(response["error"], "缺少模型名称");
    }
}

#[tokio::test]
async fn test_switch_twice_is_idempotent() {
    let (app, state, _dir) = setup_test_app(&["Random_Forest", "Logistic_Regression"]);

    let body = json!({"modelName": "Logistic_Regression"}).to_string();
    for _ in 0..2 {
        let (status, response) = send(&app, post("/switch", body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["success"], true);
        assert_eq!(response["message"], "已切换到模型: Logistic_Regression");
    }

    assert_eq!(state.service.cache().len(), 1);
    assert_eq!(state.service.cache().load_attempts(), 1);

    let (_, health) = send(&app, get("/health")).await;
    assert_eq!(health["current_model"], "Logistic_Regression");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_predicts_share_one_cache_entry() {
    let (app, state, _dir) = setup_test_app(&["Random_Forest"]);

    let first = send(&app, post("/predict", scenario_body()));
    let second = send(&app, post("/predict", scenario_body()));
    let ((status_a, a), (status_b, b)) = tokio::join!(first, second);

    assert_eq!(status_a, StatusCode::OK);
    assert_eq!(status_b, StatusCode::OK);
    assert_eq!(a["model_name"], b["model_name"]);
    assert_eq!(state.service.cache().len(), 1);
    assert_eq!(state.service.cache().load_attempts(), 1);
}

#[tokio::test]
async fn test_models_lists_catalog() {
    let (app, _state, _dir) = setup_test_app(&["Random_Forest", "Custom_Model"]);

    let (status, body) = send(&app, get("/models")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["current_model"], "Random_Forest");
    assert_eq!(body["feature_schema_version"], 1);

    let models = body["models"].as_array().unwrap();
    assert_eq!(models.len(), 4);
    assert_eq!(models[0]["name"], "Random_Forest");
    assert_eq!(models[0]["display_name"], "随机森林");
    assert_eq!(models[0]["available"], true);
    assert_eq!(models[0]["selected"], true);
    assert_eq!(models[1]["name"], "Gradient_Boosting");
    assert_eq!(models[1]["available"], false);
    assert_eq!(models[3]["name"], "Custom_Model");
    assert!(models[0].get("loaded_at").is_none());

    send(&app, post("/predict", scenario_body())).await;
    let (_, body) = send(&app, get("/models")).await;
    assert_eq!(body["models"][0]["loaded"], true);
    assert!(body["models"][0]["loaded_at"].is_string());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _state, _dir) = setup_test_app(&["Random_Forest"]);
    send(&app, post("/predict", scenario_body())).await;

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert!(text.contains("jobguard_prediction_latency_seconds"));
    assert!(text.contains("jobguard_predictions_total"));
    assert!(text.contains("jobguard_models_loaded"));
}
