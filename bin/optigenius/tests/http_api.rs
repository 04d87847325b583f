// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use llm_contracts::{LlmError, LlmResult};
use optiflow::llm::{LlmAdapter, LlmManager};
use optiflow::workflow::WorkflowConfig;
use optigenius::http::build_router;
use optigenius::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct OfflineAdapter;

#[async_trait]
impl LlmAdapter for OfflineAdapter {
    async fn generate_response(&self, _prompt: &str) -> LlmResult<String> {
        Err(LlmError::Network("offline test adapter".to_string()))
    }
}

fn test_router() -> Router {
    let llm = Arc::new(LlmManager::from_adapter(Box::new(OfflineAdapter)));
    build_router(AppState::new(llm, WorkflowConfig::default()))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_scenario_catalogue_listing() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/v1/scenarios")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let catalogue = body["scenarios"].as_array().unwrap();
    assert_eq!(catalogue.len(), 6);
    assert!(catalogue
        .iter()
        .any(|s| s["slug"] == "demand-supply-matching"));
}

#[tokio::test]
async fn test_scenario_data_is_deterministic_for_a_seed() {
    let uri = "/v1/scenarios/demand-supply-matching/data?seed=7";

    let first = test_router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first = body_json(first).await;

    let second = test_router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let second = body_json(second).await;

    assert_eq!(first, second);
    assert_eq!(first["seed"], 7);
    assert_eq!(first["tables"].as_array().unwrap().len(), 3);
    assert!(first["markdown"].as_str().unwrap().contains("| --- |"));
}

#[tokio::test]
async fn test_unknown_scenario_is_not_found() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/v1/scenarios/warehouse-tetris/data")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNKNOWN_SCENARIO");
}

#[tokio::test]
async fn test_session_request_needs_scenario_or_statement() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/sessions")
                .header("content-type", "application/json")
                .body(Body::from(json!({}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_failed_workflow_maps_to_bad_gateway() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/sessions")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"problem_statement": "minimise freight spend"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["code"], "WORKFLOW_FAILED");
}

#[tokio::test]
async fn test_missing_session_is_not_found() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/v1/sessions/00000000-0000-0000-0000-000000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "SESSION_NOT_FOUND");
}
