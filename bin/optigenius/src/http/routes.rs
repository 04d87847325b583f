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

use crate::http::dashboard::DASHBOARD_HTML;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use optiflow::workflow::{SessionRecord, SessionStatus, Workflow, WorkflowInput};
use scenarios::Scenario;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub request_id: String,
    #[serde(skip)]
    status: StatusCode,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            request_id: Uuid::new_v4().to_string(),
            status,
        }
    }

    fn unknown_scenario(slug: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "UNKNOWN_SCENARIO",
            format!("No scenario is registered under the slug '{slug}'."),
        )
    }

    fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
    }

    fn session_not_found(id: Uuid) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "SESSION_NOT_FOUND",
            format!("No session record exists for id '{id}'."),
        )
    }

    fn workflow_failed(record: &SessionRecord) -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            "WORKFLOW_FAILED",
            format!(
                "Session {} failed: {}",
                record.id,
                record.error.as_deref().unwrap_or("unknown error")
            ),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(self);
        (status, body).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub scenario: Option<String>,
    pub seed: Option<u64>,
    pub problem_statement: Option<String>,
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_scenarios() -> impl IntoResponse {
    let catalogue: Vec<Value> = Scenario::all()
        .iter()
        .map(|scenario| {
            json!({
                "slug": scenario.slug(),
                "title": scenario.title(),
                "description": scenario.description(),
            })
        })
        .collect();
    Json(json!({ "scenarios": catalogue }))
}

async fn scenario_data(
    Path(slug): Path<String>,
    Query(query): Query<DataQuery>,
) -> Result<Json<Value>, ApiError> {
    let scenario =
        Scenario::from_slug(&slug).map_err(|_| ApiError::unknown_scenario(&slug))?;
    let seed = query.seed.unwrap_or(scenarios::DEFAULT_SEED);
    let data = scenarios::generate(scenario, seed);

    Ok(Json(json!({
        "scenario": scenario.slug(),
        "title": scenario.title(),
        "seed": seed,
        "problem_statement": data.problem_statement,
        "objective": data.objective,
        "constraints": data.constraints,
        "tables": data.tables,
        "markdown": data.tables_markdown(),
    })))
}

async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionRecord>, ApiError> {
    let input = match (&request.scenario, &request.problem_statement) {
        (Some(slug), None) => {
            let scenario =
                Scenario::from_slug(slug).map_err(|_| ApiError::unknown_scenario(slug))?;
            WorkflowInput::Scenario {
                scenario,
                seed: request.seed.unwrap_or(scenarios::DEFAULT_SEED),
            }
        }
        (None, Some(statement)) if !statement.trim().is_empty() => WorkflowInput::Custom {
            problem_statement: statement.clone(),
        },
        _ => {
            return Err(ApiError::invalid_request(
                "Provide either 'scenario' (with optional 'seed') or a non-empty 'problem_statement'.",
            ))
        }
    };

    let workflow = Workflow::new(state.llm.clone(), state.workflow_config.clone());
    let record = workflow.run(input).await;
    info!(session_id = %record.id, status = ?record.status, "Session stored");
    state
        .sessions
        .write()
        .await
        .insert(record.id, record.clone());

    if record.status == SessionStatus::Failed {
        return Err(ApiError::workflow_failed(&record));
    }
    Ok(Json(record))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionRecord>, ApiError> {
    state
        .sessions
        .read()
        .await
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::session_not_found(id))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/v1/health", get(health))
        .route("/v1/scenarios", get(list_scenarios))
        .route("/v1/scenarios/{slug}/data", get(scenario_data))
        .route("/v1/sessions", post(create_session))
        .route("/v1/sessions/{id}", get(get_session))
        .with_state(state)
}
