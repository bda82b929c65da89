use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::AppState;
use crate::pipeline::{list_tickets, TicketListing, TicketQuery};
use crate::utils::{is_valid_ticket_key, INSTRUCTION_TEMPLATE};

/// Respuesta común de todas las rutas; el código HTTP coincide con `status`
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn ok(body: impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Envelope {
                status: 200,
                body: Some(body),
                error: None,
            },
            Err(e) => Envelope::failed(500, e.to_string()),
        }
    }

    pub fn failed(status: u16, error: impl Into<String>) -> Self {
        Envelope {
            status,
            body: None,
            error: Some(error.into()),
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub issue_key: String,
    pub prompt: Option<String>,
}

pub async fn ping(State(state): State<AppState>) -> Envelope {
    Envelope::ok(json!({ "result": "pong", "apiServer": state.api_server }))
}

pub async fn prompt() -> Envelope {
    Envelope::ok(json!({ "prompt": INSTRUCTION_TEMPLATE }))
}

/// Devuelve el texto estructurado tras el Step 1 y sigue en segundo plano
pub async fn gemini(State(state): State<AppState>, Json(request): Json<GenerateRequest>) -> Envelope {
    if !is_valid_ticket_key(&request.issue_key) {
        return Envelope::failed(
            400,
            format!("'{}' no es una clave de ticket válida (ej. ABC-123)", request.issue_key),
        );
    }

    let custom_prompt = request.prompt.as_deref().filter(|p| !p.trim().is_empty());

    match state
        .pipeline
        .run_detached(&request.issue_key, custom_prompt, &state.monitor)
        .await
    {
        Ok(early) => Envelope::ok(early),
        Err(run) => Envelope::failed(
            500,
            run.error
                .unwrap_or_else(|| format!("[{}] ejecución fallida", run.issue_key)),
        ),
    }
}

pub async fn list_tickets_route(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Envelope {
    let query = TicketQuery::from_params(
        params.get("startAt").map(String::as_str),
        params.get("maxResults").map(String::as_str),
        params.get("projectBoard").map(String::as_str),
    );

    Envelope::ok(list_tickets(state.pipeline.tracker(), &query).await)
}

pub async fn list_projects(State(state): State<AppState>) -> Envelope {
    Envelope::ok(TicketListing {
        issues: state.projects.to_vec(),
        total: state.projects.len() as u64,
        error: None,
    })
}
