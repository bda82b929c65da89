//! Servidor HTTP para la aplicación web.
//!
//! Expone las mismas operaciones que la CLI; `/gemini` devuelve el resultado
//! del Step 1 y deja el resto del pipeline en segundo plano bajo `RunMonitor`.

mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::pipeline::{monitor, Pipeline, RunMonitor};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub monitor: RunMonitor,
    pub projects: Arc<Vec<String>>,
    pub api_server: String,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ping", get(routes::ping))
        .route("/prompt", get(routes::prompt))
        .route("/gemini", post(routes::gemini))
        .route("/listTickets", get(routes::list_tickets_route))
        .route("/listProjects", get(routes::list_projects))
        .layer(cors)
        .with_state(state)
}

/// Arranca el servidor y el registro de ejecuciones en segundo plano
pub async fn run_server(
    bind: &str,
    port: u16,
    pipeline: Pipeline,
    projects: Vec<String>,
    api_server: String,
) -> anyhow::Result<()> {
    let (run_monitor, results) = RunMonitor::new();
    tokio::spawn(monitor::drain(results));

    let state = AppState {
        pipeline,
        monitor: run_monitor,
        projects: Arc::new(projects),
        api_server,
    };

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    log::info!("Servidor escuchando en http://{}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fakes::{FakeModel, FakeTracker};
    use crate::clients::IssuePage;
    use crate::models::RunResult;
    use crate::pipeline::tests::{rows_reply, structured_reply, DESCRIPTION};
    use crate::pipeline::PipelineOptions;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tower::ServiceExt;

    fn state(tracker: FakeTracker, model: FakeModel) -> (AppState, UnboundedReceiver<RunResult>) {
        let (monitor, results) = RunMonitor::new();
        let state = AppState {
            pipeline: Pipeline::new(Arc::new(tracker), Arc::new(model), PipelineOptions::default()),
            monitor,
            projects: Arc::new(vec!["GT".into(), "ENG".into()]),
            api_server: "https://acme.atlassian.net".into(),
        };
        (state, results)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let (state, _) = state(FakeTracker::default(), FakeModel::new());
        let (status, body) = send(router(state), get("/ping")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], 200);
        assert_eq!(body["body"]["result"], "pong");
        assert_eq!(body["body"]["apiServer"], "https://acme.atlassian.net");
    }

    #[tokio::test]
    async fn test_prompt_returns_template() {
        let (state, _) = state(FakeTracker::default(), FakeModel::new());
        let (_, body) = send(router(state), get("/prompt")).await;

        assert!(body["body"]["prompt"]
            .as_str()
            .unwrap()
            .contains("${description}"));
    }

    #[tokio::test]
    async fn test_gemini_returns_structured_text_early() {
        let model = FakeModel::new()
            .reply(&structured_reply(), 10)
            .reply(&rows_reply(), 10);
        let (state, mut results) = state(FakeTracker::with_description(DESCRIPTION), model);
        let (status, body) = send(
            router(state),
            post_json("/gemini", serde_json::json!({ "issueKey": "ABC-1" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["body"]["issueKey"], "ABC-1");
        assert!(body["body"]["structuredText"]
            .as_str()
            .unwrap()
            .contains("functionalTestCases"));

        let finished = results.recv().await.unwrap();
        assert!(finished.is_success());
    }

    #[tokio::test]
    async fn test_gemini_failure_is_500_with_stage() {
        let (state, _) = state(FakeTracker::default(), FakeModel::new());
        let (status, body) = send(
            router(state),
            post_json("/gemini", serde_json::json!({ "issueKey": "ABC-1" })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], 500);
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("ABC-1"));
        assert!(error.contains("Step 0"));
        assert!(body.get("body").is_none());
    }

    #[tokio::test]
    async fn test_gemini_rejects_malformed_key() {
        let tracker = Arc::new(FakeTracker::with_description(DESCRIPTION));
        let (monitor, _results) = RunMonitor::new();
        let state = AppState {
            pipeline: Pipeline::new(
                tracker.clone(),
                Arc::new(FakeModel::new()),
                PipelineOptions::default(),
            ),
            monitor,
            projects: Arc::new(vec![]),
            api_server: "https://acme.atlassian.net".into(),
        };

        for key in ["../../x", "", "ABC-1/comment"] {
            let (status, body) = send(
                router(state.clone()),
                post_json("/gemini", serde_json::json!({ "issueKey": key })),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["status"], 400);
            assert!(body["error"].as_str().unwrap().contains("no es una clave"));
        }
        assert!(tracker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_tickets_with_defaults() {
        let tracker = FakeTracker {
            page: IssuePage {
                keys: vec!["GT-7".into()],
                total: 1,
            },
            ..Default::default()
        };
        let (state, _) = state(tracker, FakeModel::new());
        let (status, body) = send(router(state), get("/listTickets?projectBoard=GT")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["body"]["issues"][0], "GT-7");
        assert_eq!(body["body"]["total"], 1);
        assert!(body["body"]["error"].is_null());
    }

    #[tokio::test]
    async fn test_list_tickets_without_project_reports_error() {
        let (state, _) = state(FakeTracker::default(), FakeModel::new());
        let (status, body) = send(router(state), get("/listTickets")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["body"]["issues"], serde_json::json!([]));
        assert!(body["body"]["error"].is_string());
    }

    #[tokio::test]
    async fn test_list_projects() {
        let (state, _) = state(FakeTracker::default(), FakeModel::new());
        let (_, body) = send(router(state), get("/listProjects")).await;

        assert_eq!(body["body"]["issues"], serde_json::json!(["GT", "ENG"]));
        assert_eq!(body["body"]["total"], 2);
    }
}
