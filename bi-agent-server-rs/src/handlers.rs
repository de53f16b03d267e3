use crate::models::{create_run_input, ErrorResponse, QueryRequest};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{
        sse::{Event as SseEvent, Sse},
        IntoResponse, Json, Response,
    },
};
use bi_agent_sdk_rs::agent::Agent;
use serde_json::json;
use std::sync::Arc;
use tokio_stream::{Stream, StreamExt};

pub struct AppState {
    pub agent: Arc<dyn Agent>,
}

impl AppState {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }
}

#[derive(Debug)]
pub enum ApiError {
    MissingQuery,
    InvalidBody(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // A body without a JSON content type reads as an empty request
            JsonRejection::MissingJsonContentType(_) => ApiError::MissingQuery,
            other => ApiError::InvalidBody(other.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingQuery => bad_request("Query is required".to_string()),
            ApiError::InvalidBody(reason) => bad_request(reason),
        }
    }
}

fn bad_request(error: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
}

pub async fn health() -> impl IntoResponse {
    "OK"
}

pub async fn alive() -> impl IntoResponse {
    Json(json!({
        "status": "ok"
    }))
}

/// Runs the agent on one query and streams every protocol event as an SSE `data:` frame.
///
/// When the client disconnects axum drops the response stream, which drops the agent's
/// event stream and cancels the run.
pub async fn submit_query(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, axum::Error>>>, ApiError> {
    let Json(req) = payload?;
    let query = req
        .query
        .filter(|q| !q.is_empty())
        .ok_or(ApiError::MissingQuery)?;

    let input = create_run_input(&query);
    tracing::info!(run_id = %input.run_id, "streaming agent run");

    let frames = state
        .agent
        .run(input)
        .map(|event| SseEvent::default().json_data(&event));
    Ok(Sse::new(frames))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use async_trait::async_trait;
    use bi_agent_sdk_rs::agent::{AgentConfig, BiAgent};
    use bi_agent_sdk_rs::error::AgentError;
    use bi_agent_sdk_rs::intent::{Classifier, Intent};
    use serde_json::Value;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tempfile::tempdir;
    use tower::ServiceExt;

    /// Sleeps before answering and records whether it got to finish.
    struct SlowClassifier {
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Classifier for SlowClassifier {
        async fn classify(&self, _query: &str) -> Result<Intent, AgentError> {
            tokio::time::sleep(Duration::from_millis(300)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(Intent::information())
        }
    }

    fn test_app(static_dir: &Path) -> axum::Router {
        let agent = BiAgent::new(AgentConfig::default());
        app(Arc::new(AppState::new(Arc::new(agent))), static_dir)
    }

    fn post_query(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/query")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn parse_frames(body: &str) -> Vec<Value> {
        body.split("\n\n")
            .filter(|frame| !frame.trim().is_empty())
            .map(|frame| {
                let data = frame
                    .strip_prefix("data:")
                    .expect("frame should be a data line")
                    .trim_start();
                serde_json::from_str(data).unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_health_and_alive() {
        let dir = tempdir().unwrap();

        let response = test_app(dir.path())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");

        let response = test_app(dir.path())
            .oneshot(Request::get("/alive").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_query_streams_one_frame_per_event() {
        let dir = tempdir().unwrap();
        let response = test_app(dir.path())
            .oneshot(post_query(r#"{"query": "show me a bar chart of sales by region"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/event-stream"));

        let frames = parse_frames(&body_text(response).await);
        let types: Vec<&str> = frames.iter().map(|f| f["type"].as_str().unwrap()).collect();
        assert_eq!(types.first(), Some(&"RUN_STARTED"));
        assert_eq!(types.last(), Some(&"RUN_FINISHED"));
        assert_eq!(types.len(), 10);
        assert!(frames[0]["runId"].as_str().unwrap().starts_with("run-"));
        assert_eq!(frames[4]["toolCallName"], "chart");
    }

    #[tokio::test]
    async fn test_information_query_has_no_tool_call() {
        let dir = tempdir().unwrap();
        let response = test_app(dir.path())
            .oneshot(post_query(r#"{"query": "hello"}"#))
            .await
            .unwrap();

        let frames = parse_frames(&body_text(response).await);
        assert_eq!(frames.len(), 6);
        assert!(frames
            .iter()
            .all(|f| !f["type"].as_str().unwrap().starts_with("TOOL_CALL")));
    }

    #[tokio::test]
    async fn test_missing_query_is_rejected() {
        let dir = tempdir().unwrap();
        for body in [r#"{"query": ""}"#, r#"{}"#] {
            let response = test_app(dir.path()).oneshot(post_query(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
            assert_eq!(body["error"], "Query is required");
        }
    }

    #[tokio::test]
    async fn test_unusable_body_is_a_json_bad_request() {
        let dir = tempdir().unwrap();

        let no_content_type = Request::builder()
            .method("POST")
            .uri("/api/query")
            .body(Body::from(r#"{"query": "hi"}"#))
            .unwrap();
        let response = test_app(dir.path()).oneshot(no_content_type).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"], "Query is required");

        for bad in [r#"{"query": 5}"#, "not json"] {
            let response = test_app(dir.path()).oneshot(post_query(bad)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {:?}", bad);
            let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
            assert!(!body["error"].as_str().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_client_disconnect_cancels_run() {
        let dir = tempdir().unwrap();
        let finished = Arc::new(AtomicBool::new(false));
        let classifier = SlowClassifier {
            finished: finished.clone(),
        };
        let agent = BiAgent::with_classifier(Arc::new(classifier), AgentConfig::default());
        let router = app(Arc::new(AppState::new(Arc::new(agent))), dir.path());

        let response = router
            .oneshot(post_query(r#"{"query": "pie chart"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut body = response.into_body().into_data_stream();
        let first = body.next().await.unwrap().unwrap();
        let first = String::from_utf8(first.to_vec()).unwrap();
        assert!(first.contains("RUN_STARTED"));

        drop(body);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_static_files_and_cors() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>BI</h1>").unwrap();

        let response = test_app(dir.path())
            .oneshot(
                Request::get("/index.html")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(body_text(response).await, "<h1>BI</h1>");
    }
}
