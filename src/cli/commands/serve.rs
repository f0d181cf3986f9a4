//! HTTP chat server.
//!
//! Provides a health check and a streaming chat endpoint that relays answer
//! fragments as server-sent events.

use crate::assistant::Assistant;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::ConversationTurn;
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Shared application state.
pub struct AppState {
    pub assistant: Assistant,
}

/// Run the HTTP chat server until Ctrl+C.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    if let Err(e) = preflight::check(Operation::Serve) {
        Output::warning(&format!("{} /chat will fail until it is set.", e));
    }

    let spinner = Output::spinner("Indexing CDP documentation...");
    let assistant = Assistant::start(settings).await;
    spinner.finish_and_clear();
    let assistant = assistant?;

    if !assistant.store().is_available() {
        Output::warning("Documentation index is unavailable; answers will not include documentation.");
    }

    let state = Arc::new(AppState { assistant });
    let app = router(state.clone());

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("CDP Assistant API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat (SSE)", "POST /chat");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match Arc::try_unwrap(state) {
        Ok(state) => state.assistant.shutdown(),
        Err(_) => warn!("Assistant still referenced at shutdown"),
    }

    Ok(())
}

/// Build the API router over the shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default, alias = "conversationHistory")]
    conversation_history: Vec<ConversationTurn>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: error.into() })).into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn chat(State(state): State<Arc<AppState>>, Json(req): Json<ChatRequest>) -> Response {
    if req.message.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "message must not be empty");
    }

    info!(history = req.conversation_history.len(), "Chat request received");

    match state
        .assistant
        .stream_response(&req.message, &req.conversation_history)
        .await
    {
        Ok(fragments) => {
            let events = fragments.map(|fragment| Ok::<_, Infallible>(Event::default().data(sse_safe(&fragment))));
            Sse::new(events).keep_alive(KeepAlive::default()).into_response()
        }
        Err(e) => {
            warn!("Chat request rejected: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// SSE data lines cannot carry carriage returns.
fn sse_safe(fragment: &str) -> String {
    fragment.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::completion::CompletionClient;
    use crate::testing::{KeywordEmbedder, ScriptedCompletion};
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    async fn app(completion: Arc<ScriptedCompletion>) -> Router {
        let completion: Arc<dyn CompletionClient> = completion;
        let assistant = Assistant::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(KeywordEmbedder::new()),
            completion,
        )
        .await
        .unwrap();
        router(Arc::new(AppState { assistant }))
    }

    fn chat_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(Arc::new(ScriptedCompletion::fragments(&[]))).await;
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_chat_streams_fragments_as_events() {
        let app = app(Arc::new(ScriptedCompletion::fragments(&["Hello", " world"]))).await;
        let response = app
            .oneshot(chat_request(serde_json::json!({
                "message": "How do I set up a source in Segment?",
                "conversation_history": [],
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/event-stream"));

        let body = body_text(response).await;
        let hello = body.find("data: Hello").unwrap();
        let world = body.find("data:  world").unwrap();
        assert!(hello < world);
    }

    #[tokio::test]
    async fn test_chat_accepts_camel_case_history() {
        let completion = Arc::new(ScriptedCompletion::fragments(&["Sure."]));
        let app = app(completion.clone()).await;
        let response = app
            .oneshot(chat_request(serde_json::json!({
                "message": "And in Lytics?",
                "conversationHistory": [
                    {"role": "user", "content": "What is an audience?"},
                    {"role": "assistant", "content": "A group of profiles."},
                ],
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Sure."));

        let messages = &completion.prompts()[0];
        assert_eq!(messages[1].content, "What is an audience?");
        assert_eq!(messages[2].content, "A group of profiles.");
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_message() {
        let completion = Arc::new(ScriptedCompletion::fragments(&["unused"]));
        let app = app(completion.clone()).await;
        let response = app
            .oneshot(chat_request(serde_json::json!({ "message": "   " })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(completion.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_chat_missing_credential_is_server_error() {
        let app = app(Arc::new(ScriptedCompletion::unconfigured())).await;
        let response = app
            .oneshot(chat_request(serde_json::json!({ "message": "What is Zeotap?" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["error"].as_str().unwrap().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_sse_safe_strips_carriage_returns() {
        assert_eq!(sse_safe("a\r\nb\rc"), "a\nb\nc");
    }
}
