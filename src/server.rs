use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tracing::info;

use crate::AppState;
use crate::chat::wire::{ChatReply, ChatRequest, ErrorBody};
use crate::config::AppConfig;
use crate::llm::{MessageRole, Orchestrator};

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>, orchestrator: Orchestrator) -> anyhow::Result<()> {
    info!(
        name: "llm.config.loaded",
        base_url = %config.llm.base_url,
        model = %orchestrator.model(),
        "LLM configuration loaded"
    );

    let state = AppState::new(Arc::clone(&config), orchestrator);
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(name: "server.stopped", "Server stopped");
    Ok(())
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    let timeout_duration = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route("/chat/", post(chat_endpoint))
        .route("/chat", post(chat_endpoint))
        .route("/health", get(health))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| {
                let duration = timeout_duration;
                async move {
                    match tokio::time::timeout(duration, next.run(req)).await {
                        Ok(res) => res,
                        Err(_) => ApiError::Timeout.into_response(),
                    }
                }
            },
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failures surfaced to clients as `{ "detail": ... }`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request was well-formed JSON but not acceptable.
    #[error("{0}")]
    BadRequest(String),

    /// The upstream model call failed.
    #[error("{0:#}")]
    Upstream(anyhow::Error),

    /// The request took longer than `server.request_timeout_secs`.
    #[error("Request timed out")]
    Timeout,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /chat/ - Append a message to a conversation and return the reply.
async fn chat_endpoint(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    tracing::info!(
        conversation_id = %req.conversation_id,
        role = %req.role(),
        "Received chat request"
    );

    let role: MessageRole = req.role().parse().map_err(ApiError::BadRequest)?;

    let conversation = state
        .conversations
        .get_or_create(req.conversation_id.as_str());
    conversation.add_message(role, req.message);

    let response = state
        .orchestrator
        .complete(conversation.messages())
        .await
        .map_err(|e| {
            tracing::error!(
                name: "chat.upstream.failed",
                conversation_id = %req.conversation_id,
                error = %e,
                "Upstream completion failed"
            );
            ApiError::Upstream(e)
        })?;

    conversation.add_assistant_message(response.clone());

    Ok(Json(ChatReply {
        response,
        conversation_id: req.conversation_id,
    }))
}

/// GET /health - Liveness probe.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Theme;
    use crate::config::{ClientConfig, LlmConfig, ServerConfig};
    use crate::llm::{LlmDriver, LlmRequest, LlmStream};
    use axum::body::Body;
    use axum::http::{Method, header};
    use tower::ServiceExt;

    struct Unused;

    #[async_trait::async_trait]
    impl LlmDriver for Unused {
        async fn stream(&self, _req: LlmRequest) -> anyhow::Result<LlmStream> {
            anyhow::bail!("not called")
        }
    }

    fn app() -> Router {
        let config = AppConfig {
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
                request_timeout_secs: 5,
            },
            client: ClientConfig {
                endpoint: crate::chat::client::DEFAULT_ENDPOINT.to_string(),
                theme: Theme::Dark,
                log_file: "ai-chatbot.log".to_string(),
            },
            llm: LlmConfig {
                base_url: "http://127.0.0.1:1".to_string(),
                model: "test".to_string(),
                api_key: None,
                system_prompt: String::new(),
                temperature: 1.0,
                max_tokens: 1024,
                top_p: 1.0,
            },
        };
        let orchestrator = Orchestrator::with_driver("test", Arc::new(Unused));
        router(AppState::new(Arc::new(config), orchestrator))
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let req = axum::http::Request::builder()
            .method(Method::OPTIONS)
            .uri("/chat/")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let resp = app().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_timeout_body() {
        let resp = ApiError::Timeout.into_response();
        assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"detail": "Request timed out"}));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Upstream(anyhow::anyhow!("down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Timeout.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn test_upstream_error_includes_cause_chain() {
        let err = anyhow::anyhow!("connection refused").context("sending request");
        assert_eq!(
            ApiError::Upstream(err).to_string(),
            "sending request: connection refused"
        );
    }
}
