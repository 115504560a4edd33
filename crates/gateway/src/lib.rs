//! HTTP gateway for chatrelay.
//!
//! One mutation route: `POST /chat`. The chat route handles its own method
//! dispatch so the original contract holds exactly — `OPTIONS` answers the
//! CORS preflight with a 200 body, any verb other than `POST` gets a 405,
//! and every response (success or error) carries the same fixed permissive
//! CORS headers. A `GET /health` probe rides alongside.
//!
//! Built on Axum. Failures reach a single boundary where the typed error
//! picks the status code: validation → 400, store/LLM → 500.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{any, get};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use chatrelay_core::turn::UserId;
use chatrelay_core::{Error, HistoryStore, LlmClient};
use chatrelay_exchange::Exchange;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub exchange: Exchange,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", any(chat_dispatch))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// The store handle and LLM client are built ONCE here and injected into
/// the handler state, so tests can substitute fakes via [`build_router`].
pub async fn start(config: chatrelay_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let store: Arc<dyn HistoryStore> = chatrelay_history::build_from_config(&config.history).await?;
    let llm: Arc<dyn LlmClient> = Arc::new(chatrelay_llm::build_from_config(&config));

    let state = Arc::new(GatewayState {
        exchange: Exchange::new(store, llm),
    });

    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    user_prompt: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    ai_reply: String,
}

#[derive(Serialize)]
struct PreflightResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

// --- Handlers ---

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `/chat` — the method state machine of the relay.
async fn chat_dispatch(State(state): State<SharedState>, method: Method, body: Bytes) -> Response {
    match method {
        Method::OPTIONS => with_cors(
            StatusCode::OK,
            Json(PreflightResponse {
                message: "CORS preflight success",
            }),
        ),
        Method::POST => match handle_chat(&state, &body).await {
            Ok(reply) => with_cors(StatusCode::OK, Json(ChatResponse { ai_reply: reply })),
            Err(err) => error_response(err),
        },
        _ => with_cors(
            StatusCode::METHOD_NOT_ALLOWED,
            Json(ErrorResponse {
                error: "Only POST requests are allowed".into(),
            }),
        ),
    }
}

/// Validate the body and run the exchange. No side effects before the
/// prompt has been accepted.
async fn handle_chat(state: &GatewayState, body: &[u8]) -> chatrelay_core::Result<String> {
    let request: ChatRequest = serde_json::from_slice(body)
        .map_err(|_| Error::Validation(MISSING_PROMPT.into()))?;

    let prompt = match request.user_prompt.as_deref() {
        Some(p) if !p.is_empty() => p,
        _ => return Err(Error::Validation(MISSING_PROMPT.into())),
    };

    let user_id = request
        .user_id
        .map(UserId::new)
        .unwrap_or_default();

    state.exchange.handle(&user_id, prompt).await
}

const MISSING_PROMPT: &str = "Missing 'user_prompt' in request body.";

/// Map a typed failure onto the right status code at the single boundary.
fn error_response(err: Error) -> Response {
    let status = match err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "Chat request failed");
    }

    with_cors(
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Attach the fixed permissive CORS headers. Every response shape carries
/// them, errors included.
fn with_cors(status: StatusCode, body: impl IntoResponse) -> Response {
    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chatrelay_core::error::LlmError;
    use chatrelay_core::turn::Role;
    use chatrelay_core::wire::Content;
    use chatrelay_history::InMemoryStore;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct StubLlm {
        reply: std::result::Result<String, LlmError>,
    }

    #[async_trait]
    impl LlmClient for StubLlm {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, _contents: &[Content]) -> std::result::Result<String, LlmError> {
            self.reply.clone()
        }
    }

    fn test_app(reply: std::result::Result<String, LlmError>) -> (Router, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let llm = Arc::new(StubLlm { reply });
        let state = Arc::new(GatewayState {
            exchange: Exchange::new(store.clone(), llm),
        });
        (build_router(state), store)
    }

    fn post_chat(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_cors(response: &Response) {
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type");
    }

    #[tokio::test]
    async fn options_answers_preflight_regardless_of_body() {
        let (app, _store) = test_app(Ok("unused".into()));

        let req = Request::builder()
            .method("OPTIONS")
            .uri("/chat")
            .body(Body::from("definitely not json"))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        let json = body_json(response).await;
        assert_eq!(json["message"], "CORS preflight success");
    }

    #[tokio::test]
    async fn non_post_methods_are_rejected() {
        for method in ["GET", "PUT", "DELETE", "PATCH"] {
            let (app, _store) = test_app(Ok("unused".into()));
            let req = Request::builder()
                .method(method)
                .uri("/chat")
                .body(Body::empty())
                .unwrap();

            let response = app.oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_cors(&response);
            let json = body_json(response).await;
            assert_eq!(json["error"], "Only POST requests are allowed");
        }
    }

    #[tokio::test]
    async fn missing_prompt_is_rejected_without_writes() {
        for body in ["{}", r#"{"user_prompt": ""}"#, "not json at all"] {
            let (app, store) = test_app(Ok("unused".into()));
            let response = app.oneshot(post_chat(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_cors(&response);
            let json = body_json(response).await;
            assert_eq!(json["error"], "Missing 'user_prompt' in request body.");
            assert_eq!(store.count(&UserId::default()).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn successful_exchange_replies_and_persists() {
        let (app, store) = test_app(Ok("Hi there".into()));

        let response = app
            .oneshot(post_chat(r#"{"user_prompt": "Hello", "user_id": "u1"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        let json = body_json(response).await;
        assert_eq!(json["ai_reply"], "Hi there");

        let user = UserId::from("u1");
        let turns = store.recent(&user, 6).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!((turns[0].role, turns[0].content.as_str()), (Role::User, "Hello"));
        assert_eq!((turns[1].role, turns[1].content.as_str()), (Role::Bot, "Hi there"));
    }

    #[tokio::test]
    async fn absent_user_id_falls_back_to_default() {
        let (app, store) = test_app(Ok("ok".into()));

        let response = app
            .oneshot(post_chat(r#"{"user_prompt": "Hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.count(&UserId::default()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn llm_failure_is_a_500_with_no_writes() {
        let (app, store) = test_app(Err(LlmError::ApiError {
            status_code: 503,
            message: "upstream down".into(),
        }));

        let response = app
            .oneshot(post_chat(r#"{"user_prompt": "Hello", "user_id": "u1"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("upstream down"));
        assert_eq!(store.count(&UserId::from("u1")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (app, _store) = test_app(Ok("unused".into()));

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }
}
