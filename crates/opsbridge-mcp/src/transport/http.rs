//! HTTP transport — one POST endpoint carrying JSON-RPC, answered as an SSE
//! stream of zero or more notification frames followed by one response frame.
//!
//! GET and DELETE on the endpoint are rejected with 405 and a JSON-RPC error
//! body. Client disconnect drops the stream, which closes the session and
//! suppresses any remaining emission.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::sse::{Event, Sse},
    response::{IntoResponse, Json as AxumJson, Response},
    routing::{get, post},
    Router,
};
use tokio::sync::mpsc;

use opsbridge::Connectors;

use crate::actions::ActionRegistry;
use crate::protocol::ProtocolHandler;
use crate::session::{Session, SessionEvent};
use crate::types::{
    error_codes, JsonRpcError, JsonRpcMessage, McpError, McpResult, RequestId,
};

/// Shared server state passed to all handlers via axum State.
pub struct ServerState {
    pub token: Option<String>,
    pub connectors: Connectors,
}

/// HTTP transport for web-based MCP clients.
pub struct HttpTransport {
    state: Arc<ServerState>,
}

impl HttpTransport {
    pub fn new(token: Option<String>, connectors: Connectors) -> Self {
        Self {
            state: Arc::new(ServerState { token, connectors }),
        }
    }

    /// Run the HTTP server on the given address.
    pub async fn run(&self, addr: &str) -> McpResult<()> {
        let app = router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(McpError::Io)?;

        tracing::info!("HTTP transport listening on {addr}");

        axum::serve(listener, app)
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// The full route table. Exposed separately so tests can drive the router
/// without binding a socket.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route(
            "/mcp",
            post(handle_request)
                .get(handle_not_allowed)
                .delete(handle_not_allowed),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_layer))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// The 405 body for non-POST verbs on the endpoint.
pub fn method_not_allowed_body() -> serde_json::Value {
    serde_json::to_value(McpError::MethodNotAllowed.to_json_rpc_error(RequestId::Null))
        .unwrap_or_default()
}

/// Auth middleware — checks Bearer token if configured.
/// /health is handled by a separate route that bypasses this layer.
async fn auth_layer(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    request: axum::extract::Request,
    next: middleware::Next,
) -> Response {
    if let Some(expected) = &state.token {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected);

        if !authorized {
            let body = serde_json::to_value(
                McpError::Unauthorized.to_json_rpc_error(RequestId::Null),
            )
            .unwrap_or_default();
            return (StatusCode::UNAUTHORIZED, AxumJson(body)).into_response();
        }
    }

    next.run(request).await
}

/// One POST becomes one session: parse, dispatch, and stream the session's
/// events back until the terminal response frame.
///
/// A body that does not parse as a JSON-RPC envelope is a protocol-level
/// fault before any headers have been sent, so it answers with HTTP 500 and
/// the generic server error code.
async fn handle_request(
    State(state): State<Arc<ServerState>>,
    body: String,
) -> Result<Response, Response> {
    let msg: JsonRpcMessage = serde_json::from_str(&body).map_err(|e| {
        let body = serde_json::to_value(JsonRpcError::new(
            RequestId::Null,
            error_codes::SERVER_ERROR,
            format!("Parse error: {e}"),
        ))
        .unwrap_or_default();
        (StatusCode::INTERNAL_SERVER_ERROR, AxumJson(body)).into_response()
    })?;

    let registry = ActionRegistry::with_default_actions(state.connectors.clone());
    let (session, rx) = Session::new(registry);
    session.connect();
    let handler = Arc::new(ProtocolHandler::new(session));

    tokio::spawn({
        let handler = handler.clone();
        async move { handler.process(msg).await }
    });

    Ok(Sse::new(event_stream(rx)).into_response())
}

/// Map session events onto SSE frames: `notification` frames first, then one
/// `response` frame, then end of stream. Dropping the returned stream (client
/// disconnect) drops the receiver, which closes the session.
fn event_stream(
    rx: mpsc::UnboundedReceiver<SessionEvent>,
) -> impl futures::Stream<Item = Result<Event, axum::Error>> {
    futures::stream::unfold((rx, false), |(mut rx, done)| async move {
        if done {
            return None;
        }
        match rx.recv().await? {
            SessionEvent::Notification(n) => {
                let event = Event::default().event("notification").json_data(&n);
                Some((event, (rx, false)))
            }
            SessionEvent::Response(value) => {
                if value.is_null() {
                    // Inbound notification: nothing to reply, just end.
                    return None;
                }
                let event = Event::default().event("response").json_data(&value);
                Some((event, (rx, true)))
            }
        }
    })
}

/// Non-POST verbs on the endpoint are a protocol-level rejection.
async fn handle_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        AxumJson(method_not_allowed_body()),
    )
        .into_response()
}

/// Health check endpoint — no auth required.
async fn handle_health() -> AxumJson<serde_json::Value> {
    AxumJson(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "actions": ActionRegistry::DEFAULT_NAMES.len(),
    }))
}
