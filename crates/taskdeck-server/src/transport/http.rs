//! HTTP listener.
//!
//! A single `/mcp` endpoint accepts POSTed JSON-RPC messages; axum rejects
//! other methods with 405. Replies are encoded as a one-event
//! `text/event-stream` body so clients can use the same streaming decoder
//! for every response. The `Mcp-Session-Id` header is minted on `initialize`
//! and echoed back on every other request that presents one.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use taskdeck_protocol::{JsonRpcResponse, SESSION_HEADER};

use crate::error::ServerError;
use crate::handler::RpcHandler;
use crate::router::{self, parse_request};

/// RPC endpoint path.
pub const ENDPOINT: &str = "/mcp";

/// Bound on the graceful drain after cancellation.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Clone)]
struct AppState<H> {
    handler: H,
}

/// Build the axum application for a handler.
pub fn app<H: RpcHandler>(handler: H) -> Router {
    Router::new()
        .route(ENDPOINT, post(handle_rpc::<H>))
        .with_state(AppState { handler })
}

/// Run the HTTP listener until cancellation.
///
/// On cancellation the listener stops accepting connections and drains
/// in-flight requests, bounded by a fixed grace period.
///
/// # Errors
///
/// [`ServerError::Bind`] when the address cannot be bound, otherwise I/O
/// failures from serving.
pub async fn run<H: RpcHandler>(
    handler: H,
    addr: SocketAddr,
    token: CancellationToken,
) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local = listener.local_addr()?;
    info!("http listener started on http://{local}{ENDPOINT}");

    let result = serve_with_shutdown(listener, app(handler), token).await;
    info!("http listener stopped");
    result
}

async fn serve_with_shutdown(
    listener: tokio::net::TcpListener,
    app: Router,
    token: CancellationToken,
) -> Result<(), ServerError> {
    let shutdown = token.clone();
    let serve = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .into_future();

    tokio::select! {
        result = serve => result.map_err(ServerError::Io),
        () = async {
            token.cancelled().await;
            tokio::time::sleep(SHUTDOWN_GRACE).await;
        } => {
            warn!("graceful drain exceeded {SHUTDOWN_GRACE:?}, abandoning in-flight connections");
            Ok(())
        }
    }
}

async fn handle_rpc<H: RpcHandler>(
    State(state): State<AppState<H>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    // Echo an existing session token; mint a fresh one on initialize. The
    // server is otherwise stateless per request.
    let presented = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(error_reply) => return sse_reply(&error_reply, presented),
    };

    let session = if request.method == "initialize" {
        let minted = Uuid::new_v4().to_string();
        debug!(session = %minted, "minted session token");
        Some(minted)
    } else {
        presented
    };

    match router::route_request(&state.handler, request).await {
        Some(reply) => sse_reply(&reply, session),
        None => {
            // Notifications are accepted with no body.
            let mut response = StatusCode::ACCEPTED.into_response();
            attach_session(&mut response, session);
            response
        }
    }
}

/// Encode one reply as a single-event stream body.
fn sse_reply(reply: &JsonRpcResponse, session: Option<String>) -> Response {
    let payload = match serde_json::to_string(reply) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("failed to encode reply: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let event_id = Uuid::new_v4();
    let body = format!("event: message\nid: {event_id}\ndata: {payload}\n\n");

    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/event-stream")],
        body,
    )
        .into_response();
    attach_session(&mut response, session);
    response
}

fn attach_session(response: &mut Response, session: Option<String>) {
    if let Some(session) = session {
        match axum::http::HeaderValue::from_str(&session) {
            Ok(value) => {
                response
                    .headers_mut()
                    .insert(axum::http::HeaderName::from_static("mcp-session-id"), value);
            }
            Err(_) => warn!("session token was not a valid header value"),
        }
    }
}
