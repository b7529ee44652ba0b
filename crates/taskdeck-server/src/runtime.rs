//! Dual-listener runtime.
//!
//! Starts one task per selected listener, all sharing the request-handling
//! core and one cancellation token. The first fatal error from any listener
//! wins and cancels the rest; a cancellation-triggered exit is not an error.
//! The runtime returns only after every spawned listener has been joined.

use std::fmt;
use std::net::SocketAddr;

use clap::ValueEnum;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::ServerError;
use crate::handler::RpcHandler;
use crate::transport::{http, stdio};

/// Which listeners to start. A closed enum: an empty listener set cannot be
/// expressed, so misconfiguration is rejected when the mode is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportMode {
    /// Standard-stream listener only.
    Stdio,
    /// HTTP listener only.
    Http,
    /// Both listeners in one process.
    Both,
}

impl TransportMode {
    /// Whether the stdio listener is selected.
    pub fn includes_stdio(self) -> bool {
        matches!(self, Self::Stdio | Self::Both)
    }

    /// Whether the HTTP listener is selected.
    pub fn includes_http(self) -> bool {
        matches!(self, Self::Http | Self::Both)
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// Run every selected listener to completion.
///
/// # Errors
///
/// The first fatal listener error, or a join error if a listener task
/// panicked. Cancellation alone produces `Ok(())`.
pub async fn run<H: RpcHandler>(
    handler: H,
    mode: TransportMode,
    bind: SocketAddr,
    token: CancellationToken,
) -> Result<(), ServerError> {
    info!(%mode, "starting runtime");

    let mut listeners: JoinSet<(&'static str, Result<(), ServerError>)> = JoinSet::new();

    if mode.includes_stdio() {
        let handler = handler.clone();
        let token = token.clone();
        listeners.spawn(async move { ("stdio", stdio::run(handler, token).await) });
    }
    if mode.includes_http() {
        let handler = handler.clone();
        let token = token.clone();
        listeners.spawn(async move { ("http", http::run(handler, bind, token).await) });
    }

    supervise(listeners, token).await
}

/// Join every listener before returning; the first failure cancels the
/// others so they drain instead of lingering.
async fn supervise(
    mut listeners: JoinSet<(&'static str, Result<(), ServerError>)>,
    token: CancellationToken,
) -> Result<(), ServerError> {
    let mut first_error: Option<ServerError> = None;

    while let Some(joined) = listeners.join_next().await {
        match joined {
            Ok((name, Ok(()))) => info!(listener = name, "listener exited"),
            Ok((name, Err(e))) => {
                error!(listener = name, "listener failed: {e}");
                if first_error.is_none() {
                    first_error = Some(e);
                }
                token.cancel();
            }
            Err(join_error) => {
                error!("listener task panicked: {join_error}");
                if first_error.is_none() {
                    first_error = Some(ServerError::Join(join_error));
                }
                token.cancel();
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            info!("runtime stopped");
            Ok(())
        }
    }
}
