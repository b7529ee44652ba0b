//! Client SDK for taskdeck servers.
//!
//! The SDK is layered exactly like the wire protocol:
//!
//! - [`sse`] decodes a `text/event-stream` body into logical events;
//! - [`transport`] issues one JSON-RPC call per HTTP round trip and owns the
//!   server-assigned session token;
//! - [`Client`] layers the mandatory initialize handshake and the typed
//!   functional operations (tools, prompts) on top of the transport;
//! - [`dispatch`] maps an opaque JSON intent document onto those operations.
//!
//! # Example
//!
//! ```rust,no_run
//! use taskdeck_client::{Client, HttpTransport, HttpTransportConfig};
//!
//! # async fn example() -> Result<(), taskdeck_client::ClientError> {
//! let transport = HttpTransport::new(HttpTransportConfig {
//!     base_url: "http://localhost:8080".into(),
//!     ..Default::default()
//! })?;
//! let client = Client::new(transport);
//!
//! // First functional call performs the handshake lazily.
//! let tools = client.list_tools().await?;
//! for tool in tools.tools {
//!     println!("{}", tool.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod dispatch;
mod error;
pub mod sse;
pub mod transport;

mod client;

pub use client::Client;
pub use dispatch::{dispatch, parse_intent, Intent};
pub use error::ClientError;
pub use sse::{SseDecoder, SseEvent};
pub use transport::{HttpTransport, HttpTransportConfig};
