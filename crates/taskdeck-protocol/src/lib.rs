//! Wire types shared by the taskdeck client and server.
//!
//! This crate defines the JSON-RPC 2.0 envelopes carried over every taskdeck
//! transport, plus the typed request/result shapes for the protocol's
//! lifecycle (`initialize`) and functional (`tools/*`, `prompts/*`) methods.
//! It carries no I/O; the transports in `taskdeck-client` and
//! `taskdeck-server` serialize these types with `serde_json`.

pub mod jsonrpc;
pub mod types;

pub use jsonrpc::{
    ErrorObject, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, JsonRpcVersion, RequestId,
    JSONRPC_VERSION,
};

/// Protocol revision spoken by this implementation.
///
/// Sent by the client in `initialize` and echoed by the server in its
/// `InitializeResult`. Version negotiation is out of scope: a server that
/// cannot speak this revision replies with a protocol-level error.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

/// Name of the HTTP header that carries the session token in both directions.
pub const SESSION_HEADER: &str = "Mcp-Session-Id";
