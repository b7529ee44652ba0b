//! taskdeck server: a dual-listener RPC runtime over stdio and HTTP.
//!
//! The server exposes task, project and note procedures as tools and
//! prompts. Both listeners share one [`handler::RpcHandler`] and one
//! [`router`]; the runtime in [`runtime`] owns their lifecycles, propagates a
//! shared cancellation signal, and aggregates the first fatal error.
//!
//! Domain data lives behind the upstream REST collaborator in [`upstream`];
//! this crate never persists anything itself.

pub mod config;
mod error;
pub mod handler;
pub mod prompts;
pub mod router;
pub mod runtime;
pub mod service;
pub mod tools;
pub mod transport;
pub mod upstream;

pub use config::ServerConfig;
pub use error::ServerError;
pub use handler::RpcHandler;
pub use runtime::TransportMode;
pub use service::TaskdeckService;
