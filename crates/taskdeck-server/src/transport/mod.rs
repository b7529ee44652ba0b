//! Transport listeners sharing the request-handling core.

pub mod http;
pub mod stdio;
