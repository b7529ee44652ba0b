//! Server configuration from flags and environment.

use std::net::SocketAddr;

use clap::Parser;

use crate::runtime::TransportMode;

/// Command-line and environment configuration for `taskdeck-server`.
///
/// Every flag has a `TASKDECK_*` environment fallback so the server can run
/// flag-less under a process manager.
#[derive(Debug, Clone, Parser)]
#[command(name = "taskdeck-server", version, about = "taskdeck RPC server")]
pub struct ServerConfig {
    /// Which listeners to start.
    #[arg(long, value_enum, env = "TASKDECK_TRANSPORT", default_value = "stdio")]
    pub transport: TransportMode,

    /// Bind address for the HTTP listener.
    #[arg(long, env = "TASKDECK_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Base URL of the upstream task-manager REST API.
    #[arg(long, env = "TASKDECK_UPSTREAM_URL", default_value = "http://localhost:3000")]
    pub upstream_url: String,

    /// Log filter directive (tracing `EnvFilter` syntax).
    #[arg(long, env = "TASKDECK_LOG", default_value = "info")]
    pub log: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stdio_only() {
        let config = ServerConfig::parse_from(["taskdeck-server"]);
        assert_eq!(config.transport, TransportMode::Stdio);
        assert_eq!(config.bind.port(), 8080);
    }

    #[test]
    fn transport_mode_parses_all_variants() {
        for (flag, mode) in [
            ("stdio", TransportMode::Stdio),
            ("http", TransportMode::Http),
            ("both", TransportMode::Both),
        ] {
            let config = ServerConfig::parse_from(["taskdeck-server", "--transport", flag]);
            assert_eq!(config.transport, mode);
        }
    }

    #[test]
    fn unknown_transport_mode_is_rejected_at_parse_time() {
        // Misconfiguration surfaces here, not as a silently empty listener set.
        let result =
            ServerConfig::try_parse_from(["taskdeck-server", "--transport", "carrier-pigeon"]);
        assert!(result.is_err());
    }
}
