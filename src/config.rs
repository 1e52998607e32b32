//! Environment-driven startup configuration (§10 of the design spec),
//! mirroring the teacher's `AppConfig` (`api/handlers.rs`): a plain
//! struct with a `Default` impl, loaded once at startup.

use std::env;

/// Runtime configuration for the host registry service.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Address the HTTP server binds to. The original probed the host's
    /// primary non-loopback IPv4 interface and always used port 12345;
    /// this implementation takes the bind address from configuration
    /// instead, since interface probing has no well-defined behavior in
    /// a container/CI environment (§6, DESIGN.md Open Questions).
    pub bind_addr: String,

    /// Binary used to drive the container runtime (default `docker`).
    pub runtime_binary: String,

    /// Remote daemon endpoint passed to the runtime binary via `-H`.
    pub runtime_host: String,

    /// Log filter string, passed to `tracing_subscriber::EnvFilter`.
    pub log_level: String,
}

impl RegistryConfig {
    /// Load configuration from the environment, falling back to the
    /// same defaults the original hardcoded.
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("HOSTREG_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:12345".to_string()),
            runtime_binary: env::var("HOSTREG_RUNTIME_BIN").unwrap_or_else(|_| "docker".to_string()),
            runtime_host: env::var("HOSTREG_RUNTIME_HOST")
                .unwrap_or_else(|_| "tcp://10.5.60.2:2377".to_string()),
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:12345".to_string(),
            runtime_binary: "docker".to_string(),
            runtime_host: "tcp://10.5.60.2:2377".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original_hardcoded_values() {
        let config = RegistryConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:12345");
        assert_eq!(config.runtime_binary, "docker");
    }
}
