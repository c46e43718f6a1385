//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML config
//! file; every section falls back to its defaults when omitted.

use serde::{Deserialize, Serialize};

/// Root configuration for the API server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Diagnostic mode: log error internals that are never sent to clients.
    pub debug: bool,

    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Security hardening settings.
    pub security: SecurityConfig,

    /// Static file serving.
    pub static_files: StaticFilesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8090").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8090".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Grace period for in-flight requests on shutdown, in seconds.
    pub shutdown_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_secs: 10,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable baseline security headers.
    pub enable_headers: bool,
    /// Optional `Content-Security-Policy` value.
    pub content_security_policy: Option<String>,
    /// Optional `Referrer-Policy` value.
    pub referrer_policy: Option<String>,
    /// Maximum body size in bytes accepted by extractors.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            content_security_policy: None,
            referrer_policy: None,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Static file serving configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory served at `/`. Disabled when unset.
    pub public_dir: Option<String>,

    /// Serve `index.html` for missing files (client-side routed apps).
    pub index_fallback: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str("debug = true").unwrap();
        assert!(config.debug);
        assert_eq!(config.listener.bind_address, "127.0.0.1:8090");
        assert!(config.security.enable_headers);
        assert!(config.static_files.public_dir.is_none());
    }

    #[test]
    fn test_sections_override_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "0.0.0.0:80"

            [static_files]
            public_dir = "pb_public"
            index_fallback = true

            [security]
            referrer_policy = "same-origin"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:80");
        assert_eq!(config.static_files.public_dir.as_deref(), Some("pb_public"));
        assert!(config.static_files.index_fallback);
        assert_eq!(config.security.referrer_policy.as_deref(), Some("same-origin"));
        assert_eq!(config.security.max_body_size, 2 * 1024 * 1024);
    }
}
