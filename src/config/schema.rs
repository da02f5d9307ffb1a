//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default admin port.
pub const DEFAULT_ADMIN_PORT: u16 = 15280;

/// Root configuration for the admin server binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    /// Admin server settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Admin server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Host or IP to bind. Empty binds every interface.
    pub bind_addr: String,

    /// TCP port. `0` asks the OS for an ephemeral port.
    pub port: u16,

    /// When set, no admin server is constructed at all.
    pub disabled: bool,

    /// Bearer token required by the built-in status service.
    pub api_key: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            bind_addr: String::new(),
            port: DEFAULT_ADMIN_PORT,
            disabled: false,
            api_key: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
