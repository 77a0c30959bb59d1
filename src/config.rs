//! Configuration loading and validation.

use serde::Deserialize;
use std::path::Path;

/// Top-level server configuration, loaded from a TOML file.
///
/// Every field has a default so a missing file or an empty table is a
/// usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Name of the room created at startup.
    #[serde(default = "default_seed_room")]
    pub seed_room: String,
}

/// `[limits]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum accepted inbound line length in bytes. Longer lines are
    /// rejected with an error response, not a disconnect.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Outbound queue depth per session. Delivery to a session whose queue
    /// is full is dropped for that session only.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9000
}

fn default_seed_room() -> String {
    "general".to_string()
}

fn default_max_line_len() -> usize {
    512
}

fn default_outbound_queue() -> usize {
    64
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            seed_room: default_seed_room(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_len: default_max_line_len(),
            outbound_queue: default_outbound_queue(),
        }
    }
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// The `host:port` string to bind.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.server.seed_room.trim().is_empty() {
            anyhow::bail!("server.seed_room must not be blank");
        }
        if self.limits.max_line_len < 16 {
            anyhow::bail!("limits.max_line_len must be at least 16");
        }
        if self.limits.outbound_queue == 0 {
            anyhow::bail!("limits.outbound_queue must be at least 1");
        }
        Ok(())
    }
}
