//! Analytics store configuration.

use serde::{Deserialize, Serialize};

/// Top-level store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store provider: `"clickhouse"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Create the event table on startup if it does not exist.
    #[serde(default = "default_true")]
    pub ensure_schema: bool,
    /// ClickHouse connection settings.
    #[serde(default)]
    pub clickhouse: ClickHouseConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            ensure_schema: default_true(),
            clickhouse: ClickHouseConfig::default(),
        }
    }
}

/// ClickHouse connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickHouseConfig {
    /// Server hostname.
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// HTTP(S) interface port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Use HTTPS instead of HTTP.
    #[serde(default)]
    pub secure: bool,
    /// Database name.
    #[serde(default = "default_database")]
    pub database: String,
    /// Username.
    #[serde(default = "default_username")]
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
    /// Destination table for events.
    #[serde(default = "default_table")]
    pub table: String,
    /// Server-side `max_execution_time` setting in seconds.
    #[serde(default = "default_max_execution_time")]
    pub max_execution_time_seconds: u64,
    /// Compress request bodies with LZ4.
    #[serde(default = "default_true")]
    pub compression: bool,
}

impl ClickHouseConfig {
    /// Base URL of the ClickHouse HTTP interface.
    pub fn url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.hostname, self.port)
    }
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            port: default_port(),
            secure: false,
            database: default_database(),
            username: default_username(),
            password: String::new(),
            table: default_table(),
            max_execution_time_seconds: default_max_execution_time(),
            compression: default_true(),
        }
    }
}

fn default_provider() -> String {
    "clickhouse".to_string()
}

fn default_true() -> bool {
    true
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8123
}

fn default_database() -> String {
    "default".to_string()
}

fn default_username() -> String {
    "default".to_string()
}

fn default_table() -> String {
    "event_log".to_string()
}

fn default_max_execution_time() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_respects_secure_flag() {
        let mut config = ClickHouseConfig::default();
        assert_eq!(config.url(), "http://localhost:8123");
        config.secure = true;
        config.port = 8443;
        assert_eq!(config.url(), "https://localhost:8443");
    }
}
