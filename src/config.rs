//! Configuration module for Vapormail.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, VapormailError};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins for the API (empty = same-origin only).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Mailbox lifecycle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailboxConfig {
    /// Domain pool for issued addresses.
    #[serde(default = "default_domains")]
    pub domains: Vec<String>,
    /// Length of the random local part of issued addresses.
    #[serde(default = "default_token_length")]
    pub token_length: usize,
    /// Seconds the "expired" notice is shown before the session resets to idle.
    #[serde(default = "default_grace_secs")]
    pub grace_secs: u64,
    /// Maximum number of messages held per mailbox.
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

fn default_domains() -> Vec<String> {
    vec![
        "tempmail.com".to_string(),
        "10minutemail.net".to_string(),
        "disposable.email".to_string(),
    ]
}

fn default_token_length() -> usize {
    16
}

fn default_grace_secs() -> u64 {
    3
}

fn default_max_messages() -> usize {
    50
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            domains: default_domains(),
            token_length: default_token_length(),
            grace_secs: default_grace_secs(),
            max_messages: default_max_messages(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/vapormail.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Mailbox lifecycle settings.
    #[serde(default)]
    pub mailbox: MailboxConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(VapormailError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| VapormailError::Config(format!("parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The domain pool is empty
    /// - The address token is too short to provide a usable identifier space
    pub fn validate(&self) -> Result<()> {
        if self.mailbox.domains.is_empty() {
            return Err(VapormailError::Config(
                "mailbox.domains must contain at least one domain".to_string(),
            ));
        }
        if self.mailbox.token_length < 16 {
            return Err(VapormailError::Config(
                "mailbox.token_length must be at least 16 characters".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.mailbox.domains.len(), 3);
        assert_eq!(config.mailbox.token_length, 16);
        assert_eq!(config.mailbox.grace_secs, 3);
        assert_eq!(config.mailbox.max_messages, 50);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse(
            r#"
            [server]
            port = 9090

            [mailbox]
            grace_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.mailbox.grace_secs, 5);
        assert_eq!(config.mailbox.token_length, 16);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = Config::parse("not [valid toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_empty_domains() {
        let result = Config::parse(
            r#"
            [mailbox]
            domains = []
            "#,
        );
        assert!(matches!(result, Err(VapormailError::Config(_))));
    }

    #[test]
    fn test_validate_short_token() {
        let result = Config::parse(
            r#"
            [mailbox]
            token_length = 8
            "#,
        );
        assert!(matches!(result, Err(VapormailError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 3000").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("no/such/config.toml");
        assert!(matches!(result, Err(VapormailError::Io(_))));
    }
}
