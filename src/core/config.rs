//! Configuration management for hxdash
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `HXDASH_*` environment variables. Command line overrides are applied by the
//! binary on top of the result.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "hxdash.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Session cookie configuration
    pub session: SessionConfig,

    /// User directory configuration
    pub directory: DirectoryConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub http_addr: SocketAddr,

    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie
    pub cookie_name: String,

    /// Signing secret. Empty means a random key per process.
    pub secret: String,

    /// Token lifetime in seconds
    pub ttl_secs: u64,

    /// Mark the cookie `Secure`
    pub secure: bool,
}

/// User directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Start with the demo users
    pub seed: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session".to_string(),
            secret: String::new(),
            ttl_secs: 24 * 60 * 60,
            secure: false,
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self { seed: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default file (if present) and environment
    pub fn load() -> Result<Self> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        let path = default_path.exists().then_some(default_path);
        Self::load_from(path)
    }

    /// Load configuration from an explicit file (if any) and environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        toml::from_str(&contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(addr) = var("HXDASH_HTTP_ADDR") {
            self.server.http_addr = addr
                .parse()
                .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
        }

        if let Some(dir) = var("HXDASH_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(dir);
        }

        if let Some(secret) = var("HXDASH_SESSION_SECRET") {
            self.session.secret = secret;
        }

        if let Some(ttl) = var("HXDASH_SESSION_TTL") {
            self.session.ttl_secs = ttl
                .parse()
                .map_err(|e| Error::config(format!("Invalid session TTL: {}", e)))?;
        }

        if let Some(level) = var("HXDASH_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = var("HXDASH_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(Error::config(format!("Invalid log level: {}", other))),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => return Err(Error::config(format!("Invalid log format: {}", other))),
        }

        if self.session.ttl_secs == 0 {
            return Err(Error::config("Session TTL must be greater than zero"));
        }

        if self.session.cookie_name.is_empty()
            || !self
                .session
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::config("Session cookie name must be a non-empty token"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.http_addr.port(), 3000);
        assert_eq!(config.session.cookie_name, "session");
        assert!(config.directory.seed);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nhttp_addr = \"127.0.0.1:8088\"\n\n[directory]\nseed = false"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.http_addr.port(), 8088);
        assert!(!config.directory.seed);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.session.ttl_secs, 86_400);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = Config::from_file("/definitely/not/here/hxdash.toml");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("HXDASH_HTTP_ADDR", "127.0.0.1:9000"),
            ("HXDASH_SESSION_TTL", "60"),
            ("HXDASH_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.http_addr.port(), 9000);
        assert_eq!(config.session.ttl_secs, 60);
        assert_eq!(config.logging.format, "json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_override_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(|k| {
            (k == "HXDASH_SESSION_TTL").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.session.ttl_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.session.cookie_name = "my session".to_string();
        assert!(config.validate().is_err());
    }
}
