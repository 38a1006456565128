//! Configuration for the bundled server adapter.
//!
//! The routing/dispatch core never reads configuration; only `App::run` and
//! `server::serve` use it. Loaded from an optional file plus
//! `CROSSBAR_`-prefixed environment variables, with defaults for everything.

use serde::Deserialize;
use std::net::SocketAddr;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (combined, common, or json)
    pub access_log_format: String,
    /// Access log file path (stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

impl Config {
    /// Load configuration, looking for "crossbar.toml" in the working
    /// directory.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("crossbar")
    }

    /// Load configuration from the given file path (without extension). The
    /// file is optional; defaults and `CROSSBAR_*` environment variables
    /// apply either way.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("CROSSBAR"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .build()?;

        settings.try_deserialize()
    }

    /// The socket address the adapter should bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: None,
            },
            logging: LoggingConfig {
                access_log: true,
                access_log_format: "combined".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_file() {
        let config = Config::load_from("/definitely/missing/crossbar").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert!(config.logging.access_log);
        assert_eq!(config.logging.access_log_format, "combined");
        assert!(config.logging.access_log_file.is_none());
    }

    #[test]
    fn socket_addr_parses() {
        let config = Config::default();
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.toml");
        std::fs::write(
            &path,
            "[server]\nhost = \"0.0.0.0\"\nport = 3000\nworkers = 2\n\n[logging]\naccess_log = false\naccess_log_format = \"json\"\n",
        )
        .unwrap();

        let stem = path.with_extension("");
        let config = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.workers, Some(2));
        assert!(!config.logging.access_log);
        assert_eq!(config.logging.access_log_format, "json");
    }
}
