//! CLI command implementations
//!
//! Startup sequence for `start`:
//! 1. Configuration load and validation
//! 2. Entity descriptor verification
//! 3. Service construction (store, validator, bus, forum)
//! 4. HTTP/WebSocket activation

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::forum::Forum;
use crate::http_server::config::{default_host, default_port};
use crate::http_server::{AppState, HttpServer, HttpServerConfig};
use crate::model::verify_catalog;
use crate::mutation::MutationExecutor;
use crate::observability::{log_event_with_fields, LogEvent, Logger, Severity};
use crate::realtime::EventBus;
use crate::schema::Validator;
use crate::storage::MemoryStore;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Host to bind (default "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind (default 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Items per page in list actions (default 20)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Per-connection event queue capacity (default 256)
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,

    /// Allowed CORS origins; empty allows any
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Lowest log severity written (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_page_size() -> usize {
    20
}
fn default_subscriber_buffer() -> usize {
    256
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            page_size: default_page_size(),
            subscriber_buffer: default_subscriber_buffer(),
            cors_origins: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        log_event_with_fields(
            LogEvent::ConfigLoaded,
            &[("path", &path.display().to_string()), ("port", &config.port.to_string())],
        );
        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.host.trim().is_empty() {
            return Err(CliError::config_error("host must not be empty"));
        }

        if self.page_size == 0 {
            return Err(CliError::config_error("page_size must be > 0"));
        }

        if self.subscriber_buffer == 0 {
            return Err(CliError::config_error("subscriber_buffer must be > 0"));
        }

        self.severity()?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::config_error(format!("Invalid log_level: {}", e)))
    }

    pub fn http_config(&self) -> HttpServerConfig {
        HttpServerConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self.cors_origins.clone(),
        }
    }
}

/// Main entry point for CLI
///
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Start { config } => start(&config),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Wire the services together: one store, one validator, one bus
pub fn build_state(config: &Config) -> Arc<AppState> {
    let bus = Arc::new(EventBus::new(config.subscriber_buffer));
    let executor = MutationExecutor::new(
        Arc::new(MemoryStore::new()),
        Arc::new(Validator::new()),
        Arc::clone(&bus),
    );
    Arc::new(AppState::new(Forum::new(executor, config.page_size), bus))
}

/// Load config, verify descriptors, and serve until the process stops
pub fn start(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);

    verify_catalog().map_err(|e| CliError::schema_error(e.to_string()))?;

    let server = HttpServer::new(config.http_config(), build_state(&config));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Validate config and descriptors, report on stdout, and exit
pub fn check_config(config_path: &Path) -> CliResult<()> {
    match config_report(config_path) {
        Ok(report) => write_response(report),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

fn config_report(config_path: &Path) -> CliResult<Value> {
    let config = Config::load(config_path)?;
    let entities = verify_catalog().map_err(|e| CliError::schema_error(e.to_string()))?;

    Ok(json!({
        "addr": config.http_config().socket_addr(),
        "page_size": config.page_size,
        "subscriber_buffer": config.subscriber_buffer,
        "entities": entities,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_fill_missing_keys() {
        let file = config_file("{}");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.http_config().socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_explicit_values() {
        let file = config_file(r#"{"port": 9100, "page_size": 5, "cors_origins": ["http://localhost:3000"]}"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.page_size, 5);
        assert_eq!(config.http_config().cors_origins.len(), 1);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let file = config_file(r#"{"page_size": 0}"#);
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.message().contains("page_size"));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let file = config_file(r#"{"log_level": "chatty"}"#);
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let file = config_file("{port: ");
        let err = Config::load(file.path()).unwrap_err();
        assert_eq!(err.code_str(), "AGORA_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::load(Path::new("/nonexistent/agora.json")).unwrap_err();
        assert!(err.message().contains("Failed to read config"));
    }

    #[test]
    fn test_check_config_succeeds() {
        let file = config_file(r#"{"port": 9200}"#);
        assert!(check_config(file.path()).is_ok());
    }

    #[test]
    fn test_check_config_reports_invalid_config() {
        let file = config_file(r#"{"page_size": 0}"#);
        let err = check_config(file.path()).unwrap_err();
        assert_eq!(err.code_str(), "AGORA_CLI_CONFIG_ERROR");
        assert_eq!(err.message(), "page_size must be > 0");
    }

    #[test]
    fn test_build_state_uses_buffer() {
        let config = Config {
            subscriber_buffer: 1,
            ..Config::default()
        };
        let state = build_state(&config);
        assert_eq!(state.bus.subscriber_count(), 0);
        assert_eq!(state.forum.page_size(), 20);
    }
}
