//! Configuration management for the RAX file server
//!
//! Separates startup configuration (listen sockets, storage root) from the
//! admission limits that size the transfer and listing budgets.

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Candidate configuration files, tried in order. Both are optional.
pub const CONFIG_PATHS: [&str; 2] = [
    "rax-file-server/config", // Docker production: /app/rax-file-server/config.toml
    "config",                 // Local development: ./config.toml
];

/// Environment prefix, e.g. `RAX_FILES_LIMITS__MAX_TRANSFER_OPS=4`
pub const ENV_PREFIX: &str = "RAX_FILES";

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 50051;
const DEFAULT_WEB_PORT: u16 = 8081;
const DEFAULT_STORAGE_ROOT: &str = "uploads";
const DEFAULT_MAX_COMMAND_LENGTH: usize = 4096;
const DEFAULT_MAX_TRANSFER_OPS: usize = 10;
const DEFAULT_MAX_LIST_OPS: usize = 100;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_UPLOAD_SIZE_MB: u64 = 100;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub server: StartupConfig,
    pub limits: LimitsConfig,
}

/// Configuration that requires a restart to take effect
#[derive(Debug, Deserialize, Clone)]
pub struct StartupConfig {
    /// IP address both gateways bind to
    pub bind_address: String,

    /// Port of the line-framed RPC gateway
    pub rpc_port: u16,

    /// Whether the browser gateway is served at all
    pub web_enabled: bool,

    /// Port of the browser gateway
    pub web_port: u16,

    /// Flat directory holding every stored file
    pub storage_root: String,

    /// Maximum RPC command line length in bytes, including CRLF
    pub max_command_length: usize,
}

/// Admission budgets and transfer limits
#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    /// Concurrent upload + download operations (the transfer budget)
    pub max_transfer_ops: usize,

    /// Concurrent list operations (the listing budget)
    pub max_list_ops: usize,

    /// How long a gateway request waits for a slot before giving up
    pub acquire_timeout_secs: u64,

    /// Largest accepted upload
    pub max_upload_size_mb: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: StartupConfig {
                bind_address: DEFAULT_BIND_ADDRESS.to_string(),
                rpc_port: DEFAULT_RPC_PORT,
                web_enabled: true,
                web_port: DEFAULT_WEB_PORT,
                storage_root: DEFAULT_STORAGE_ROOT.to_string(),
                max_command_length: DEFAULT_MAX_COMMAND_LENGTH,
            },
            limits: LimitsConfig::default(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_transfer_ops: DEFAULT_MAX_TRANSFER_OPS,
            max_list_ops: DEFAULT_MAX_LIST_OPS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
            max_upload_size_mb: DEFAULT_MAX_UPLOAD_SIZE_MB,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&CONFIG_PATHS)
    }

    /// Load from the given config file stems (extension inferred), layered
    /// over the built-in defaults and under the environment.
    pub fn load_from(config_paths: &[&str]) -> Result<Self, ConfigError> {
        Self::load_with_env(config_paths, None)
    }

    /// Like [`ServerConfig::load_from`], reading overrides from `env` instead
    /// of the process environment when given.
    pub fn load_with_env(
        config_paths: &[&str],
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("server.rpc_port", DEFAULT_RPC_PORT as i64)?
            .set_default("server.web_enabled", true)?
            .set_default("server.web_port", DEFAULT_WEB_PORT as i64)?
            .set_default("server.storage_root", DEFAULT_STORAGE_ROOT)?
            .set_default(
                "server.max_command_length",
                DEFAULT_MAX_COMMAND_LENGTH as i64,
            )?
            .set_default("limits.max_transfer_ops", DEFAULT_MAX_TRANSFER_OPS as i64)?
            .set_default("limits.max_list_ops", DEFAULT_MAX_LIST_OPS as i64)?
            .set_default(
                "limits.acquire_timeout_secs",
                DEFAULT_ACQUIRE_TIMEOUT_SECS as i64,
            )?
            .set_default("limits.max_upload_size_mb", DEFAULT_MAX_UPLOAD_SIZE_MB as i64)?;

        for config_path in config_paths {
            builder = builder.add_source(File::with_name(config_path).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.rpc_port == 0 {
            return Err(ConfigError::Message("rpc_port cannot be 0".into()));
        }

        if self.server.web_enabled && self.server.web_port == 0 {
            return Err(ConfigError::Message("web_port cannot be 0".into()));
        }

        if self.server.web_enabled && self.server.web_port == self.server.rpc_port {
            return Err(ConfigError::Message(
                "web_port and rpc_port must differ".into(),
            ));
        }

        if self.server.storage_root.is_empty() {
            return Err(ConfigError::Message("storage_root cannot be empty".into()));
        }

        if self.server.max_command_length < 16 {
            return Err(ConfigError::Message(
                "max_command_length must be at least 16".into(),
            ));
        }

        if self.limits.max_transfer_ops == 0 {
            return Err(ConfigError::Message(
                "max_transfer_ops must be greater than 0".into(),
            ));
        }

        if self.limits.max_list_ops == 0 {
            return Err(ConfigError::Message(
                "max_list_ops must be greater than 0".into(),
            ));
        }

        if self.limits.max_upload_size_mb == 0 {
            return Err(ConfigError::Message(
                "max_upload_size_mb must be greater than 0".into(),
            ));
        }

        let fits_memory = self
            .limits
            .max_upload_size_mb
            .checked_mul(BYTES_PER_MB)
            .is_some_and(|bytes| usize::try_from(bytes).is_ok());
        if !fits_memory {
            return Err(ConfigError::Message(format!(
                "max_upload_size_mb {} is too large",
                self.limits.max_upload_size_mb
            )));
        }

        Ok(())
    }
}

impl StartupConfig {
    /// Bind address and RPC port as a socket address string
    pub fn rpc_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.rpc_port)
    }

    /// Bind address and web port as a socket address string
    pub fn web_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.web_port)
    }

    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }
}

impl LimitsConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get maximum upload size in bytes
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(BYTES_PER_MB)
    }
}
