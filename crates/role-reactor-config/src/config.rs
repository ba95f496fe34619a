// crates/role-reactor-config/src/config.rs
// ============================================================================
// Module: Role Reactor Configuration
// Description: Configuration loading and validation for the reactor service.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed: the service refuses to
//! start rather than running with partial settings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "role-reactor.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "ROLE_REACTOR_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum queue poll wait in seconds.
pub(crate) const MIN_POLL_WAIT_SECS: u64 = 1;
/// Maximum queue poll wait in seconds (long-poll ceiling).
pub(crate) const MAX_POLL_WAIT_SECS: u64 = 20;
/// Maximum opt-out period in days.
pub(crate) const MAX_OPT_OUT_PERIOD_DAYS: u32 = 3_650;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Role Reactor service configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ReactorConfig {
    /// Reactor loop and command handling configuration.
    #[serde(default)]
    pub reactor: ReactorSection,
    /// Role store configuration.
    #[serde(default)]
    pub store: StoreSection,
    /// Command queue configuration.
    #[serde(default)]
    pub queue: QueueSection,
    /// Notification delivery configuration.
    #[serde(default)]
    pub notify: NotifySection,
}

impl ReactorConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is taken from the argument, then the `ROLE_REACTOR_CONFIG`
    /// environment variable, then `role-reactor.toml` in the working
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reactor.validate()?;
        self.store.validate()?;
        self.queue.validate()?;
        self.notify.validate()?;
        Ok(())
    }
}

/// Reactor loop and command handling configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReactorSection {
    /// Opt-out duration in days granted by the opt-out command.
    #[serde(default = "default_opt_out_period_days")]
    pub opt_out_period_days: u32,
    /// Queue long-poll wait in seconds.
    #[serde(default = "default_poll_wait_secs")]
    pub poll_wait_secs: u64,
}

impl Default for ReactorSection {
    fn default() -> Self {
        Self {
            opt_out_period_days: default_opt_out_period_days(),
            poll_wait_secs: default_poll_wait_secs(),
        }
    }
}

impl ReactorSection {
    /// Validates reactor loop settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.opt_out_period_days == 0 {
            return Err(ConfigError::Invalid(
                "reactor.opt_out_period_days must be greater than zero".to_string(),
            ));
        }
        if self.opt_out_period_days > MAX_OPT_OUT_PERIOD_DAYS {
            return Err(ConfigError::Invalid("reactor.opt_out_period_days too large".to_string()));
        }
        if self.poll_wait_secs < MIN_POLL_WAIT_SECS || self.poll_wait_secs > MAX_POLL_WAIT_SECS {
            return Err(ConfigError::Invalid(format!(
                "reactor.poll_wait_secs must be between {MIN_POLL_WAIT_SECS} and \
                 {MAX_POLL_WAIT_SECS}",
            )));
        }
        Ok(())
    }
}

/// Role store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    /// `SQLite` database path for the role store.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl StoreSection {
    /// Validates role store settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_field("store.path", &self.path)
    }
}

/// Command queue configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueSection {
    /// Directory holding spooled command messages.
    #[serde(default = "default_spool_dir")]
    pub spool_dir: PathBuf,
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            spool_dir: default_spool_dir(),
        }
    }
}

impl QueueSection {
    /// Validates command queue settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_field("queue.spool_dir", &self.spool_dir)
    }
}

/// Notification delivery configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct NotifySection {
    /// Webhook endpoint for reply notifications. Replies go to the log when
    /// unset.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Allow non-TLS webhook endpoints (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
}

impl NotifySection {
    /// Validates notification settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.webhook_url {
            let trimmed = url.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Invalid(
                    "notify.webhook_url must be non-empty".to_string(),
                ));
            }
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(ConfigError::Invalid(
                    "notify.webhook_url must include http:// or https://".to_string(),
                ));
            }
            if trimmed.starts_with("http://") && !self.allow_http {
                return Err(ConfigError::Invalid(
                    "notify.webhook_url uses http:// without allow_http".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path field against length constraints.
fn validate_path_field(field: &str, value: &Path) -> Result<(), ConfigError> {
    let text = value.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in value.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default opt-out duration in days.
pub(crate) const fn default_opt_out_period_days() -> u32 {
    90
}

/// Default queue long-poll wait in seconds.
pub(crate) const fn default_poll_wait_secs() -> u64 {
    20
}

/// Default role store database path.
pub(crate) fn default_store_path() -> PathBuf {
    PathBuf::from("role-reactor.db")
}

/// Default spool directory for queued commands.
pub(crate) fn default_spool_dir() -> PathBuf {
    PathBuf::from("spool")
}

/// Returns a complete example configuration in TOML form.
#[must_use]
pub const fn config_toml_example() -> &'static str {
    r#"# Role Reactor configuration.

[reactor]
# Days a role stays opted out after an opt_out command.
opt_out_period_days = 90
# Queue long-poll wait in seconds (1-20).
poll_wait_secs = 20

[store]
# SQLite database holding role state.
path = "role-reactor.db"

[queue]
# Directory holding spooled command messages.
spool_dir = "spool"

[notify]
# Webhook endpoint for reply notifications. Replies go to the log when unset.
webhook_url = "https://hooks.example.com/role-reactor"
"#
}
