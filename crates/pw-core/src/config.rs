//! Configuration types and loading

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// Durable store configuration
    pub storage: StorageConfig,

    /// Avatar upload constraints
    pub avatar: AvatarConfig,

    /// Account step rules
    pub account: AccountRules,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root directory of the file backend
    pub root: PathBuf,
    /// Namespace holding one entry per wizard section
    pub drafts_namespace: String,
    /// Namespace holding finalized user records keyed by id
    pub users_namespace: String,
    /// Namespace holding the selected-user slot
    pub session_namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            root: PathBuf::from(".profile-wizard"),
            drafts_namespace: "drafts".to_string(),
            users_namespace: "users".to_string(),
            session_namespace: "session".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AvatarConfig {
    pub max_size_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 1024 * 1024,
            allowed_content_types: vec![
                "image/jpg".to_string(),
                "image/jpeg".to_string(),
                "image/png".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountRules {
    pub name_max_length: usize,
    pub password_min_length: usize,
    pub password_max_length: usize,
}

impl Default for AccountRules {
    fn default() -> Self {
        Self {
            name_max_length: 50,
            password_min_length: 4,
            password_max_length: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,pw_services=debug,pw_store=debug".to_string(),
            json: false,
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl AppConfig {
    /// Load configuration from `PW_*` environment variables on top of the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Storage
        if let Some(backend) = lookup("PW_STORAGE_BACKEND") {
            config.storage.backend = match backend.as_str() {
                "file" => StorageBackend::File,
                "memory" => StorageBackend::Memory,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "PW_STORAGE_BACKEND".to_string(),
                        message: format!("unknown backend '{}'", other),
                    })
                }
            };
        }
        if let Some(root) = lookup("PW_STORAGE_ROOT") {
            config.storage.root = PathBuf::from(root);
        }

        // Avatar
        if let Some(size) = lookup("PW_AVATAR_MAX_BYTES") {
            config.avatar.max_size_bytes = parse_number("PW_AVATAR_MAX_BYTES", &size)?;
        }
        if let Some(types) = lookup("PW_AVATAR_CONTENT_TYPES") {
            config.avatar.allowed_content_types = types
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
        }

        // Account
        if let Some(len) = lookup("PW_NAME_MAX_LENGTH") {
            config.account.name_max_length = parse_number("PW_NAME_MAX_LENGTH", &len)?;
        }
        if let Some(len) = lookup("PW_PASSWORD_MIN_LENGTH") {
            config.account.password_min_length = parse_number("PW_PASSWORD_MIN_LENGTH", &len)?;
        }

        // Logging
        if let Some(filter) = lookup("PW_LOG_FILTER") {
            config.logging.filter = filter;
        }
        if let Some(format) = lookup("PW_LOG_FORMAT") {
            config.logging.json = format.eq_ignore_ascii_case("json");
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{}' is not a number", value),
    })
}
