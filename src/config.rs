//! Configuration module for chatline.

use serde::Deserialize;
use std::path::Path;

use crate::actions::RoomContext;
use crate::identifier::{is_room_alias, is_room_id, is_user_id};
use crate::mention::RoomMember;
use crate::search::{SearchOptions, DEFAULT_SEARCH_LIMIT};
use crate::{ChatlineError, Result};

/// Environment variable overriding `client.user_id`.
pub const USER_ID_ENV: &str = "CHATLINE_USER_ID";

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Identifier of the acting user.
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_user_id() -> String {
    "@user:localhost".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
        }
    }
}

/// Room the composer is attached to.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomConfig {
    /// Room identifier.
    #[serde(default = "default_room_id")]
    pub room_id: String,
    /// Canonical alias.
    #[serde(default)]
    pub canonical_alias: Option<String>,
    /// Static member list.
    #[serde(default)]
    pub members: Vec<RoomMember>,
}

fn default_room_id() -> String {
    "!room:localhost".to_string()
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            room_id: default_room_id(),
            canonical_alias: None,
            members: Vec::new(),
        }
    }
}

impl RoomConfig {
    /// Room context for this room.
    pub fn context(&self) -> RoomContext {
        RoomContext {
            room_id: self.room_id.clone(),
            canonical_alias: self.canonical_alias.clone(),
        }
    }
}

/// Mention autocomplete configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MentionConfig {
    /// Maximum number of suggestions.
    #[serde(default = "default_mention_limit")]
    pub limit: usize,
    /// Match anywhere in a name instead of only at the start.
    #[serde(default = "default_containment")]
    pub containment: bool,
    /// Case-sensitive matching.
    #[serde(default)]
    pub case_sensitive: bool,
    /// Ignore whitespace when matching.
    #[serde(default)]
    pub ignore_whitespace: bool,
}

fn default_mention_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_containment() -> bool {
    true
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            limit: default_mention_limit(),
            containment: default_containment(),
            case_sensitive: false,
            ignore_whitespace: false,
        }
    }
}

impl MentionConfig {
    /// Search options for mention sessions.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            limit: self.limit,
            containment: self.containment,
            case_sensitive: self.case_sensitive,
            ignore_whitespace: self.ignore_whitespace,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file, written in addition to stderr.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Client configuration.
    #[serde(default)]
    pub client: ClientConfig,
    /// Room configuration.
    #[serde(default)]
    pub room: RoomConfig,
    /// Mention configuration.
    #[serde(default)]
    pub mention: MentionConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ChatlineError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `CHATLINE_USER_ID`: Override the acting user
    pub fn apply_env_overrides(&mut self) {
        if let Ok(user_id) = std::env::var(USER_ID_ENV) {
            if !user_id.is_empty() {
                self.client.user_id = user_id;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !is_user_id(&self.client.user_id) {
            return Err(ChatlineError::Validation(format!(
                "client.user_id is not a user ID: {}",
                self.client.user_id
            )));
        }
        if !is_room_id(&self.room.room_id) {
            return Err(ChatlineError::Validation(format!(
                "room.room_id is not a room ID: {}",
                self.room.room_id
            )));
        }
        if let Some(alias) = &self.room.canonical_alias {
            if !is_room_alias(alias) {
                return Err(ChatlineError::Validation(format!(
                    "room.canonical_alias is not a room alias: {alias}"
                )));
            }
        }
        if self.mention.limit == 0 {
            return Err(ChatlineError::Validation(
                "mention.limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
