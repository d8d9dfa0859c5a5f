//! txnsrv configuration
//!
//! YAML file merged with `TXNSRV_`-prefixed environment variables,
//! environment winning. Every field has a default so the service starts
//! against a local Redis with no file at all.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TxnSrvError};

/// Service identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Source tag written into every composed envelope
    #[serde(default = "default_source")]
    pub source: String,
    /// Log directory; unset disables the file appender
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            source: default_source(),
            log_dir: None,
        }
    }
}

/// Redis connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix for every asset, transaction, and catalog key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
        }
    }
}

/// Pub/sub channel names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelsConfig {
    /// Change-event feed the dispatcher consumes
    #[serde(default = "default_events_channel")]
    pub events: String,
    /// Microservices forward channel
    #[serde(default = "default_microservices_channel")]
    pub microservices: String,
    /// Transaction listener notification channel
    #[serde(default = "default_listener_channel")]
    pub listener: String,
    /// Field comms wrapper channel
    #[serde(default = "default_comms_channel")]
    pub comms: String,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            events: default_events_channel(),
            microservices: default_microservices_channel(),
            listener: default_listener_channel(),
            comms: default_comms_channel(),
        }
    }
}

/// Store pipeline retry settings
///
/// Negative values are treated as 0 (no retry).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub retry_count: i64,
    #[serde(default)]
    pub retry_delay_ms: i64,
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Load the configuration file with environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        common::load_config(path, "TXNSRV")
            .map_err(|err| TxnSrvError::config(err.to_string()))
    }
}

fn default_service_name() -> String {
    "txnsrv".to_string()
}

fn default_source() -> String {
    "txnsrv".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "txnsrv:".to_string()
}

fn default_events_channel() -> String {
    "wellflow:transactions:events".to_string()
}

fn default_microservices_channel() -> String {
    "wellflow:transactions:microservices".to_string()
}

fn default_listener_channel() -> String {
    "wellflow:transactions:listener".to_string()
}

fn default_comms_channel() -> String {
    "wellflow:comms:commands".to_string()
}

// ============================================================================
// Tests
// ============================================================================
