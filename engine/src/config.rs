//! Engine configuration.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Extract(#[from] figment::Error),
}

/// Tunables for the controller and its application source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// How long `wait_until_settled` blocks on an asynchronous state
    /// change, in milliseconds.
    #[serde(default = "default_state_change_timeout_ms")]
    pub state_change_timeout_ms: u64,
    #[serde(default)]
    pub source: SourceSettings,
}

/// Application-source queue behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Internal queue limit in bytes. 0 means unlimited.
    #[serde(default = "default_max_queue_bytes")]
    pub max_queue_bytes: u64,
    /// Block the pushing thread when the queue is full instead of dropping
    /// the buffer. Keeps the feed protocol at one in-flight push.
    #[serde(default = "default_block_on_full")]
    pub block_on_full: bool,
    /// Present the source as a live source.
    #[serde(default)]
    pub is_live: bool,
}

fn default_state_change_timeout_ms() -> u64 {
    500
}

fn default_max_queue_bytes() -> u64 {
    0
}

fn default_block_on_full() -> bool {
    true
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            state_change_timeout_ms: default_state_change_timeout_ms(),
            source: SourceSettings::default(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            max_queue_bytes: default_max_queue_bytes(),
            block_on_full: default_block_on_full(),
            is_live: false,
        }
    }
}

impl EngineSettings {
    /// Load settings with the priority chain
    /// defaults < `.inflow.toml` in the working directory < `INFLOW_*`
    /// environment variables.
    ///
    /// Nested keys use a double underscore in the environment, e.g.
    /// `INFLOW_SOURCE__MAX_QUEUE_BYTES=8388608`.
    pub fn load() -> Result<Self, SettingsError> {
        let mut figment = Figment::from(Serialized::defaults(EngineSettings::default()));

        if let Ok(dir) = std::env::current_dir() {
            let local = dir.join(".inflow.toml");
            if local.exists() {
                figment = figment.merge(Toml::file(local));
            }
        }

        let settings = figment
            .merge(Env::prefixed("INFLOW_").split("__"))
            .extract()?;
        Ok(settings)
    }

    /// Load settings from a specific TOML file merged over the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let settings = Figment::from(Serialized::defaults(EngineSettings::default()))
            .merge(Toml::file(path.as_ref()))
            .extract()?;
        Ok(settings)
    }
}
