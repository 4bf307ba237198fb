//! Engine configuration
//!
//! Defaults can be overridden through `PAGECRAFT_*` environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{info, warn};

use crate::LayoutError;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Quiet period before a changed draft is saved
    #[serde(default = "default_autosave_debounce_ms")]
    pub autosave_debounce_ms: u64,

    /// Whether committed changes are saved automatically
    #[serde(default = "default_autosave_enabled")]
    pub autosave_enabled: bool,

    /// Largest accepted command batch
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Largest tree that create and duplicate may produce
    #[serde(default = "default_max_slots")]
    pub max_slots: usize,

    /// Tracing filter directive
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_autosave_debounce_ms() -> u64 {
    750
}

fn default_autosave_enabled() -> bool {
    true
}

fn default_max_batch_size() -> usize {
    50
}

fn default_max_slots() -> usize {
    500
}

fn default_log_filter() -> String {
    "info,pagecraft=debug".to_string()
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self, LayoutError> {
        Self::load_from(|name| env::var(name).ok())
    }

    /// Load configuration using `lookup` to read variables
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LayoutError> {
        let mut config = Self::default();

        if let Some(debounce) = lookup("PAGECRAFT_AUTOSAVE_DEBOUNCE_MS") {
            if let Ok(ms) = debounce.parse::<u64>() {
                config.autosave_debounce_ms = ms;
            } else {
                warn!("Invalid PAGECRAFT_AUTOSAVE_DEBOUNCE_MS value: {}", debounce);
            }
        }

        if let Some(enabled) = lookup("PAGECRAFT_AUTOSAVE") {
            match enabled.to_lowercase().as_str() {
                "true" | "1" => config.autosave_enabled = true,
                "false" | "0" => config.autosave_enabled = false,
                _ => warn!("Invalid PAGECRAFT_AUTOSAVE value: {}", enabled),
            }
        }

        if let Some(batch) = lookup("PAGECRAFT_MAX_BATCH_SIZE") {
            if let Ok(size) = batch.parse::<usize>() {
                config.max_batch_size = size;
            } else {
                warn!("Invalid PAGECRAFT_MAX_BATCH_SIZE value: {}", batch);
            }
        }

        if let Some(slots) = lookup("PAGECRAFT_MAX_SLOTS") {
            if let Ok(max) = slots.parse::<usize>() {
                config.max_slots = max;
            } else {
                warn!("Invalid PAGECRAFT_MAX_SLOTS value: {}", slots);
            }
        }

        if let Some(filter) = lookup("PAGECRAFT_LOG_FILTER") {
            config.log_filter = filter;
        }

        config.validate()?;

        info!(
            debounce_ms = config.autosave_debounce_ms,
            autosave = config.autosave_enabled,
            max_batch_size = config.max_batch_size,
            max_slots = config.max_slots,
            "Loaded engine configuration"
        );
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.max_batch_size == 0 {
            return Err(LayoutError::Configuration(
                "max_batch_size must be at least 1".to_string(),
            ));
        }

        if self.max_slots == 0 {
            return Err(LayoutError::Configuration(
                "max_slots must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Debounce window as a duration
    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: default_autosave_debounce_ms(),
            autosave_enabled: default_autosave_enabled(),
            max_batch_size: default_max_batch_size(),
            max_slots: default_max_slots(),
            log_filter: default_log_filter(),
        }
    }
}
