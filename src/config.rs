//! Settings
//!
//! Tunables for storage, the bookmarks bridge and import limits. Every field
//! has a default so a partial JSON document is enough.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Key of the `{items}` envelope in the key-value store
    pub storage_key: String,
    /// Upper bound for a single provider call before falling back
    pub remote_call_timeout_ms: u64,
    /// Upper bound for each `getToolbar` attempt while connecting
    pub connect_timeout_ms: u64,
    pub connect_attempts: u32,
    pub connect_retry_delay_ms: u64,
    /// Quiet period before a burst of change notifications triggers a re-fetch
    pub change_debounce_ms: u64,
    pub max_title_chars: usize,
    pub max_url_chars: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_key: "shortcuts.v1".to_string(),
            remote_call_timeout_ms: 5000,
            connect_timeout_ms: 4000,
            connect_attempts: 5,
            connect_retry_delay_ms: 600,
            change_debounce_ms: 120,
            max_title_chars: 100,
            max_url_chars: 2000,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json_str(raw: &str) -> DomainResult<Self> {
        serde_json::from_str(raw).map_err(|e| DomainError::InvalidInput(format!("settings: {}", e)))
    }

    pub fn remote_call_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_call_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_millis(self.connect_retry_delay_ms)
    }

    pub fn change_debounce(&self) -> Duration {
        Duration::from_millis(self.change_debounce_ms)
    }

    pub fn limits(&self) -> ImportLimits {
        ImportLimits {
            max_title_chars: self.max_title_chars,
            max_url_chars: self.max_url_chars,
        }
    }
}

/// Length bounds applied to titles and URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportLimits {
    pub max_title_chars: usize,
    pub max_url_chars: usize,
}

impl Default for ImportLimits {
    fn default() -> Self {
        Settings::default().limits()
    }
}
