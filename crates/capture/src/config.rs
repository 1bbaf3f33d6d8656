//! Bridge configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long an emission waits for the host when only an event-wide listener
/// is registered.
pub const DEFAULT_CALLBACK_TIMEOUT_MS: u64 = 2_000;

/// How long an emission waits for a mode-specific (persistent) listener.
pub const ASYNC_CALLBACK_TIMEOUT_MS: u64 = 600_000; // 10 minutes

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    pub default_callback_timeout_ms: u64,
    pub async_callback_timeout_ms: u64,
    /// Value a held native callback resolves to when the host does not answer
    /// in time, or when the mode is reset or disposed.
    pub resolve_on_timeout: bool,
    /// Write captured images here instead of inlining them in events.
    pub image_cache_dir: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_callback_timeout_ms: DEFAULT_CALLBACK_TIMEOUT_MS,
            async_callback_timeout_ms: ASYNC_CALLBACK_TIMEOUT_MS,
            resolve_on_timeout: true,
            image_cache_dir: None,
        }
    }
}

impl BridgeConfig {
    pub fn timeouts(&self) -> CallbackTimeouts {
        CallbackTimeouts {
            default: Duration::from_millis(self.default_callback_timeout_ms),
            with_async_listener: Duration::from_millis(self.async_callback_timeout_ms),
            resolution: self.resolve_on_timeout,
        }
    }
}

/// Timeout policy handed to each mode's listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackTimeouts {
    pub default: Duration,
    pub with_async_listener: Duration,
    pub resolution: bool,
}

impl Default for CallbackTimeouts {
    fn default() -> Self {
        BridgeConfig::default().timeouts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let timeouts = BridgeConfig::default().timeouts();
        assert_eq!(timeouts.default, Duration::from_secs(2));
        assert_eq!(timeouts.with_async_listener, Duration::from_secs(600));
        assert!(timeouts.resolution);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"defaultCallbackTimeoutMs": 50, "imageCacheDir": "/tmp/ids"}"#)
                .unwrap();

        assert_eq!(config.default_callback_timeout_ms, 50);
        assert_eq!(config.async_callback_timeout_ms, ASYNC_CALLBACK_TIMEOUT_MS);
        assert_eq!(config.image_cache_dir, Some(PathBuf::from("/tmp/ids")));
    }
}
