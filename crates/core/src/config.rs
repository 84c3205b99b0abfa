use std::time::Duration;

use icicle_protocol::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::Easing;
use crate::focus::Locator;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunables for [`PartitionView`](crate::partition_view::PartitionView).
///
/// Every field has a default, so a config file only lists what it changes:
///
/// ```json
/// { "transition_ms": 250, "focus": { "margin": 0.1 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Length of the zoom animation between two focused nodes.
    pub transition_ms: u64,
    pub easing: Easing,
    pub focus: Locator,
    pub background: Color,
    pub outline: Color,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            transition_ms: 500,
            easing: Easing::InOutCubic,
            focus: Locator::default(),
            background: Color::WHITE,
            outline: Color::BLACK,
        }
    }
}

impl ViewConfig {
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = ViewConfig::from_json(b"{}").unwrap();
        assert_eq!(config, ViewConfig::default());
        assert_eq!(config.transition(), Duration::from_millis(500));
    }

    #[test]
    fn partial_override() {
        let config =
            ViewConfig::from_json(br#"{ "transition_ms": 250, "focus": { "margin": 0.1 } }"#)
                .unwrap();
        assert_eq!(config.transition_ms, 250);
        assert_eq!(config.focus.margin, 0.1);
        assert_eq!(config.focus.column_lead, 0.2);
        assert_eq!(config.outline, Color::BLACK);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(ViewConfig::from_json(b"{ transition_ms: }").is_err());
    }
}
