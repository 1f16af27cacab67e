use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PhysicalResult;

/// Feature flags accepted when a physical design session is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConfig {
    /// Keep a per-pin record (displacement, bounds, layer) for cell pins.
    pub enable_physical_pins: bool,
    /// Merge multi-rectangle obstacle and pin shapes on library ingestion.
    pub enable_merge_rectangles: bool,
    /// Record which pin achieves each net bounding-box extreme.
    pub enable_net_pin_boundaries: bool,
}

impl PhysicalConfig {
    pub fn from_json(json: &str) -> PhysicalResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    /// Read the known flags from a JSON object.
    ///
    /// Unknown keys and non-boolean values are reported and ignored; the
    /// affected flag keeps its default.
    pub fn from_value(params: &Value) -> Self {
        let mut config = Self::default();
        let Some(object) = params.as_object() else {
            if !params.is_null() {
                log::warn!("Physical design parameters must be an object. Using defaults.");
            }
            return config;
        };
        for (key, value) in object {
            let flag = match key.as_str() {
                "enable_physical_pins" => &mut config.enable_physical_pins,
                "enable_merge_rectangles" => &mut config.enable_merge_rectangles,
                "enable_net_pin_boundaries" => &mut config.enable_net_pin_boundaries,
                _ => {
                    log::warn!("Unsupported physical design parameter '{}'. Skipping ...", key);
                    continue;
                }
            };
            match value.as_bool() {
                Some(enabled) => *flag = enabled,
                None => log::warn!(
                    "Parameter '{}' expects a boolean, got {}. Skipping ...",
                    key,
                    value
                ),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_off() {
        let config = PhysicalConfig::default();
        assert!(!config.enable_physical_pins);
        assert!(!config.enable_merge_rectangles);
        assert!(!config.enable_net_pin_boundaries);
    }

    #[test]
    fn test_known_flags_read() {
        let config = PhysicalConfig::from_json(
            r#"{"enable_merge_rectangles": true, "enable_net_pin_boundaries": true}"#,
        )
        .unwrap();
        assert!(config.enable_merge_rectangles);
        assert!(config.enable_net_pin_boundaries);
        assert!(!config.enable_physical_pins);
    }

    #[test]
    fn test_unknown_and_mistyped_keys_skipped() {
        let config = PhysicalConfig::from_json(
            r#"{"enable_overlay": true, "enable_physical_pins": "yes", "enable_merge_rectangles": true}"#,
        )
        .unwrap();
        assert!(!config.enable_physical_pins);
        assert!(config.enable_merge_rectangles);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(PhysicalConfig::from_json("{not json").is_err());
        assert_eq!(PhysicalConfig::from_value(&Value::Null), PhysicalConfig::default());
    }
}
