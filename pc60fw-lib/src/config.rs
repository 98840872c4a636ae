use crate::constants::{DEFAULT_BATTERY_PERCENT, DEFAULT_MAX_LENGTH};
use crate::error::DecoderError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Decoder tuning. Every field has a default so partial JSON files work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Largest Length byte accepted before the candidate is treated as corrupt
    pub max_length: u8,
    /// Battery percent reported on vital data until a battery frame arrives
    pub initial_battery: u8,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            initial_battery: DEFAULT_BATTERY_PERCENT,
        }
    }
}

impl DecoderConfig {
    pub fn from_json_str(json: &str) -> Result<Self, DecoderError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DecoderError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), DecoderError> {
        if self.max_length == 0 {
            return Err(DecoderError::InvalidConfig(
                "max_length must be at least 1 (the type byte)".to_string(),
            ));
        }
        if self.initial_battery > 100 {
            return Err(DecoderError::InvalidConfig(format!(
                "initial_battery {} is not a percentage",
                self.initial_battery
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.max_length, u8::MAX);
        assert_eq!(config.initial_battery, 100);
    }

    #[test]
    fn test_partial_json() {
        let config = DecoderConfig::from_json_str(r#"{"max_length": 64}"#).unwrap();
        assert_eq!(config.max_length, 64);
        assert_eq!(config.initial_battery, 100);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            DecoderConfig::from_json_str(r#"{"max_length": 0}"#),
            Err(DecoderError::InvalidConfig(_))
        ));
        assert!(matches!(
            DecoderConfig::from_json_str(r#"{"initial_battery": 120}"#),
            Err(DecoderError::InvalidConfig(_))
        ));
        assert!(matches!(DecoderConfig::from_json_str("{"), Err(DecoderError::Config(_))));
    }
}
