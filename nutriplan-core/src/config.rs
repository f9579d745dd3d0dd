use serde::{Deserialize, Serialize};

use crate::constants::{CATALOG_MANIFEST_NAME, DEFAULT_STORAGE_KEY, SHARE_FRAGMENT_PREFIX};
use crate::error::ConfigError;

/// Deployment settings shared by the collaborators around the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerConfig {
    /// Key the persisted snapshot is stored under.
    #[serde(default = "PlannerConfig::default_storage_key")]
    pub storage_key: String,
    /// Location-hash prefix marking a shared summary.
    #[serde(default = "PlannerConfig::default_share_prefix")]
    pub share_prefix: String,
    /// Manifest listing the menu documents of a catalog read from disk.
    #[serde(default = "PlannerConfig::default_manifest_name")]
    pub manifest_name: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            storage_key: Self::default_storage_key(),
            share_prefix: Self::default_share_prefix(),
            manifest_name: Self::default_manifest_name(),
        }
    }
}

impl PlannerConfig {
    fn default_storage_key() -> String {
        DEFAULT_STORAGE_KEY.to_string()
    }

    fn default_share_prefix() -> String {
        SHARE_FRAGMENT_PREFIX.to_string()
    }

    fn default_manifest_name() -> String {
        CATALOG_MANIFEST_NAME.to_string()
    }

    /// Parse a config document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if a field is blank or the share prefix is not a
    /// location-hash fragment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("storage_key", &self.storage_key),
            ("share_prefix", &self.share_prefix),
            ("manifest_name", &self.manifest_name),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty { field });
            }
        }
        if !self.share_prefix.starts_with('#') {
            return Err(ConfigError::SharePrefix(self.share_prefix.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = PlannerConfig::from_json(r#"{"storageKey": "custom"}"#).unwrap();
        assert_eq!(config.storage_key, "custom");
        assert_eq!(config.share_prefix, "#share=");
        assert_eq!(config.manifest_name, "json_directory.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_rejects_blank_and_non_fragment_values() {
        let config = PlannerConfig {
            storage_key: "  ".into(),
            ..PlannerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Empty {
                field: "storage_key"
            })
        );

        let config = PlannerConfig {
            share_prefix: "share=".into(),
            ..PlannerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SharePrefix("share=".into()))
        );
    }
}
