// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry configuration.
//!
//! Supports both programmatic and file-based configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Codec registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Prefix of `$ref` values emitted for named schemas.
    #[serde(default = "default_schema_ref_prefix")]
    pub schema_ref_prefix: String,

    /// Raw types whose type arguments are irrelevant to encoding.
    #[serde(default = "default_always_raw")]
    pub always_raw: Vec<String>,

    /// Reject JSON object fields that no deserializable property claims.
    #[serde(default)]
    pub deny_unknown_fields: bool,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_ref_prefix() -> String {
    "#/components/schemas/".to_string()
}

fn default_always_raw() -> Vec<String> {
    vec!["Class".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            schema_ref_prefix: default_schema_ref_prefix(),
            always_raw: default_always_raw(),
            deny_unknown_fields: false,
            log_level: default_log_level(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_ref_prefix.is_empty() {
            return Err(ConfigError::Invalid("schema_ref_prefix is empty".into()));
        }

        for (i, raw) in self.always_raw.iter().enumerate() {
            if raw.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "always_raw entry {} is empty",
                    i
                )));
            }
            if raw.contains(['<', '>', ',']) {
                return Err(ConfigError::Invalid(format!(
                    "always_raw entry {} ({}) must be an unparameterized type",
                    i, raw
                )));
            }
        }

        Ok(())
    }

    pub fn with_schema_ref_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.schema_ref_prefix = prefix.into();
        self
    }

    pub fn with_always_raw(mut self, raw: impl Into<String>) -> Self {
        self.always_raw.push(raw.into());
        self
    }

    pub fn deny_unknown_fields(mut self, enabled: bool) -> Self {
        self.deny_unknown_fields = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.schema_ref_prefix, "#/components/schemas/");
        assert_eq!(config.always_raw, vec!["Class".to_string()]);
        assert!(!config.deny_unknown_fields);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = RegistryConfig::default().with_schema_ref_prefix("");
        assert!(config.validate().is_err());

        let config = RegistryConfig::default().with_always_raw("Class<T>");
        assert!(config.validate().is_err());

        let config = RegistryConfig::default().with_always_raw("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "schema_ref_prefix = \"#/definitions/\"").expect("write");
        writeln!(file, "deny_unknown_fields = true").expect("write");

        let config = RegistryConfig::from_file(file.path()).expect("load");
        assert_eq!(config.schema_ref_prefix, "#/definitions/");
        assert!(config.deny_unknown_fields);
        assert_eq!(config.always_raw, vec!["Class".to_string()]);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_from_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "schema_ref_prefix = \"\"").expect("write");
        assert!(matches!(
            RegistryConfig::from_file(file.path()),
            Err(ConfigError::Invalid(_))
        ));

        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "always_raw = 3").expect("write");
        assert!(matches!(
            RegistryConfig::from_file(file.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = RegistryConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        assert!(toml_str.contains("schema_ref_prefix = \"#/components/schemas/\""));
        let back: RegistryConfig = toml::from_str(&toml_str).expect("parse");
        assert_eq!(back, config);
    }
}
