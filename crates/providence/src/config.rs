// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serializer configuration.
//!
//! Can be built in code or loaded from TOML:
//!
//! ```toml
//! format = "pretty-json"
//! strict = true
//!
//! [json]
//! indent = "  "
//! separator = ", "
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::serializer::{Format, JsonFormat};

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

/// Options shared by the serializers built from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializerConfig {
    /// Format returned by [`SerializerProvider::default_serializer`].
    ///
    /// [`SerializerProvider::default_serializer`]: crate::serializer::SerializerProvider::default_serializer
    #[serde(default)]
    pub format: Format,

    /// Fail on unknown fields and enum values instead of dropping them.
    #[serde(default)]
    pub strict: bool,

    /// Pretty JSON layout.
    #[serde(default)]
    pub json: JsonFormat,
}

impl SerializerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.json.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SerializerConfig::from_toml_str("").expect("empty config");
        assert_eq!(config, SerializerConfig::default());
        assert_eq!(config.format, Format::Binary);
        assert!(!config.strict);
        assert_eq!(config.json.indent, "    ");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "format = \"pretty-json\"\nstrict = true\n\n[json]\nindent = \"\\t\""
        )
        .expect("write");

        let config = SerializerConfig::from_file(file.path()).expect("load");
        assert_eq!(config.format, Format::PrettyJson);
        assert!(config.strict);
        assert_eq!(config.json.indent, "\t");
        assert_eq!(config.json.newline, "\n");
        assert_eq!(config.json.separator, ",");
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            SerializerConfig::from_toml_str("format = \"xml\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            SerializerConfig::from_toml_str("[json]\nspace = \"_\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SerializerConfig::from_toml_str("[json]\nseparator = \";\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SerializerConfig::from_file("/nonexistent/providence.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_serialization() {
        let config = SerializerConfig {
            format: Format::NamedJson,
            strict: true,
            json: JsonFormat::default(),
        };
        let text = toml::to_string(&config).expect("serialize");
        assert!(text.contains("format = \"named-json\""));
        assert_eq!(SerializerConfig::from_toml_str(&text).expect("parse"), config);
    }
}
