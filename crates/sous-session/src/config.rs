//! Session configuration
//!
//! Loaded from TOML. Every field has a default, so partial files work:
//!
//! ```toml
//! max_transcript_messages = 100
//! log_level = "debug"
//!
//! [ledger]
//! undo_capacity = 5
//! ```

use crate::transcript::Transcript;
use serde::{Deserialize, Serialize};
use sous_review::LedgerConfig;
use std::path::{Path, PathBuf};

/// Errors loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was requested
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for this shape
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Editing session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Transcript length before the oldest messages are dropped
    pub max_transcript_messages: usize,

    /// Review ledger settings
    pub ledger: LedgerConfig,

    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With transcript capacity
    #[inline]
    #[must_use]
    pub fn with_max_transcript_messages(mut self, max: usize) -> Self {
        self.max_transcript_messages = max;
        self
    }

    /// With ledger settings
    #[inline]
    #[must_use]
    pub fn with_ledger(mut self, ledger: LedgerConfig) -> Self {
        self.ledger = ledger;
        self
    }

    /// With log level
    #[inline]
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed input
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is malformed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_transcript_messages: Transcript::DEFAULT_CAPACITY,
            ledger: LedgerConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = SessionConfig::from_toml_str("[ledger]\nundo_capacity = 5\n").unwrap();
        assert_eq!(
            config,
            SessionConfig::new().with_ledger(LedgerConfig::new().with_undo_capacity(5))
        );
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(SessionConfig::from_toml_str("").unwrap(), SessionConfig::default());
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let err = SessionConfig::from_toml_str("max_transcript_messages = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SessionConfig::load("/nonexistent/sous.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/sous.toml"));
    }
}
