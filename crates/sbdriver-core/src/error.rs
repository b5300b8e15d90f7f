// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the SBDriver bridge.

use thiserror::Error;

use crate::types::ConfigKey;

/// Top-level error type for all bridge operations.
#[derive(Debug, Error)]
pub enum SbDriverError {
    // -- Configuration lookups --
    #[error("{key} not found")]
    MissingConfig { key: ConfigKey },

    #[error("{key} is present but empty")]
    EmptyConfig { key: ConfigKey },

    #[error("Error reading {key}: {reason}")]
    MetadataUnavailable { key: ConfigKey, reason: String },

    // -- Channel transport --
    #[error("method channel closed")]
    ChannelClosed,

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    // -- Storage / serialization --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

impl SbDriverError {
    /// True when the error means a build-injected value could not be
    /// produced. Callers treat all of these as a build-configuration defect.
    pub fn is_config_missing(&self) -> bool {
        matches!(
            self,
            Self::MissingConfig { .. } | Self::EmptyConfig { .. } | Self::MetadataUnavailable { .. }
        )
    }

    /// The configuration key this error is about, if any.
    pub fn config_key(&self) -> Option<ConfigKey> {
        match self {
            Self::MissingConfig { key }
            | Self::EmptyConfig { key }
            | Self::MetadataUnavailable { key, .. } => Some(*key),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SbDriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_message_names_key() {
        let err = SbDriverError::MissingConfig { key: ConfigKey::ApiBaseUrl };
        assert_eq!(err.to_string(), "API_URL not found");
        assert!(err.is_config_missing());
    }

    #[test]
    fn empty_is_distinct_from_missing() {
        let empty = SbDriverError::EmptyConfig { key: ConfigKey::GeoApiKey };
        let missing = SbDriverError::MissingConfig { key: ConfigKey::GeoApiKey };
        assert!(empty.is_config_missing());
        assert_ne!(empty.to_string(), missing.to_string());
        assert!(empty.to_string().contains("GOOGLE_GEO_API_KEY"));
    }

    #[test]
    fn transport_errors_are_not_config_errors() {
        assert!(!SbDriverError::ChannelClosed.is_config_missing());
        assert_eq!(SbDriverError::PlatformUnavailable.config_key(), None);
    }
}
