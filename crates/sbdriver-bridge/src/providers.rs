// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host-independent configuration providers.
//
// The mobile backends read platform metadata; these providers stand in for
// it on desktop hosts and in tests, reading the same build parameter names.

use std::collections::HashMap;
use std::path::Path;

use sbdriver_core::ConfigKey;
use sbdriver_core::error::{Result, SbDriverError};

use crate::traits::{ConfigProvider, require_value};

/// Provider backed by an explicit map of metadata entries.
#[derive(Debug, Clone, Default)]
pub struct MapConfigProvider {
    entries: HashMap<String, String>,
}

impl MapConfigProvider {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Build from `(metadata name, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Load a JSON object of metadata entries, e.g.
    /// `{"API_URL": "https://api.example"}`.
    ///
    /// Non-string values are rejected rather than stringified, matching the
    /// mobile stores which only hand out string entries.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let entries: HashMap<String, String> = serde_json::from_str(&data)?;
        let unknown: Vec<&str> = entries
            .keys()
            .filter(|k| ConfigKey::from_metadata_name(k).is_none())
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            tracing::warn!(?unknown, path = %path.display(), "ignoring unknown metadata entries");
        }
        Ok(Self::new(entries))
    }
}

impl ConfigProvider for MapConfigProvider {
    fn resolve(&self, key: ConfigKey) -> Result<String> {
        require_value(key, self.entries.get(key.metadata_name()).cloned())
    }
}

/// Provider that reads build parameters from the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    prefix: String,
}

impl EnvConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `<prefix><METADATA_NAME>` instead of the bare name.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, key: ConfigKey) -> String {
        format!("{}{}", self.prefix, key.metadata_name())
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn resolve(&self, key: ConfigKey) -> Result<String> {
        match std::env::var(self.var_name(key)) {
            Ok(value) => require_value(key, Some(value)),
            Err(std::env::VarError::NotPresent) => Err(SbDriverError::MissingConfig { key }),
            Err(e @ std::env::VarError::NotUnicode(_)) => Err(SbDriverError::MetadataUnavailable {
                key,
                reason: e.to_string(),
            }),
        }
    }
}
