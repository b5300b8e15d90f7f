// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native capabilities the UI
// runtime relies on.

use sbdriver_core::error::{Result, SbDriverError};
use sbdriver_core::protocol::META_DATA_ERROR;
use sbdriver_core::{ConfigKey, NotificationChannelDescriptor};

/// Unified bridge that groups all native capabilities for one platform.
pub trait PlatformBridge: ConfigProvider + NotificationRegistrar {
    /// Human-readable platform name (e.g. "iOS", "Android").
    fn platform_name(&self) -> &str;
}

/// Read-only access to build-injected configuration.
///
/// Implementations read the platform's static metadata store on every call
/// and never cache. The store is immutable for the process lifetime, so no
/// locking is needed and concurrent calls are independent.
pub trait ConfigProvider: Send + Sync {
    /// Resolve `key` to its non-empty value.
    ///
    /// Absent keys return `MissingConfig`, empty strings `EmptyConfig`, and
    /// store read failures `MetadataUnavailable`. None of these may ever be
    /// turned into an empty success.
    fn resolve(&self, key: ConfigKey) -> Result<String>;

    /// Error code sent to the UI runtime when `resolve` fails.
    fn error_code(&self) -> &'static str {
        META_DATA_ERROR
    }
}

/// Whether the running OS has the notification channel concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSupport {
    Supported,
    /// Platform or OS version predates channels; registration is skipped.
    Unsupported,
}

/// Registers notification channels with the OS.
pub trait NotificationRegistrar: Send + Sync {
    fn channel_support(&self) -> ChannelSupport;

    /// Register `descriptor`. Registering an id that already exists must not
    /// create a duplicate or fail.
    fn create_channel(&self, descriptor: &NotificationChannelDescriptor) -> Result<()>;
}

/// Turn a raw metadata lookup into the provider contract.
pub fn require_value(key: ConfigKey, raw: Option<String>) -> Result<String> {
    match raw {
        None => Err(SbDriverError::MissingConfig { key }),
        Some(value) if value.is_empty() => Err(SbDriverError::EmptyConfig { key }),
        Some(value) => Ok(value),
    }
}

/// Resolve every key and collect the failures, in `ConfigKey::ALL` order.
pub fn check_all(provider: &dyn ConfigProvider) -> Vec<SbDriverError> {
    ConfigKey::ALL
        .into_iter()
        .filter_map(|key| provider.resolve(key).err())
        .collect()
}

/// Check that every key resolves. Each failure is logged; the first one is
/// returned.
///
/// Hosts call this at startup so a misconfigured build fails loudly instead
/// of surfacing one error per UI request later on.
pub fn ensure_complete(provider: &dyn ConfigProvider) -> Result<()> {
    let failures = check_all(provider);
    for e in &failures {
        tracing::error!(key = ?e.config_key(), error = %e, "build-injected configuration missing");
    }
    match failures.into_iter().next() {
        Some(first) => Err(first),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MapConfigProvider;

    fn provider(pairs: &[(&str, &str)]) -> MapConfigProvider {
        MapConfigProvider::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn absent_and_empty_are_distinct_failures() {
        assert!(matches!(
            require_value(ConfigKey::ApiBaseUrl, None),
            Err(SbDriverError::MissingConfig { key: ConfigKey::ApiBaseUrl })
        ));
        assert!(matches!(
            require_value(ConfigKey::ApiBaseUrl, Some(String::new())),
            Err(SbDriverError::EmptyConfig { key: ConfigKey::ApiBaseUrl })
        ));
        assert_eq!(
            require_value(ConfigKey::ApiBaseUrl, Some("https://api.example".into())).unwrap(),
            "https://api.example"
        );
    }

    #[test]
    fn whitespace_is_returned_unmodified() {
        assert_eq!(require_value(ConfigKey::GeoApiKey, Some(" k ".into())).unwrap(), " k ");
    }

    #[test]
    fn complete_store_passes() {
        let p = provider(&[
            ("GOOGLE_GEO_API_KEY", "geo"),
            ("GOOGLE_MAPS_API_KEY", "maps"),
            ("API_URL", "https://api.example"),
        ]);
        assert!(check_all(&p).is_empty());
        ensure_complete(&p).unwrap();
    }

    #[test]
    fn single_missing_key_is_named() {
        let p = provider(&[("GOOGLE_GEO_API_KEY", "geo"), ("API_URL", "https://api.example")]);
        let err = ensure_complete(&p).unwrap_err();
        assert!(matches!(err, SbDriverError::MissingConfig { key: ConfigKey::MapsApiKey }));
        assert_eq!(err.to_string(), "GOOGLE_MAPS_API_KEY not found");
    }

    #[test]
    fn every_failure_is_collected_and_the_first_returned() {
        let p = provider(&[("GOOGLE_MAPS_API_KEY", "maps"), ("API_URL", "")]);
        let failures = check_all(&p);
        assert_eq!(failures.len(), 2);
        assert!(matches!(failures[0], SbDriverError::MissingConfig { key: ConfigKey::GeoApiKey }));
        assert!(matches!(failures[1], SbDriverError::EmptyConfig { key: ConfigKey::ApiBaseUrl }));

        let err = ensure_complete(&p).unwrap_err();
        assert_eq!(err.to_string(), "GOOGLE_GEO_API_KEY not found");
    }
}
