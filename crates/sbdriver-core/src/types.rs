// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the SBDriver native bridge.

use serde::{Deserialize, Serialize};

/// One of the build-injected configuration values the UI layer can ask for.
///
/// The set is closed: values are injected at build time (manifest
/// placeholders on Android, Info.plist entries on iOS) and never created
/// at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigKey {
    /// Google geocoding API key.
    GeoApiKey,
    /// Google Maps SDK API key.
    MapsApiKey,
    /// Base URL of the backend API.
    ApiBaseUrl,
}

impl ConfigKey {
    /// Every key, in method-table order.
    pub const ALL: [ConfigKey; 3] = [Self::GeoApiKey, Self::MapsApiKey, Self::ApiBaseUrl];

    /// Name of the entry in the platform metadata store (and of the build
    /// parameter that feeds it).
    pub fn metadata_name(self) -> &'static str {
        match self {
            Self::GeoApiKey => "GOOGLE_GEO_API_KEY",
            Self::MapsApiKey => "GOOGLE_MAPS_API_KEY",
            Self::ApiBaseUrl => "API_URL",
        }
    }

    /// Method name the UI layer uses to request this key.
    pub fn method_name(self) -> &'static str {
        match self {
            Self::GeoApiKey => "getGoogleGeoApiKey",
            Self::MapsApiKey => "getGoogleMapsApiKey",
            Self::ApiBaseUrl => "getApiUrl",
        }
    }

    /// Map an inbound method name to its key. Unknown names return `None`.
    pub fn from_method(method: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.method_name() == method)
    }

    /// Map a metadata entry name to its key.
    pub fn from_metadata_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.metadata_name() == name)
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.metadata_name())
    }
}

/// Android notification importance levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    None,
    Min,
    Low,
    Default,
    High,
    Max,
}

impl Importance {
    /// Value of the matching `NotificationManager.IMPORTANCE_*` constant.
    pub fn android_level(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Min => 1,
            Self::Low => 2,
            Self::Default => 3,
            Self::High => 4,
            Self::Max => 5,
        }
    }
}

/// Identity and behaviour of a notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannelDescriptor {
    /// Stable channel id. Re-registering the same id is a no-op on Android.
    pub id: String,
    /// User-visible channel name (shown in system settings).
    pub name: String,
    pub importance: Importance,
    pub vibration: bool,
    pub show_badge: bool,
}

impl NotificationChannelDescriptor {
    /// The channel push notifications are posted to unless a payload names
    /// another one.
    pub fn default_channel() -> Self {
        Self {
            id: "sbdriver_channel".into(),
            name: "General notifications".into(),
            importance: Importance::High,
            vibration: true,
            show_badge: true,
        }
    }
}

impl Default for NotificationChannelDescriptor {
    fn default() -> Self {
        Self::default_channel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_map_to_keys() {
        assert_eq!(ConfigKey::from_method("getGoogleGeoApiKey"), Some(ConfigKey::GeoApiKey));
        assert_eq!(ConfigKey::from_method("getGoogleMapsApiKey"), Some(ConfigKey::MapsApiKey));
        assert_eq!(ConfigKey::from_method("getApiUrl"), Some(ConfigKey::ApiBaseUrl));
        assert_eq!(ConfigKey::from_method("getUnknownThing"), None);
        // Metadata names are not method names.
        assert_eq!(ConfigKey::from_method("API_URL"), None);
    }

    #[test]
    fn display_is_metadata_name() {
        assert_eq!(ConfigKey::MapsApiKey.to_string(), "GOOGLE_MAPS_API_KEY");
        assert_eq!(ConfigKey::from_metadata_name("API_URL"), Some(ConfigKey::ApiBaseUrl));
    }

    #[test]
    fn default_channel_descriptor() {
        let d = NotificationChannelDescriptor::default_channel();
        assert_eq!(d.id, "sbdriver_channel");
        assert_eq!(d.name, "General notifications");
        assert_eq!(d.importance.android_level(), 4);
        assert!(d.vibration && d.show_badge);
    }
}
