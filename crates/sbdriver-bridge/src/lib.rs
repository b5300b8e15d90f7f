// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! SBDriver — native platform bridge.
//!
//! Serves the three build-injected configuration values (geocoding key,
//! maps key, backend URL) to the embedded UI runtime over a named method
//! channel, and registers the default Android notification channel at
//! startup.
//!
//! Platform backends:
//! - Android: application metadata bundle via `jni` (manifest placeholders).
//! - iOS: main bundle info dictionary via `objc2` (Info.plist entries).
//! - Desktop/CI: process environment, no notification channels.

pub mod config_bridge;
pub mod ffi;
pub mod messenger;
pub mod notification;
pub mod providers;
pub mod traits;

#[cfg(target_os = "ios")]
pub mod ios;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(any(target_os = "ios", target_os = "android")))]
pub mod stub;

use std::sync::Arc;

pub use config_bridge::ConfigBridge;
pub use messenger::{BinaryMessenger, MessengerHost, MethodChannel};
pub use notification::{NotificationChannelInitializer, init_default_channel};

/// Retrieves the bridge implementation for the target operating system.
pub fn platform_bridge() -> Box<dyn traits::PlatformBridge> {
    #[cfg(target_os = "ios")]
    {
        Box::new(ios::IosBridge::new())
    }
    #[cfg(target_os = "android")]
    {
        Box::new(android::AndroidBridge::new())
    }
    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        Box::new(stub::StubBridge::new())
    }
}

/// The platform's build-injected configuration store.
pub fn platform_config_provider() -> Arc<dyn traits::ConfigProvider> {
    #[cfg(target_os = "ios")]
    {
        Arc::new(ios::IosBridge::new())
    }
    #[cfg(target_os = "android")]
    {
        Arc::new(android::AndroidBridge::new())
    }
    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        Arc::new(stub::StubBridge::new())
    }
}

/// The platform's notification channel registrar.
pub fn platform_registrar() -> Arc<dyn traits::NotificationRegistrar> {
    #[cfg(target_os = "ios")]
    {
        Arc::new(ios::IosBridge::new())
    }
    #[cfg(target_os = "android")]
    {
        Arc::new(android::AndroidBridge::new())
    }
    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        Arc::new(stub::StubBridge::new())
    }
}

/// Config bridge wired to the platform store.
pub fn platform_config_bridge() -> ConfigBridge {
    ConfigBridge::new(platform_config_provider())
}
