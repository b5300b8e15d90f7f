// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where native mobile APIs are unavailable.
//
// Configuration comes from the process environment under the same names the
// mobile builds take as build parameters. Notification channels do not exist
// on desktop, so registration is always skipped.

use sbdriver_core::error::{Result, SbDriverError};
use sbdriver_core::{ConfigKey, NotificationChannelDescriptor};

use crate::providers::EnvConfigProvider;
use crate::traits::*;

/// Bridge returned on non-mobile platforms.
#[derive(Debug, Default)]
pub struct StubBridge {
    env: EnvConfigProvider,
}

impl StubBridge {
    pub fn new() -> Self {
        Self {
            env: EnvConfigProvider::new(),
        }
    }
}

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl ConfigProvider for StubBridge {
    fn resolve(&self, key: ConfigKey) -> Result<String> {
        self.env.resolve(key)
    }
}

impl NotificationRegistrar for StubBridge {
    fn channel_support(&self) -> ChannelSupport {
        ChannelSupport::Unsupported
    }

    fn create_channel(&self, descriptor: &NotificationChannelDescriptor) -> Result<()> {
        tracing::warn!(channel_id = %descriptor.id, "create_channel called on stub bridge");
        Err(SbDriverError::PlatformUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_reports_no_channel_support() {
        let bridge = StubBridge::new();
        assert_eq!(bridge.platform_name(), "Desktop (stub)");
        assert_eq!(bridge.channel_support(), ChannelSupport::Unsupported);
        assert!(matches!(
            bridge.create_channel(&NotificationChannelDescriptor::default_channel()),
            Err(SbDriverError::PlatformUnavailable)
        ));
    }
}
