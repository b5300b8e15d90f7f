// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::CONFIG_CHANNEL;
use crate::types::NotificationChannelDescriptor;

/// Settings for a bridge host. These are not the build-injected secrets;
/// those live in platform metadata and are only ever read through a
/// `ConfigProvider`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Name of the method channel the config bridge listens on.
    pub channel_name: String,
    /// Channel registered at startup.
    pub notification_channel: NotificationChannelDescriptor,
    /// Whether to register `notification_channel` at startup at all.
    pub register_notification_channel: bool,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            channel_name: CONFIG_CHANNEL.into(),
            notification_channel: NotificationChannelDescriptor::default_channel(),
            register_notification_channel: true,
        }
    }
}

impl BridgeSettings {
    /// Load settings from a JSON file. A missing file yields the defaults;
    /// a file that exists but cannot be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&data)?)
    }
}
