// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SBDriver — Core types, errors and the method-channel protocol shared by
// the native bridge and its hosts.

pub mod config;
pub mod error;
pub mod protocol;
pub mod types;

pub use config::BridgeSettings;
pub use error::SbDriverError;
pub use protocol::{CONFIG_CHANNEL, MethodCall, MethodResponse};
pub use types::*;
