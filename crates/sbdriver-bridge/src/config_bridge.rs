// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Config bridge: answers the UI runtime's configuration requests.
//
// Three methods are served, one per `ConfigKey`. Anything else is answered
// with "not implemented" so the UI layer can tell a version mismatch apart
// from a misconfigured build.

use std::sync::Arc;

use serde_json::Value;

use sbdriver_core::error::Result;
use sbdriver_core::protocol::MALFORMED_CALL;
use sbdriver_core::{ConfigKey, MethodCall, MethodResponse};

use crate::messenger::MessageHandler;
use crate::traits::ConfigProvider;

/// Method-channel handler serving build-injected configuration.
#[derive(Clone)]
pub struct ConfigBridge {
    provider: Arc<dyn ConfigProvider>,
}

impl ConfigBridge {
    pub fn new(provider: Arc<dyn ConfigProvider>) -> Self {
        Self { provider }
    }

    /// Answer one call. Arguments are ignored.
    pub fn handle(&self, call: &MethodCall) -> MethodResponse {
        let Some(key) = ConfigKey::from_method(&call.method) else {
            tracing::warn!(method = %call.method, "unknown config bridge method");
            return MethodResponse::NotImplemented;
        };

        match self.provider.resolve(key) {
            Ok(value) => {
                tracing::debug!(key = %key, len = value.len(), "config value resolved");
                MethodResponse::Success(Value::String(value))
            }
            Err(e) => {
                tracing::error!(key = %key, error = %e, "config value unavailable");
                MethodResponse::error(self.provider.error_code(), e.to_string())
            }
        }
    }
}

impl MessageHandler for ConfigBridge {
    fn on_message(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let response = match MethodCall::decode(payload) {
            Ok(call) => self.handle(&call),
            Err(e) => {
                tracing::warn!(error = %e, "undecodable call envelope");
                MethodResponse::error(MALFORMED_CALL, e.to_string())
            }
        };
        response.encode_envelope()
    }
}
