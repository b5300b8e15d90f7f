// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Default notification channel registration.
//
// Android requires a channel before a notification can be shown. This
// registers one fixed channel at startup. It is best-effort: failures are
// logged and dropped, and platforms without channels skip the step.

use std::sync::{Arc, Once, OnceLock};

use sbdriver_core::NotificationChannelDescriptor;

use crate::traits::{ChannelSupport, NotificationRegistrar};

/// Registers one notification channel at most once per instance.
///
/// Android already treats re-registration of an existing id as a no-op;
/// the `Once` guard covers registrars without that guarantee.
pub struct NotificationChannelInitializer {
    registrar: Arc<dyn NotificationRegistrar>,
    descriptor: NotificationChannelDescriptor,
    once: Once,
}

impl NotificationChannelInitializer {
    pub fn new(
        registrar: Arc<dyn NotificationRegistrar>,
        descriptor: NotificationChannelDescriptor,
    ) -> Self {
        Self {
            registrar,
            descriptor,
            once: Once::new(),
        }
    }

    pub fn descriptor(&self) -> &NotificationChannelDescriptor {
        &self.descriptor
    }

    /// Register the channel if this initializer has not done so yet.
    /// Safe to call on every launch and from any thread.
    pub fn ensure_registered(&self) {
        self.once.call_once(|| self.register());
    }

    fn register(&self) {
        let id = self.descriptor.id.as_str();
        if self.registrar.channel_support() == ChannelSupport::Unsupported {
            tracing::debug!(channel_id = id, "notification channels unsupported, skipping");
            return;
        }

        match self.registrar.create_channel(&self.descriptor) {
            Ok(()) => tracing::info!(channel_id = id, "notification channel registered"),
            Err(e) => tracing::warn!(channel_id = id, error = %e, "notification channel registration failed"),
        }
    }
}

/// Register the default channel with the platform registrar, once per
/// process.
pub fn init_default_channel() {
    static DEFAULT: OnceLock<NotificationChannelInitializer> = OnceLock::new();
    DEFAULT
        .get_or_init(|| {
            NotificationChannelInitializer::new(
                crate::platform_registrar(),
                NotificationChannelDescriptor::default_channel(),
            )
        })
        .ensure_registered();
}
