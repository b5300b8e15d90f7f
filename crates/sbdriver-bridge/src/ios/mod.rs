// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS platform bridge via objc2.
//
// Requires compilation with the iOS SDK (Xcode). The build copies
// `GOOGLE_GEO_API_KEY`, `GOOGLE_MAPS_API_KEY` and `API_URL` from build
// settings into Info.plist; they are read back through
// `-[NSBundle objectForInfoDictionaryKey:]` on the main bundle.
//
// iOS has no notification channel concept, so the registrar half of this
// bridge always reports `Unsupported`.
//
// The AppDelegate owns the method channel on the Swift side and forwards
// each call envelope through the C entry points at the bottom of this file:
//
//   char *sbdriver_handle_config_call(const char *call_json);
//   void  sbdriver_string_free(char *reply);

#![cfg(target_os = "ios")]

use std::ffi::c_char;

use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2_foundation::{NSBundle, NSString};

use sbdriver_core::error::{Result, SbDriverError};
use sbdriver_core::protocol::PLIST_ERROR;
use sbdriver_core::{ConfigKey, NotificationChannelDescriptor};

use crate::ffi::{self, catch_panic};
use crate::traits::*;

/// iOS implementation of the SBDriver platform bridge.
pub struct IosBridge;

impl IosBridge {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IosBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for IosBridge {
    fn platform_name(&self) -> &str {
        "iOS"
    }
}

impl ConfigProvider for IosBridge {
    fn resolve(&self, key: ConfigKey) -> Result<String> {
        let bundle = NSBundle::mainBundle();
        let name = NSString::from_str(key.metadata_name());

        // SAFETY: NSBundle is thread-safe and the key is a valid NSString.
        let object: Option<Retained<AnyObject>> =
            unsafe { bundle.objectForInfoDictionaryKey(&name) };

        let Some(object) = object else {
            return require_value(key, None);
        };

        match object.downcast::<NSString>() {
            Ok(value) => require_value(key, Some(value.to_string())),
            Err(_) => Err(SbDriverError::MetadataUnavailable {
                key,
                reason: "Info.plist entry is not a string".into(),
            }),
        }
    }

    fn error_code(&self) -> &'static str {
        PLIST_ERROR
    }
}

impl NotificationRegistrar for IosBridge {
    fn channel_support(&self) -> ChannelSupport {
        ChannelSupport::Unsupported
    }

    fn create_channel(&self, _descriptor: &NotificationChannelDescriptor) -> Result<()> {
        Err(SbDriverError::PlatformUnavailable)
    }
}

// ---------------------------------------------------------------------------
// C entry points
// ---------------------------------------------------------------------------

/// Answer one call envelope from the Swift method channel handler.
///
/// Returns the reply envelope (`[value]`, `[code, message, details]`, or an
/// empty string for "not implemented") as a heap string the caller must
/// release with [`sbdriver_string_free`]. Returns null if `call_json` is null
/// or no reply could be produced.
///
/// # Safety
/// `call_json` must be null or a valid NUL-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sbdriver_handle_config_call(call_json: *const c_char) -> *mut c_char {
    catch_panic("sbdriver_handle_config_call", std::ptr::null_mut(), || {
        // SAFETY: forwarded from this function's contract.
        unsafe { ffi::handle_config_call(&crate::platform_config_bridge(), call_json) }
    })
}

/// Release a reply returned by [`sbdriver_handle_config_call`].
///
/// # Safety
/// `reply` must be null or a pointer returned by
/// [`sbdriver_handle_config_call`] that has not been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sbdriver_string_free(reply: *mut c_char) {
    // SAFETY: forwarded from this function's contract.
    unsafe { ffi::free_cstring(reply) }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify that the bridge reports the correct platform name.
    #[test]
    fn platform_name() {
        let bridge = IosBridge::new();
        assert_eq!(bridge.platform_name(), "iOS");
        assert_eq!(bridge.error_code(), "PLIST_ERROR");
        assert_eq!(bridge.channel_support(), ChannelSupport::Unsupported);
    }

    #[test]
    fn null_envelope_gets_null_reply() {
        let reply = unsafe { sbdriver_handle_config_call(std::ptr::null()) };
        assert!(reply.is_null());
        unsafe { sbdriver_string_free(reply) };
    }

    // Info.plist lookups need the app bundle and are exercised in the Xcode
    // test target rather than via `cargo test`.
}
