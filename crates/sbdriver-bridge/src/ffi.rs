// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Helpers shared by the exported native entry points (JNI on Android, C ABI
// on iOS).
//
// A panic must never unwind across an `extern` boundary, so every export
// runs its body through `catch_panic`. Strings handed to C follow the usual
// ownership rule: the caller owns the returned pointer and gives it back to
// `free_cstring`.

use std::ffi::{CStr, CString, c_char};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::{Mutex, OnceLock};

use sbdriver_core::error::{Result, SbDriverError};

use crate::config_bridge::ConfigBridge;
use crate::messenger::MessageHandler;

/// Process-wide state that an explicit init call fills in.
///
/// Unlike a bare `Once`, a failed init leaves the slot empty so a later
/// init can still succeed. Readers get a typed error until then.
pub struct NativeSlot<T> {
    cell: OnceLock<T>,
    init_lock: Mutex<()>,
}

impl<T> NativeSlot<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// The stored value, or `Bridge("nativeInit has not run")`.
    pub fn get(&self) -> Result<&T> {
        self.cell
            .get()
            .ok_or_else(|| SbDriverError::Bridge("nativeInit has not run".into()))
    }

    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Run `init` unless the slot is already filled. Returns `Ok(true)` when
    /// this call stored the value, `Ok(false)` when an earlier call had.
    pub fn init_with(&self, init: impl FnOnce() -> Result<T>) -> Result<bool> {
        let _guard = self.init_lock.lock().unwrap_or_else(|e| e.into_inner());
        if self.cell.get().is_some() {
            return Ok(false);
        }
        let value = init()?;
        Ok(self.cell.set(value).is_ok())
    }
}

impl<T> Default for NativeSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run an export body, turning a panic into `fallback`.
pub fn catch_panic<T>(entry: &str, fallback: T, body: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => value,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("non-string panic payload");
            tracing::error!(entry, panic = message, "panic caught at native boundary");
            fallback
        }
    }
}

/// Answer one call envelope passed as a NUL-terminated C string.
///
/// Returns the reply envelope as a newly allocated C string (empty for "not
/// implemented"), or null if `call_json` is null or the reply cannot be
/// produced.
///
/// # Safety
/// `call_json` must be null or point to a valid NUL-terminated string that
/// stays alive for the duration of the call.
pub unsafe fn handle_config_call(bridge: &ConfigBridge, call_json: *const c_char) -> *mut c_char {
    if call_json.is_null() {
        tracing::warn!("config call with null envelope");
        return ptr::null_mut();
    }
    // SAFETY: non-null and NUL-terminated per the function contract.
    let call = unsafe { CStr::from_ptr(call_json) };

    let reply = match bridge.on_message(call.to_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "config call failed");
            return ptr::null_mut();
        }
    };

    match CString::new(reply) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            tracing::error!(error = %e, "reply envelope contains a NUL byte");
            ptr::null_mut()
        }
    }
}

/// Free a string returned by [`handle_config_call`]. Null is a no-op.
///
/// # Safety
/// `ptr` must be null or come from [`handle_config_call`], and must not be
/// freed twice.
pub unsafe fn free_cstring(ptr: *mut c_char) {
    if !ptr.is_null() {
        // SAFETY: allocated by `CString::into_raw` per the function contract.
        drop(unsafe { CString::from_raw(ptr) });
    }
}
