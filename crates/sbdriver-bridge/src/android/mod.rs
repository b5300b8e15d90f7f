// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`.
//
// ## Architecture notes
//
// The build injects `GOOGLE_GEO_API_KEY`, `GOOGLE_MAPS_API_KEY` and `API_URL`
// as manifest placeholders, which end up as `<meta-data>` entries on the
// `<application>` element. They are read back through
// `PackageManager.getApplicationInfo(pkg, GET_META_DATA).metaData`.
//
// The host Activity owns the method channel on the Kotlin side and forwards
// each call envelope to `NativeBridge.nativeHandleConfigCall`, then relays
// the returned reply envelope. See the JNI entry points at the bottom of
// this file for the exact signatures.

#![cfg(target_os = "android")]

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::jstring;
use jni::{JNIEnv, JavaVM};

use sbdriver_core::error::{Result, SbDriverError};
use sbdriver_core::protocol::META_DATA_ERROR;
use sbdriver_core::{ConfigKey, NotificationChannelDescriptor};

use crate::ffi::{NativeSlot, catch_panic};
use crate::messenger::MessageHandler;
use crate::traits::*;

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// `PackageManager.GET_META_DATA`.
const GET_META_DATA: i32 = 0x0000_0080;

/// First API level with `NotificationChannel` (Android 8.0, Oreo).
const MIN_CHANNEL_SDK: i32 = 26;

/// `Context.NOTIFICATION_SERVICE`.
const NOTIFICATION_SERVICE: &str = "notification";

/// What `nativeInit` pins for the rest of the process.
struct NativeContext {
    vm: JavaVM,
    context: GlobalRef,
}

static NATIVE: NativeSlot<NativeContext> = NativeSlot::new();

/// The process `JavaVM`, once `nativeInit` has stored it.
fn java_vm() -> Result<&'static JavaVM> {
    Ok(&NATIVE.get()?.vm)
}

/// Obtain a [`JNIEnv`] for the current thread, attaching it if needed.
fn jni_env() -> Result<JNIEnv<'static>> {
    java_vm()?
        .attach_current_thread_permanently()
        .map_err(|e| SbDriverError::Bridge(format!("failed to attach JNI thread: {e}")))
}

/// The application `Context` pinned by `nativeInit`.
fn context() -> Result<&'static JObject<'static>> {
    Ok(NATIVE.get()?.context.as_obj())
}

/// Convenience: map any `jni::errors::Error` into `SbDriverError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> SbDriverError {
    SbDriverError::Bridge(format!("{context}: {e}"))
}

/// Clear a pending Java exception so the thread can keep using JNI.
fn clear_exception(env: &mut JNIEnv<'_>) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Android implementation of the SBDriver platform bridge.
///
/// Zero-sized; all state lives on the Java side.
pub struct AndroidBridge;

impl AndroidBridge {
    /// Create a new Android bridge.
    ///
    /// This does **not** touch JNI. The first JNI call happens lazily when
    /// a trait method is invoked.
    pub fn new() -> Self {
        Self
    }
}

impl Default for AndroidBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// ConfigProvider — ApplicationInfo.metaData
// ---------------------------------------------------------------------------

/// What the metadata bundle holds for one name.
enum MetaEntry {
    Absent,
    NotAString,
    Value(String),
}

impl ConfigProvider for AndroidBridge {
    fn resolve(&self, key: ConfigKey) -> Result<String> {
        let unavailable = |e: SbDriverError| SbDriverError::MetadataUnavailable {
            key,
            reason: e.to_string(),
        };

        let mut env = jni_env().map_err(unavailable)?;
        let context = context().map_err(unavailable)?;

        let entry = read_meta_data(&mut env, context, key.metadata_name());
        if entry.is_err() {
            clear_exception(&mut env);
        }

        match entry.map_err(unavailable)? {
            MetaEntry::Absent => require_value(key, None),
            MetaEntry::Value(value) => require_value(key, Some(value)),
            MetaEntry::NotAString => Err(SbDriverError::MetadataUnavailable {
                key,
                reason: "meta-data entry is not a string".into(),
            }),
        }
    }

    fn error_code(&self) -> &'static str {
        META_DATA_ERROR
    }
}

/// Look `name` up in the application's meta-data bundle.
fn read_meta_data(env: &mut JNIEnv<'_>, context: &JObject<'_>, name: &str) -> Result<MetaEntry> {
    let package_manager: JObject = env
        .call_method(
            context,
            "getPackageManager",
            "()Landroid/content/pm/PackageManager;",
            &[],
        )
        .map_err(|e| jni_err("getPackageManager", e))?
        .l()
        .map_err(|e| jni_err("getPackageManager->l", e))?;

    let package_name: JObject = env
        .call_method(context, "getPackageName", "()Ljava/lang/String;", &[])
        .map_err(|e| jni_err("getPackageName", e))?
        .l()
        .map_err(|e| jni_err("getPackageName->l", e))?;

    // packageManager.getApplicationInfo(packageName, GET_META_DATA)
    let app_info: JObject = env
        .call_method(
            &package_manager,
            "getApplicationInfo",
            "(Ljava/lang/String;I)Landroid/content/pm/ApplicationInfo;",
            &[JValue::Object(&package_name), JValue::Int(GET_META_DATA)],
        )
        .map_err(|e| jni_err("getApplicationInfo", e))?
        .l()
        .map_err(|e| jni_err("getApplicationInfo->l", e))?;

    // The bundle is null when the manifest declares no meta-data at all.
    let bundle: JObject = env
        .get_field(&app_info, "metaData", "Landroid/os/Bundle;")
        .map_err(|e| jni_err("ApplicationInfo.metaData", e))?
        .l()
        .map_err(|e| jni_err("metaData->l", e))?;
    if bundle.is_null() {
        return Ok(MetaEntry::Absent);
    }

    let j_name: JString = env
        .new_string(name)
        .map_err(|e| jni_err("new_string(meta-data name)", e))?;

    let value: JObject = env
        .call_method(
            &bundle,
            "getString",
            "(Ljava/lang/String;)Ljava/lang/String;",
            &[JValue::Object(&j_name)],
        )
        .map_err(|e| jni_err("Bundle.getString", e))?
        .l()
        .map_err(|e| jni_err("getString->l", e))?;

    if !value.is_null() {
        let value: String = env
            .get_string(&JString::from(value))
            .map_err(|e| jni_err("get_string(meta-data value)", e))?
            .into();
        return Ok(MetaEntry::Value(value));
    }

    // getString also returns null for non-string entries (a placeholder that
    // looks numeric is stored as a number), so tell the two apart.
    let present = env
        .call_method(
            &bundle,
            "containsKey",
            "(Ljava/lang/String;)Z",
            &[JValue::Object(&j_name)],
        )
        .map_err(|e| jni_err("Bundle.containsKey", e))?
        .z()
        .map_err(|e| jni_err("containsKey->z", e))?;

    Ok(if present {
        MetaEntry::NotAString
    } else {
        MetaEntry::Absent
    })
}

// ---------------------------------------------------------------------------
// NotificationRegistrar — android.app.NotificationManager
// ---------------------------------------------------------------------------

impl NotificationRegistrar for AndroidBridge {
    fn channel_support(&self) -> ChannelSupport {
        match sdk_int() {
            Ok(sdk) if sdk >= MIN_CHANNEL_SDK => ChannelSupport::Supported,
            Ok(sdk) => {
                tracing::debug!(sdk, "Android: API level predates notification channels");
                ChannelSupport::Unsupported
            }
            Err(e) => {
                tracing::warn!(error = %e, "Android: could not read SDK_INT");
                ChannelSupport::Unsupported
            }
        }
    }

    /// Create the channel through `NotificationManager.createNotificationChannel`.
    ///
    /// Creating a channel whose id already exists is a no-op on Android, so
    /// this is safe to call on every launch.
    fn create_channel(&self, descriptor: &NotificationChannelDescriptor) -> Result<()> {
        let mut env = jni_env()?;
        let context = context()?;

        let result = create_notification_channel(&mut env, context, descriptor);
        if result.is_err() {
            clear_exception(&mut env);
        }
        result
    }
}

/// `android.os.Build.VERSION.SDK_INT`.
fn sdk_int() -> Result<i32> {
    let mut env = jni_env()?;
    env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
        .map_err(|e| jni_err("Build.VERSION.SDK_INT", e))?
        .i()
        .map_err(|e| jni_err("SDK_INT->i", e))
}

fn create_notification_channel(
    env: &mut JNIEnv<'_>,
    context: &JObject<'_>,
    descriptor: &NotificationChannelDescriptor,
) -> Result<()> {
    tracing::info!(
        channel_id = %descriptor.id,
        importance = descriptor.importance.android_level(),
        "Android: creating notification channel"
    );

    let j_id: JString = env
        .new_string(&descriptor.id)
        .map_err(|e| jni_err("new_string(channel id)", e))?;
    let j_name: JString = env
        .new_string(&descriptor.name)
        .map_err(|e| jni_err("new_string(channel name)", e))?;

    // new NotificationChannel(id, name, importance)
    let channel: JObject = env
        .new_object(
            "android/app/NotificationChannel",
            "(Ljava/lang/String;Ljava/lang/CharSequence;I)V",
            &[
                JValue::Object(&j_id),
                JValue::Object(&j_name),
                JValue::Int(descriptor.importance.android_level()),
            ],
        )
        .map_err(|e| jni_err("new NotificationChannel", e))?;

    env.call_method(
        &channel,
        "enableVibration",
        "(Z)V",
        &[JValue::Bool(descriptor.vibration.into())],
    )
    .map_err(|e| jni_err("enableVibration", e))?;

    env.call_method(
        &channel,
        "setShowBadge",
        "(Z)V",
        &[JValue::Bool(descriptor.show_badge.into())],
    )
    .map_err(|e| jni_err("setShowBadge", e))?;

    let j_service: JString = env
        .new_string(NOTIFICATION_SERVICE)
        .map_err(|e| jni_err("new_string(NOTIFICATION_SERVICE)", e))?;

    let manager: JObject = env
        .call_method(
            context,
            "getSystemService",
            "(Ljava/lang/String;)Ljava/lang/Object;",
            &[JValue::Object(&j_service)],
        )
        .map_err(|e| jni_err("getSystemService(notification)", e))?
        .l()
        .map_err(|e| jni_err("getSystemService->l", e))?;
    if manager.is_null() {
        return Err(SbDriverError::Bridge("NotificationManager unavailable".into()));
    }

    env.call_method(
        &manager,
        "createNotificationChannel",
        "(Landroid/app/NotificationChannel;)V",
        &[JValue::Object(&channel)],
    )
    .map_err(|e| jni_err("createNotificationChannel", e))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// JNI entry points — com.speedbook.driver.NativeBridge
// ---------------------------------------------------------------------------

/// `static native void nativeInit(Context context)`
///
/// Stores the JavaVM and a global reference to the application context, then
/// publishes both to `ndk_context` for other native code. Must run before
/// any other native call. Later calls are ignored once one has succeeded; a
/// failed call leaves nothing behind, so the host may call it again.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_speedbook_driver_NativeBridge_nativeInit(
    env: JNIEnv,
    _class: JClass,
    context: JObject,
) {
    catch_panic("nativeInit", (), move || native_init(env, &context));
}

fn native_init(mut env: JNIEnv, context: &JObject) {
    let stored = NATIVE.init_with(|| {
        let vm = env
            .get_java_vm()
            .map_err(|e| jni_err("nativeInit: get_java_vm", e))?;
        let context = env
            .new_global_ref(context)
            .map_err(|e| jni_err("nativeInit: new_global_ref(context)", e))?;
        Ok(NativeContext { vm, context })
    });

    match stored {
        Ok(true) => {
            if let Ok(native) = NATIVE.get() {
                let vm_ptr = native.vm.get_java_vm_pointer();
                let context_ptr = native.context.as_obj().as_raw();
                // SAFETY: both live in `NATIVE` for the rest of the process.
                unsafe { ndk_context::initialize_android_context(vm_ptr.cast(), context_ptr.cast()) };
            }
            tracing::info!("Android: native context initialised");
        }
        Ok(false) => tracing::debug!("Android: nativeInit already done"),
        Err(e) => {
            tracing::error!(error = %e, "Android: nativeInit failed, native calls stay unavailable");
            clear_exception(&mut env);
        }
    }
}

/// `static native String nativeHandleConfigCall(String callJson)`
///
/// Returns the reply envelope: `[value]`, `[code, message, details]`, or an
/// empty string for "not implemented". Returns `null` only if the reply
/// could not be handed back to Java at all.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_speedbook_driver_NativeBridge_nativeHandleConfigCall(
    env: JNIEnv,
    _class: JClass,
    call_json: JString,
) -> jstring {
    catch_panic("nativeHandleConfigCall", std::ptr::null_mut(), move || {
        handle_config_call(env, &call_json)
    })
}

fn handle_config_call(mut env: JNIEnv, call_json: &JString) -> jstring {
    let call: String = match env.get_string(call_json) {
        Ok(s) => s.into(),
        Err(e) => {
            tracing::error!(error = %e, "Android: unreadable call envelope");
            clear_exception(&mut env);
            return std::ptr::null_mut();
        }
    };

    let reply = match crate::platform_config_bridge().on_message(call.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::error!(error = %e, "Android: config call failed");
            return std::ptr::null_mut();
        }
    };

    match env.new_string(reply) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            tracing::error!(error = %e, "Android: could not return reply envelope");
            clear_exception(&mut env);
            std::ptr::null_mut()
        }
    }
}

/// `static native void nativeCreateNotificationChannel()`
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_speedbook_driver_NativeBridge_nativeCreateNotificationChannel(
    _env: JNIEnv,
    _class: JClass,
) {
    catch_panic("nativeCreateNotificationChannel", (), || {
        crate::notification::init_default_channel();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify that the bridge reports the correct platform name.
    #[test]
    fn platform_name() {
        let bridge = AndroidBridge::new();
        assert_eq!(bridge.platform_name(), "Android");
        assert_eq!(bridge.error_code(), "META_DATA_ERROR");
    }

    #[test]
    fn calls_before_native_init_are_errors() {
        // Nothing in the test process calls nativeInit.
        let err = AndroidBridge::new().resolve(ConfigKey::ApiBaseUrl).unwrap_err();
        match err {
            SbDriverError::MetadataUnavailable { key, reason } => {
                assert_eq!(key, ConfigKey::ApiBaseUrl);
                assert!(reason.contains("nativeInit has not run"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(AndroidBridge::new().channel_support(), ChannelSupport::Unsupported);
    }

    // Metadata and NotificationManager calls need a running Activity and are
    // exercised by the instrumented tests of the host app.
}
