// Copyright (C) 2025 The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Permission gate java bindings
//!
//! Entry points for the activity shell. The shell calls its superclass hooks first and then
//! the matching native method, so the hosted runtime is `()` here.
//!
//! Every entry point queues an `ActivityRequest` on the gate's `SharedHandler` instead of locking
//! the gate directly. `Activity.requestPermissions` may call `onRequestPermissionsResult` before
//! it returns, so a result can arrive while `nativeOnStart` is still running on the same thread.
//! That result is queued and handled once the start completes.

use jni::objects::{JIntArray, JObject, JObjectArray};
use jni::sys::{jboolean, jint, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use log::{error, trace};
use permission_gate::task::SharedHandler;
use permission_gate::{
    init_logging, ActivityRequest, GateActivity, GateConfig, PermissionGate, PermissionGroup,
};
use std::sync::{Arc, Mutex};

mod jni_platform;

pub use jni_platform::JniPermissionPlatform;

type JniActivity = GateActivity<(), PermissionGate<JniPermissionPlatform>>;
type JniGate = SharedHandler<ActivityRequest, JniActivity>;

// The gate of the current activity. Replaced on every nativeInit. The lock is only held to clone
// or replace the handle, never while the gate runs.
static GATE: Mutex<Option<Arc<JniGate>>> = Mutex::new(None);

fn current_gate(method: &str) -> Option<Arc<JniGate>> {
    let gate = GATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone();
    if gate.is_none() {
        error!("{} called before nativeInit", method);
    }
    gate
}

fn dispatch(method: &str, request: ActivityRequest) {
    let Some(gate) = current_gate(method) else {
        return;
    };
    if let Err(e) = gate.dispatch(request) {
        error!("{} failed: {:?}", method, e);
    }
}

/// Initializes logging and binds a new gate to `activity`.
#[no_mangle]
pub extern "system" fn Java_org_permissiongate_GateActivity_nativeInit<'a>(
    mut env: JNIEnv<'a>,
    activity: JObject<'a>,
) {
    init_logging(&GateConfig::default());

    let gate = JniPermissionPlatform::new(&mut env, &activity).and_then(|platform| {
        SharedHandler::new(GateActivity::new((), PermissionGate::new(platform)))
    });
    match gate {
        Ok(gate) => {
            *GATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::new(gate));
            trace!("Native init complete!");
        }
        Err(e) => error!("Failed to bind the permission gate: {:?}", e),
    }
}

/// Runs the gate for a foreground transition.
#[no_mangle]
pub extern "system" fn Java_org_permissiongate_GateActivity_nativeOnStart<'a>(
    _env: JNIEnv<'a>,
    _activity: JObject<'a>,
) {
    trace!("nativeOnStart");
    dispatch("nativeOnStart", ActivityRequest::Start);
}

#[no_mangle]
pub extern "system" fn Java_org_permissiongate_GateActivity_nativeOnStop<'a>(
    _env: JNIEnv<'a>,
    _activity: JObject<'a>,
) {
    trace!("nativeOnStop");
    dispatch("nativeOnStop", ActivityRequest::Stop);
}

/// Forwards `onRequestPermissionsResult`.
#[no_mangle]
pub extern "system" fn Java_org_permissiongate_GateActivity_nativeOnRequestPermissionsResult<'a>(
    mut env: JNIEnv<'a>,
    _activity: JObject<'a>,
    request_code: jint,
    permissions: JObjectArray<'a>,
    grant_results: JIntArray<'a>,
) {
    trace!("nativeOnRequestPermissionsResult with {}", request_code);
    let categories = jni_platform::read_categories(&mut env, &permissions).unwrap_or_else(|e| {
        error!("Failed to read the requested permissions: {:?}", e);
        Vec::new()
    });
    let results = jni_platform::read_results(&mut env, &grant_results).unwrap_or_else(|e| {
        error!("Failed to read the grant results: {:?}", e);
        Vec::new()
    });
    dispatch(
        "nativeOnRequestPermissionsResult",
        ActivityRequest::PermissionResult { tag: request_code, categories, results },
    );
}

/// Whether the group owning `request_code` is granted in the current cycle. Reports false while
/// the gate is busy.
#[no_mangle]
pub extern "system" fn Java_org_permissiongate_GateActivity_nativeIsGranted<'a>(
    _env: JNIEnv<'a>,
    _activity: JObject<'a>,
    request_code: jint,
) -> jboolean {
    let Some(group) = PermissionGroup::from_tag(request_code) else {
        return JNI_FALSE;
    };
    let granted = current_gate("nativeIsGranted")
        .and_then(|gate| gate.with_callback(|activity| activity.hooks().is_granted(group)));
    match granted {
        Some(true) => JNI_TRUE,
        _ => JNI_FALSE,
    }
}
