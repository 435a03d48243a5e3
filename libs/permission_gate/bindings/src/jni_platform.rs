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

//! `PermissionPlatform` backed by the androidx permission helpers, reached through JNI.

use anyhow::{Context, Result};
use jni::objects::{GlobalRef, JIntArray, JObject, JObjectArray, JString, JValue};
use jni::{JNIEnv, JavaVM};
use log::{debug, warn};
use permission_gate::{GrantStatus, PermissionCategory, PermissionPlatform};

const CONTEXT_COMPAT_CLASS: &str = "androidx/core/content/ContextCompat";
const CHECK_SELF_PERMISSION_SIG: &str = "(Landroid/content/Context;Ljava/lang/String;)I";
const ACTIVITY_COMPAT_CLASS: &str = "androidx/core/app/ActivityCompat";
const REQUEST_PERMISSIONS_SIG: &str = "(Landroid/app/Activity;[Ljava/lang/String;I)V";
const STRING_CLASS: &str = "java/lang/String";

/// Reaches the platform through the activity the shell registered.
pub struct JniPermissionPlatform {
    vm: JavaVM,
    activity: GlobalRef,
}

impl JniPermissionPlatform {
    pub fn new(env: &mut JNIEnv, activity: &JObject) -> Result<Self> {
        let vm = env.get_java_vm().context("Failed to get the JavaVM")?;
        let activity =
            env.new_global_ref(activity).context("Failed to create a global ref to the activity")?;
        Ok(Self { vm, activity })
    }
}

impl PermissionPlatform for JniPermissionPlatform {
    fn check_permission(&self, category: PermissionCategory) -> Result<GrantStatus> {
        let mut guard = self.vm.attach_current_thread().context("Failed to attach to the JavaVM")?;
        let env: &mut JNIEnv = &mut guard;
        let name = checked(env, |env| env.new_string(category.platform_name()))?;
        let code = checked(env, |env| {
            env.call_static_method(
                CONTEXT_COMPAT_CLASS,
                "checkSelfPermission",
                CHECK_SELF_PERMISSION_SIG,
                &[JValue::Object(self.activity.as_obj()), JValue::Object(&*name)],
            )
        })
        .and_then(|value| value.i())
        .with_context(|| format!("checkSelfPermission failed for {}", category))?;
        debug!("checkSelfPermission({}) = {}", category, code);
        Ok(GrantStatus::from_platform_code(code))
    }

    fn request_permissions(&mut self, tag: i32, categories: &[PermissionCategory]) -> Result<()> {
        let mut guard = self.vm.attach_current_thread().context("Failed to attach to the JavaVM")?;
        let env: &mut JNIEnv = &mut guard;
        let len = i32::try_from(categories.len()).context("Too many permissions")?;
        let names = checked(env, |env| env.new_object_array(len, STRING_CLASS, JObject::null()))?;
        for (i, category) in (0..len).zip(categories) {
            let name = checked(env, |env| env.new_string(category.platform_name()))?;
            checked(env, |env| env.set_object_array_element(&names, i, &name))?;
        }
        checked(env, |env| {
            env.call_static_method(
                ACTIVITY_COMPAT_CLASS,
                "requestPermissions",
                REQUEST_PERMISSIONS_SIG,
                &[
                    JValue::Object(self.activity.as_obj()),
                    JValue::Object(&*names),
                    JValue::Int(tag),
                ],
            )
        })
        .with_context(|| format!("requestPermissions failed for tag {}", tag))?;
        Ok(())
    }
}

/// Runs a JNI call and clears any Java exception it left pending, so the exception never crosses
/// back into the VM.
fn checked<'local, T>(
    env: &mut JNIEnv<'local>,
    call: impl FnOnce(&mut JNIEnv<'local>) -> jni::errors::Result<T>,
) -> jni::errors::Result<T> {
    let result = call(env);
    if env.exception_check().unwrap_or(false) {
        if let Err(e) = env.exception_describe() {
            warn!("Failed to describe the pending Java exception: {}", e);
        }
        if let Err(e) = env.exception_clear() {
            warn!("Failed to clear the pending Java exception: {}", e);
        }
    }
    result
}

/// Reads the permission names of a result. Names the gate does not request are skipped.
pub fn read_categories(
    env: &mut JNIEnv,
    permissions: &JObjectArray,
) -> Result<Vec<PermissionCategory>> {
    if permissions.is_null() {
        return Ok(Vec::new());
    }
    let len = checked(env, |env| env.get_array_length(permissions))?;
    let mut categories = Vec::new();
    for i in 0..len {
        let element = checked(env, |env| env.get_object_array_element(permissions, i))?;
        let name = JString::from(element);
        let name: String = checked(env, |env| env.get_string(&name).map(String::from))?;
        match PermissionCategory::from_platform_name(&name) {
            Some(category) => categories.push(category),
            None => warn!("Skipping unexpected permission {}", name),
        }
    }
    Ok(categories)
}

/// Reads the grant results of a result. A null array reads as empty.
pub fn read_results(env: &mut JNIEnv, grant_results: &JIntArray) -> Result<Vec<GrantStatus>> {
    if grant_results.is_null() {
        return Ok(Vec::new());
    }
    let len = checked(env, |env| env.get_array_length(grant_results))?;
    let mut codes = vec![0; usize::try_from(len)?];
    checked(env, |env| env.get_int_array_region(grant_results, 0, &mut codes))?;
    Ok(codes.into_iter().map(GrantStatus::from_platform_code).collect())
}
