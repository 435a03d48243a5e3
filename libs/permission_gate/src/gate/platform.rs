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

//! # Platform
//!
//! The boundary to the operating system's permission subsystem.

use anyhow::Result;
use log::info;

use crate::common::{GrantStatus, PermissionCategory};

/// The permission capabilities the gate needs from the platform.
pub trait PermissionPlatform {
    /// Synchronously queries the current status of `category`.
    fn check_permission(&self, category: PermissionCategory) -> Result<GrantStatus>;

    /// Asks the platform to prompt for `categories`. Returns as soon as the request is handed
    /// over; the platform eventually delivers exactly one result carrying `tag`.
    fn request_permissions(&mut self, tag: i32, categories: &[PermissionCategory]) -> Result<()>;
}

/// Platform used off-device, where permissions are implicit.
///
/// Every category is reported granted, so a gate driven by this platform never prompts.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostPlatform;

impl PermissionPlatform for HostPlatform {
    fn check_permission(&self, _category: PermissionCategory) -> Result<GrantStatus> {
        Ok(GrantStatus::Granted)
    }

    fn request_permissions(&mut self, tag: i32, categories: &[PermissionCategory]) -> Result<()> {
        info!("Ignoring permission request {} for {:?} on the host platform", tag, categories);
        Ok(())
    }
}
