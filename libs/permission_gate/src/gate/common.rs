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

//! # Common
//!
//! This module contains the permission vocabulary shared across the crate: the
//! categories the gate asks for, the platform grant status, and the groups that
//! bind categories to a request tag.

use std::fmt;

/// Platform code reported for a granted permission (`PackageManager.PERMISSION_GRANTED`).
pub const PERMISSION_GRANTED: i32 = 0;
/// Platform code reported for a denied permission (`PackageManager.PERMISSION_DENIED`).
pub const PERMISSION_DENIED: i32 = -1;

/// A logical permission, mapped to exactly one platform permission string.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum PermissionCategory {
    /// Access to the camera.
    Camera,
    /// Write access to external storage.
    StorageWrite,
    /// Read access to external storage.
    StorageRead,
}

impl PermissionCategory {
    /// Every category the gate knows about.
    pub const ALL: [PermissionCategory; 3] = [
        PermissionCategory::Camera,
        PermissionCategory::StorageWrite,
        PermissionCategory::StorageRead,
    ];

    /// Returns the platform permission string for this category.
    pub fn platform_name(self) -> &'static str {
        match self {
            PermissionCategory::Camera => "android.permission.CAMERA",
            PermissionCategory::StorageWrite => "android.permission.WRITE_EXTERNAL_STORAGE",
            PermissionCategory::StorageRead => "android.permission.READ_EXTERNAL_STORAGE",
        }
    }

    /// Parses a platform permission string. Returns `None` for permissions the gate does not
    /// request.
    pub fn from_platform_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.platform_name() == name)
    }
}

impl fmt::Display for PermissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.platform_name())
    }
}

/// The answer of the platform for one category.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum GrantStatus {
    /// The permission is held by the application.
    Granted,
    /// The permission is not held, or the prompt was dismissed.
    Denied,
}

impl GrantStatus {
    /// Converts a platform result code. Anything other than `PERMISSION_GRANTED` is a denial.
    pub fn from_platform_code(code: i32) -> Self {
        if code == PERMISSION_GRANTED {
            GrantStatus::Granted
        } else {
            GrantStatus::Denied
        }
    }

    pub fn is_granted(self) -> bool {
        self == GrantStatus::Granted
    }
}

/// A set of categories requested together under one fixed tag.
///
/// The tag is how the platform correlates a request with its asynchronous result, so the tags
/// live here and nowhere else.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum PermissionGroup {
    /// The camera, requested under tag 1.
    Camera,
    /// External storage write and read, requested under tag 2.
    Storage,
}

impl PermissionGroup {
    /// Groups in the order they are evaluated on activation.
    pub const ALL: [PermissionGroup; 2] = [PermissionGroup::Camera, PermissionGroup::Storage];

    /// Returns the request tag reserved for this group.
    pub fn tag(self) -> i32 {
        match self {
            PermissionGroup::Camera => 1,
            PermissionGroup::Storage => 2,
        }
    }

    /// Looks up the group owning `tag`.
    pub fn from_tag(tag: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|group| group.tag() == tag)
    }

    /// Categories sent with the request, in the order the results come back.
    pub fn categories(self) -> &'static [PermissionCategory] {
        match self {
            PermissionGroup::Camera => &[PermissionCategory::Camera],
            PermissionGroup::Storage => {
                &[PermissionCategory::StorageWrite, PermissionCategory::StorageRead]
            }
        }
    }

    /// The category whose status decides whether the group must be requested.
    pub fn primary_category(self) -> PermissionCategory {
        self.categories()[0]
    }
}

impl fmt::Display for PermissionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionGroup::Camera => f.write_str("camera"),
            PermissionGroup::Storage => f.write_str("storage"),
        }
    }
}
