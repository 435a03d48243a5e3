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

//! # Permission Gate
//!
//! This crate requests the runtime permissions an activity needs when it comes to the
//! foreground and records what the user answered.
//!
//! The hosting shell drives a `PermissionGate` through the `LifecycleHooks` interface: `on_start`
//! checks the camera and storage groups and asks the platform for the missing ones, and
//! `on_permission_result` records the asynchronous answer. A denial is an outcome, never an
//! error.
//!
//! The platform is reached through the `PermissionPlatform` trait so the same gate runs against
//! the device, the host, or a test double.

/// Lifecycle hooks and the activity shell that forwards them.
pub mod activity;
/// Permission categories, grant statuses and request groups.
pub mod common;
/// Logging configuration.
pub mod config;
/// The permission state machine.
pub mod permission_gate;
/// The boundary to the platform permission subsystem.
pub mod platform;
/// Requests, outcomes and grant states.
pub mod request;
/// Cross-thread delivery of lifecycle events.
pub mod task;

pub use activity::{ActivityRequest, GateActivity, HostedRuntime, LifecycleHooks};
pub use common::{GrantStatus, PermissionCategory, PermissionGroup};
pub use config::{init_logging, GateConfig};
pub use permission_gate::PermissionGate;
pub use platform::{HostPlatform, PermissionPlatform};
pub use request::{GrantState, PermissionOutcome, PermissionRequest};
