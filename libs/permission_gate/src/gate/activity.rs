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

//! # Activity
//!
//! The lifecycle-hook interface the hosting shell drives, and `GateActivity`, which combines the
//! hosted runtime's own start/stop handling with a set of hooks.

use anyhow::{Context, Result};
use log::info;

use crate::common::{GrantStatus, PermissionCategory};
use crate::task::HandlerCallback;

/// Hooks invoked by the hosting shell.
pub trait LifecycleHooks {
    /// Called once per foreground transition. Must not block.
    fn on_start(&mut self) -> Result<()>;

    /// Called when the activity leaves the foreground.
    fn on_stop(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called once per outstanding permission request with the platform's answer.
    fn on_permission_result(
        &mut self,
        tag: i32,
        categories: &[PermissionCategory],
        results: &[GrantStatus],
    );
}

/// The application hosted by the activity. Its start and stop handling is a passthrough that
/// always runs before any hook.
pub trait HostedRuntime {
    fn on_start(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_stop(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A runtime whose lifecycle is already handled by the shell itself.
impl HostedRuntime for () {}

/// Lifecycle events queued for the thread owning a `GateActivity`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ActivityRequest {
    Start,
    Stop,
    PermissionResult { tag: i32, categories: Vec<PermissionCategory>, results: Vec<GrantStatus> },
}

/// GateActivity forwards every lifecycle transition to the hosted runtime first and then to its
/// hooks.
pub struct GateActivity<R: HostedRuntime, H: LifecycleHooks> {
    runtime: R,
    hooks: H,
}

impl<R: HostedRuntime, H: LifecycleHooks> GateActivity<R, H> {
    pub fn new(runtime: R, hooks: H) -> Self {
        Self { runtime, hooks }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }
}

impl<R: HostedRuntime, H: LifecycleHooks> LifecycleHooks for GateActivity<R, H> {
    fn on_start(&mut self) -> Result<()> {
        self.runtime.on_start().context("The hosted runtime failed to start")?;
        self.hooks.on_start()
    }

    fn on_stop(&mut self) -> Result<()> {
        self.runtime.on_stop().context("The hosted runtime failed to stop")?;
        self.hooks.on_stop()
    }

    fn on_permission_result(
        &mut self,
        tag: i32,
        categories: &[PermissionCategory],
        results: &[GrantStatus],
    ) {
        self.hooks.on_permission_result(tag, categories, results);
    }
}

impl<R: HostedRuntime, H: LifecycleHooks> HandlerCallback<ActivityRequest> for GateActivity<R, H> {
    fn handle_task(&mut self, task: ActivityRequest) -> Result<()> {
        match task {
            ActivityRequest::Start => {
                info!("Activity started");
                self.on_start()
            }
            ActivityRequest::Stop => {
                info!("Activity stopped");
                self.on_stop()
            }
            ActivityRequest::PermissionResult { tag, categories, results } => {
                self.on_permission_result(tag, &categories, &results);
                Ok(())
            }
        }
    }
}
