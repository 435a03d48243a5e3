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

use anyhow::Result;
use log::{debug, error, info, warn};
use std::collections::BTreeMap;

use crate::activity::LifecycleHooks;
use crate::common::{GrantStatus, PermissionCategory, PermissionGroup};
use crate::platform::PermissionPlatform;
use crate::request::{GrantState, PermissionOutcome, PermissionRequest};

/// PermissionGate inspects the camera and storage permissions whenever the activity comes to the
/// foreground, asks the platform for the missing ones and records what the user answered.
///
/// Every activation starts a new cycle: nothing is remembered from the previous one, so calling
/// `on_activate` repeatedly re-evaluates the platform status and may prompt again.
pub struct PermissionGate<P: PermissionPlatform> {
    platform: P,
    states: BTreeMap<PermissionGroup, GrantState>,
    outstanding: BTreeMap<PermissionGroup, PermissionRequest>,
    outcomes: BTreeMap<PermissionGroup, PermissionOutcome>,
}

impl<P: PermissionPlatform> PermissionGate<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            states: BTreeMap::new(),
            outstanding: BTreeMap::new(),
            outcomes: BTreeMap::new(),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Checks every group and requests the ones that are not granted.
    ///
    /// Returns the requests handed to the platform, in evaluation order. Platform failures are
    /// logged; they never stop the remaining groups from being processed.
    pub fn on_activate(&mut self) -> Vec<PermissionRequest> {
        self.states.clear();
        self.outcomes.clear();

        let mut issued = Vec::new();
        for group in PermissionGroup::ALL {
            if self.check(group.primary_category()).is_granted() {
                debug!("The {} permission is already granted", group);
                // A result still owed by an earlier cycle no longer applies.
                self.outstanding.remove(&group);
                self.states.insert(group, GrantState::AlreadyGranted);
                continue;
            }
            match self.request(group) {
                Ok(request) => issued.push(request),
                Err(e) => error!("Failed to request the {} permission: {:?}", group, e),
            }
        }
        issued
    }

    /// Issues the request for `group` regardless of its current status.
    pub fn request(&mut self, group: PermissionGroup) -> Result<PermissionRequest> {
        let request = PermissionRequest::for_group(group);

        // The platform may answer before `request_permissions` returns, so the request must be
        // pending first. A request issued again under the same tag supersedes the previous one.
        let previous_request = self.outstanding.insert(group, request.clone());
        let previous_state = self.states.insert(group, GrantState::Pending);
        let previous_outcome = self.outcomes.remove(&group);

        if let Err(e) = self.platform.request_permissions(request.request_id, &request.categories) {
            self.restore(group, previous_request, previous_state, previous_outcome);
            return Err(e.context(format!(
                "Failed to issue permission request {}",
                request.request_id
            )));
        }

        info!("Requested the {} permission with tag {}", group, request.request_id);
        Ok(request)
    }

    fn restore(
        &mut self,
        group: PermissionGroup,
        request: Option<PermissionRequest>,
        state: Option<GrantState>,
        outcome: Option<PermissionOutcome>,
    ) {
        match request {
            Some(request) => self.outstanding.insert(group, request),
            None => self.outstanding.remove(&group),
        };
        match state {
            Some(state) => self.states.insert(group, state),
            None => self.states.remove(&group),
        };
        if let Some(outcome) = outcome {
            self.outcomes.insert(group, outcome);
        }
    }

    /// Records the platform's answer for `tag`.
    ///
    /// `categories` are the permissions echoed back by the platform and are only used for
    /// diagnostics; `results[i]` belongs to the i-th category of the group. Unknown tags are
    /// ignored. An empty `results` is a dismissed prompt and is recorded as a denial.
    pub fn on_permission_result(
        &mut self,
        tag: i32,
        categories: &[PermissionCategory],
        results: &[GrantStatus],
    ) -> Option<PermissionOutcome> {
        let Some(group) = PermissionGroup::from_tag(tag) else {
            debug!("Ignoring the permission result for unknown tag {}", tag);
            return None;
        };

        match self.state(group) {
            GrantState::AlreadyGranted => {
                debug!("Ignoring a stale {} permission result, it is already granted", group);
                return None;
            }
            state if state.is_resolved() => {
                warn!("Ignoring a second {} permission result in the same cycle", group);
                return None;
            }
            _ => {}
        }
        if self.outstanding.remove(&group).is_none() {
            debug!("Received the {} permission result without an outstanding request", group);
        }
        if !categories.is_empty() && categories != group.categories() {
            warn!("The {} permission result names {:?}", group, categories);
        }

        let outcome = PermissionOutcome::from_results(group, results);
        if outcome.is_granted() {
            info!("The {} permission was granted", group);
            self.states.insert(group, GrantState::Granted);
        } else {
            info!("The {} permission was not granted", group);
            self.states.insert(group, GrantState::Denied);
        }
        self.outcomes.insert(group, outcome.clone());
        Some(outcome)
    }

    pub fn state(&self, group: PermissionGroup) -> GrantState {
        self.states.get(&group).copied().unwrap_or_default()
    }

    pub fn is_granted(&self, group: PermissionGroup) -> bool {
        self.state(group).is_granted()
    }

    /// The outcome recorded for `group` in the current cycle, if its result has arrived.
    pub fn outcome(&self, group: PermissionGroup) -> Option<&PermissionOutcome> {
        self.outcomes.get(&group)
    }

    pub fn outstanding(&self, group: PermissionGroup) -> Option<&PermissionRequest> {
        self.outstanding.get(&group)
    }

    fn check(&self, category: PermissionCategory) -> GrantStatus {
        match self.platform.check_permission(category) {
            Ok(status) => status,
            Err(e) => {
                error!("Failed to check {}: {:?}", category, e);
                GrantStatus::Denied
            }
        }
    }
}

impl<P: PermissionPlatform> LifecycleHooks for PermissionGate<P> {
    fn on_start(&mut self) -> Result<()> {
        self.on_activate();
        Ok(())
    }

    fn on_permission_result(
        &mut self,
        tag: i32,
        categories: &[PermissionCategory],
        results: &[GrantStatus],
    ) {
        PermissionGate::on_permission_result(self, tag, categories, results);
    }
}
