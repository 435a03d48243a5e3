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

//! Requests, outcomes and the per-group grant state the gate tracks between activation and the
//! platform callback.

use crate::common::{GrantStatus, PermissionCategory, PermissionGroup};

/// A pending query issued to the platform.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PermissionRequest {
    /// The tag correlating the request with its result.
    pub request_id: i32,
    /// Categories in the order they were sent.
    pub categories: Vec<PermissionCategory>,
}

impl PermissionRequest {
    pub fn for_group(group: PermissionGroup) -> Self {
        Self { request_id: group.tag(), categories: group.categories().to_vec() }
    }
}

/// The result of a completed request. Not persisted.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PermissionOutcome {
    pub request_id: i32,
    /// Grant flag of each requested category. Categories without a result are not granted.
    pub grants: Vec<(PermissionCategory, bool)>,
}

impl PermissionOutcome {
    /// Pairs `results[i]` with the i-th category of `group`.
    ///
    /// An empty `results` means the prompt was dismissed without a decision, which yields an
    /// outcome where nothing is granted.
    pub fn from_results(group: PermissionGroup, results: &[GrantStatus]) -> Self {
        let grants = group
            .categories()
            .iter()
            .enumerate()
            .map(|(i, category)| {
                (*category, results.get(i).is_some_and(|status| status.is_granted()))
            })
            .collect();
        Self { request_id: group.tag(), grants }
    }

    /// Whether the group was granted. Only the first result decides.
    pub fn is_granted(&self) -> bool {
        self.grants.first().is_some_and(|(_, granted)| *granted)
    }

    /// Returns the grant flag of a single category.
    pub fn is_category_granted(&self, category: PermissionCategory) -> bool {
        self.grants.iter().any(|(c, granted)| *c == category && *granted)
    }
}

/// Where a group stands in the current activation cycle.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum GrantState {
    /// Nothing is known yet in this cycle.
    #[default]
    Unknown,
    /// The platform reported the group as granted, so no request was issued.
    AlreadyGranted,
    /// A request is outstanding.
    Pending,
    /// The user granted the request.
    Granted,
    /// The user denied or dismissed the request.
    Denied,
}

impl GrantState {
    pub fn is_granted(self) -> bool {
        matches!(self, GrantState::AlreadyGranted | GrantState::Granted)
    }

    /// Whether a result has already been recorded for this cycle.
    pub fn is_resolved(self) -> bool {
        matches!(self, GrantState::Granted | GrantState::Denied)
    }
}
