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

#[cfg(test)]
mod permission_gate_tests {
    use anyhow::Result;
    use permission_gate::{
        ActivityRequest, GateActivity, GrantState, GrantStatus, PermissionCategory, PermissionGate,
        PermissionGroup, PermissionPlatform, PermissionRequest,
    };
    use permission_gate::task::{Handler, SharedHandler};
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex, OnceLock, Weak};
    use std::thread;
    use std::time::Duration;

    const POLL_TIMEOUT: Duration = Duration::from_secs(5);

    /// Platform double whose grants can be changed while the gate owns it.
    #[derive(Clone, Default)]
    struct FakePlatform {
        granted: Arc<Mutex<HashSet<PermissionCategory>>>,
        requests: Arc<Mutex<Vec<(i32, Vec<PermissionCategory>)>>>,
    }

    impl FakePlatform {
        fn with_granted(categories: &[PermissionCategory]) -> Self {
            let platform = Self::default();
            platform.granted.lock().unwrap().extend(categories.iter().copied());
            platform
        }

        fn requests(&self) -> Vec<(i32, Vec<PermissionCategory>)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl PermissionPlatform for FakePlatform {
        fn check_permission(&self, category: PermissionCategory) -> Result<GrantStatus> {
            Ok(if self.granted.lock().unwrap().contains(&category) {
                GrantStatus::Granted
            } else {
                GrantStatus::Denied
            })
        }

        fn request_permissions(
            &mut self,
            tag: i32,
            categories: &[PermissionCategory],
        ) -> Result<()> {
            self.requests.lock().unwrap().push((tag, categories.to_vec()));
            Ok(())
        }
    }

    fn camera_request() -> (i32, Vec<PermissionCategory>) {
        (1, vec![PermissionCategory::Camera])
    }

    fn storage_request() -> (i32, Vec<PermissionCategory>) {
        (2, vec![PermissionCategory::StorageWrite, PermissionCategory::StorageRead])
    }

    #[test]
    fn test_granted_categories_are_not_requested() {
        let _ = env_logger::try_init();
        let platform = FakePlatform::with_granted(&PermissionCategory::ALL);
        let mut gate = PermissionGate::new(platform.clone());

        assert!(gate.on_activate().is_empty());
        assert!(platform.requests().is_empty());
        assert_eq!(gate.state(PermissionGroup::Camera), GrantState::AlreadyGranted);
        assert!(gate.is_granted(PermissionGroup::Storage));
    }

    #[test]
    fn test_missing_categories_are_requested_once_each() {
        let _ = env_logger::try_init();
        let platform = FakePlatform::default();
        let mut gate = PermissionGate::new(platform.clone());

        let issued = gate.on_activate();
        assert_eq!(
            issued,
            vec![
                PermissionRequest::for_group(PermissionGroup::Camera),
                PermissionRequest::for_group(PermissionGroup::Storage),
            ]
        );
        assert_eq!(platform.requests(), vec![camera_request(), storage_request()]);
        assert_eq!(gate.state(PermissionGroup::Camera), GrantState::Pending);
        assert_eq!(gate.state(PermissionGroup::Storage), GrantState::Pending);
    }

    #[test]
    fn test_storage_status_follows_the_write_permission() {
        let _ = env_logger::try_init();
        let platform = FakePlatform::with_granted(&[
            PermissionCategory::Camera,
            PermissionCategory::StorageRead,
        ]);
        let mut gate = PermissionGate::new(platform.clone());

        gate.on_activate();
        assert_eq!(platform.requests(), vec![storage_request()]);
    }

    #[test]
    fn test_camera_grant() {
        let _ = env_logger::try_init();
        let mut gate = PermissionGate::new(FakePlatform::default());
        gate.on_activate();

        let outcome = gate
            .on_permission_result(1, &[PermissionCategory::Camera], &[GrantStatus::Granted])
            .expect("camera outcome");
        assert!(outcome.is_granted());
        assert_eq!(gate.state(PermissionGroup::Camera), GrantState::Granted);
        assert!(gate.outstanding(PermissionGroup::Camera).is_none());
        assert_eq!(gate.outcome(PermissionGroup::Camera), Some(&outcome));
        // The storage result is still owed.
        assert!(gate.outstanding(PermissionGroup::Storage).is_some());
    }

    #[test]
    fn test_dismissed_prompt_is_not_granted() {
        let _ = env_logger::try_init();
        let mut gate = PermissionGate::new(FakePlatform::default());
        gate.on_activate();

        let outcome = gate.on_permission_result(1, &[], &[]).expect("camera outcome");
        assert!(!outcome.is_granted());
        assert_eq!(gate.state(PermissionGroup::Camera), GrantState::Denied);
    }

    #[test]
    fn test_unknown_tag_is_ignored() {
        let _ = env_logger::try_init();
        let mut gate = PermissionGate::new(FakePlatform::default());
        gate.on_activate();

        assert!(gate.on_permission_result(42, &[], &[GrantStatus::Granted]).is_none());
        assert!(gate.on_permission_result(-1, &[], &[]).is_none());
        assert_eq!(gate.state(PermissionGroup::Camera), GrantState::Pending);
        assert_eq!(gate.state(PermissionGroup::Storage), GrantState::Pending);
    }

    #[test]
    fn test_results_arrive_in_any_order() {
        let _ = env_logger::try_init();
        let mut gate = PermissionGate::new(FakePlatform::default());
        gate.on_activate();

        gate.on_permission_result(
            2,
            &[PermissionCategory::StorageWrite, PermissionCategory::StorageRead],
            &[GrantStatus::Granted, GrantStatus::Granted],
        );
        gate.on_permission_result(1, &[PermissionCategory::Camera], &[GrantStatus::Denied]);

        assert!(gate.is_granted(PermissionGroup::Storage));
        assert!(!gate.is_granted(PermissionGroup::Camera));
    }

    #[test]
    fn test_activation_is_not_memoized() {
        let _ = env_logger::try_init();
        let platform = FakePlatform::with_granted(&[PermissionCategory::StorageWrite]);
        let mut gate = PermissionGate::new(platform.clone());

        gate.on_activate();
        gate.on_activate();
        assert_eq!(platform.requests(), vec![camera_request(), camera_request()]);

        // The user granted the camera in the system settings between two foreground transitions.
        platform.granted.lock().unwrap().insert(PermissionCategory::Camera);
        assert!(gate.on_activate().is_empty());
        assert_eq!(platform.requests().len(), 2);
        assert_eq!(gate.state(PermissionGroup::Camera), GrantState::AlreadyGranted);
    }

    #[test]
    fn test_camera_denied_storage_granted_scenario() {
        let _ = env_logger::try_init();
        let platform = FakePlatform::with_granted(&[
            PermissionCategory::StorageWrite,
            PermissionCategory::StorageRead,
        ]);
        let mut gate = PermissionGate::new(platform.clone());

        let issued = gate.on_activate();
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0].request_id, 1);
        assert_eq!(issued[0].categories, vec![PermissionCategory::Camera]);
        assert_eq!(platform.requests(), vec![camera_request()]);

        let outcome =
            gate.on_permission_result(1, &[PermissionCategory::Camera], &[GrantStatus::Denied]);
        assert!(!outcome.expect("camera outcome").is_granted());
        assert!(!gate.is_granted(PermissionGroup::Camera));
        assert!(gate.is_granted(PermissionGroup::Storage));
    }

    #[test]
    fn test_results_delivered_from_another_thread() {
        let _ = env_logger::try_init();
        let platform = FakePlatform::default();
        let activity = GateActivity::new((), PermissionGate::new(platform.clone()));
        let mut handler = Handler::new(activity).expect("Failed to create the handler");
        let sender = handler.get_sender().expect("Failed to get a sender");

        sender.send(ActivityRequest::Start).unwrap();
        assert_eq!(handler.poll_once(Some(POLL_TIMEOUT)).unwrap(), 1);
        assert_eq!(platform.requests(), vec![camera_request(), storage_request()]);

        thread::spawn(move || {
            sender
                .send(ActivityRequest::PermissionResult {
                    tag: 2,
                    categories: vec![PermissionCategory::StorageWrite],
                    results: vec![GrantStatus::Granted, GrantStatus::Denied],
                })
                .unwrap();
            sender
                .send(ActivityRequest::PermissionResult {
                    tag: 1,
                    categories: vec![PermissionCategory::Camera],
                    results: vec![],
                })
                .unwrap();
        })
        .join()
        .unwrap();

        let mut handled = 0;
        while handled < 2 {
            handled += handler.poll_once(Some(POLL_TIMEOUT)).unwrap();
        }
        let gate = handler.callback().hooks();
        assert_eq!(gate.state(PermissionGroup::Storage), GrantState::Granted);
        assert_eq!(gate.state(PermissionGroup::Camera), GrantState::Denied);
        let storage = gate.outcome(PermissionGroup::Storage).expect("storage outcome");
        assert!(!storage.is_category_granted(PermissionCategory::StorageRead));
    }

    #[test]
    fn test_stale_result_after_a_new_cycle_is_ignored() {
        let _ = env_logger::try_init();
        let platform = FakePlatform::with_granted(&[PermissionCategory::StorageWrite]);
        let mut gate = PermissionGate::new(platform.clone());

        gate.on_activate();
        assert_eq!(gate.state(PermissionGroup::Camera), GrantState::Pending);

        // The user granted the camera from the system settings while the prompt was pending.
        platform.granted.lock().unwrap().insert(PermissionCategory::Camera);
        assert!(gate.on_activate().is_empty());
        assert!(gate.outstanding(PermissionGroup::Camera).is_none());

        // The prompt of the first cycle is finally dismissed.
        assert!(gate.on_permission_result(1, &[], &[]).is_none());
        assert_eq!(gate.state(PermissionGroup::Camera), GrantState::AlreadyGranted);
        assert!(gate.is_granted(PermissionGroup::Camera));
    }

    type SyncGate = SharedHandler<ActivityRequest, GateActivity<(), PermissionGate<SyncPlatform>>>;

    /// Platform that cancels the storage request before returning from it, like a platform that
    /// refuses a second prompt while the first one is showing.
    struct SyncPlatform {
        gate: Arc<OnceLock<Weak<SyncGate>>>,
        requests: Arc<Mutex<Vec<i32>>>,
    }

    impl PermissionPlatform for SyncPlatform {
        fn check_permission(&self, _category: PermissionCategory) -> Result<GrantStatus> {
            Ok(GrantStatus::Denied)
        }

        fn request_permissions(
            &mut self,
            tag: i32,
            _categories: &[PermissionCategory],
        ) -> Result<()> {
            self.requests.lock().unwrap().push(tag);
            if tag == PermissionGroup::Storage.tag() {
                let gate = self.gate.get().and_then(Weak::upgrade).expect("gate is bound");
                let handled = gate.dispatch(ActivityRequest::PermissionResult {
                    tag,
                    categories: vec![],
                    results: vec![],
                })?;
                assert_eq!(handled, 0, "a busy gate must defer the result");
            }
            Ok(())
        }
    }

    #[test]
    fn test_result_delivered_during_the_request() {
        let _ = env_logger::try_init();
        let slot = Arc::new(OnceLock::new());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let platform = SyncPlatform { gate: slot.clone(), requests: requests.clone() };
        let gate = Arc::new(
            SharedHandler::new(GateActivity::new((), PermissionGate::new(platform)))
                .expect("Failed to create the gate"),
        );
        assert!(slot.set(Arc::downgrade(&gate)).is_ok());

        // The start and the cancellation it triggered are both handled by this call.
        assert_eq!(gate.dispatch(ActivityRequest::Start).unwrap(), 2);
        assert_eq!(*requests.lock().unwrap(), vec![1, 2]);

        let (camera, storage) = gate
            .with_callback(|activity| {
                let gate = activity.hooks();
                (gate.state(PermissionGroup::Camera), gate.state(PermissionGroup::Storage))
            })
            .expect("the gate is idle");
        assert_eq!(camera, GrantState::Pending);
        assert_eq!(storage, GrantState::Denied);

        gate.dispatch(ActivityRequest::PermissionResult {
            tag: 1,
            categories: vec![PermissionCategory::Camera],
            results: vec![GrantStatus::Granted],
        })
        .unwrap();
        assert_eq!(
            gate.with_callback(|activity| activity.hooks().is_granted(PermissionGroup::Camera)),
            Some(true)
        );
    }
}
