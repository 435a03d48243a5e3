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

//! Logging configuration.

use log::LevelFilter;

/// Default logcat tag.
pub const DEFAULT_TAG: &str = "PermissionGate";

/// Configures the logger installed by `init_logging`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Tag attached to every line written to the device log.
    pub tag_on_device: String,
    /// The most verbose level emitted.
    pub max_level: LevelFilter,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { tag_on_device: DEFAULT_TAG.to_string(), max_level: LevelFilter::Info }
    }
}

impl GateConfig {
    pub fn with_tag_on_device(mut self, tag: &str) -> Self {
        self.tag_on_device = tag.to_string();
        self
    }

    pub fn with_max_level(mut self, level: LevelFilter) -> Self {
        self.max_level = level;
        self
    }
}

/// Installs the logger. Only the first call has an effect.
#[cfg(target_os = "android")]
pub fn init_logging(config: &GateConfig) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_tag(config.tag_on_device.as_str())
            .with_max_level(config.max_level),
    );
}

/// Installs the logger. Only the first call has an effect; `RUST_LOG` overrides the configured
/// level.
#[cfg(not(target_os = "android"))]
pub fn init_logging(config: &GateConfig) {
    let env = env_logger::Env::default().default_filter_or(config.max_level.as_str());
    let _ = env_logger::Builder::from_env(env).try_init();
}
