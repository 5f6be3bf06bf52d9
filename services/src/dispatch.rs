// Copyright (C) 2024 Huawei Device Co., Ltd.
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

//! Launch dispatch.
//!
//! Resolves a request to launch a web-app package to the launcher slot
//! bound to it, allocating one on first launch, and hands the slot's launch
//! target to the platform.

use std::sync::Arc;

use crate::allocator::{Slot, WebAppAllocator};
use crate::error::{ErrorCode, ServiceError};

/// A request to launch a web app.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Package carrying the web app.
    pub package_name: String,
    /// Icon URI forwarded to the launcher activity.
    pub icon_uri: Option<String>,
}

impl LaunchRequest {
    /// Creates a request without icon.
    pub fn new(package_name: &str) -> Self {
        Self {
            package_name: package_name.to_string(),
            icon_uri: None,
        }
    }
}

/// Where and how a launch is delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchTarget {
    /// Slot of the web app.
    pub slot: Slot,
    /// Package carrying the web app.
    pub package_name: String,
    /// Launcher activity class of the slot.
    pub class_name: String,
    /// Intent action of the slot.
    pub action: String,
    /// Icon URI forwarded from the request.
    pub icon_uri: Option<String>,
    /// Whether the slot was bound by this launch.
    pub first_launch: bool,
}

/// Starts launcher activities.
#[cfg_attr(test, mockall::automock)]
pub trait Launcher: Send + Sync {
    /// Starts the activity described by `target`.
    fn launch(&self, target: &LaunchTarget) -> Result<(), ServiceError>;
}

/// Routes launch requests to launcher slots.
pub struct WebAppDispatcher {
    allocator: Arc<WebAppAllocator>,
    launcher: Arc<dyn Launcher>,
    host_package: String,
}

impl WebAppDispatcher {
    /// Creates a dispatcher launching activities of `host_package`.
    pub fn new(
        allocator: Arc<WebAppAllocator>,
        launcher: Arc<dyn Launcher>,
        host_package: &str,
    ) -> Self {
        Self {
            allocator,
            launcher,
            host_package: host_package.to_string(),
        }
    }

    /// Launches the web app of `request` in its slot.
    ///
    /// # Returns
    ///
    /// The slot and whether it was bound by this launch.
    ///
    /// # Errors
    ///
    /// * `InvalidIdentity` if the package name is empty.
    /// * `SlotExhausted` if the app has no slot and none is free.
    /// * Any error of the [`Launcher`].
    pub fn dispatch(&self, request: &LaunchRequest) -> Result<(Slot, bool), ServiceError> {
        let package_name = request.package_name.as_str();
        if package_name.is_empty() {
            error!("launch request without package name");
            return Err(ErrorCode::InvalidIdentity.into());
        }
        let (slot, first_launch) = match self.allocator.find_index_for_identity(package_name) {
            Some(slot) => (slot, false),
            None => {
                let allocation = cvt_res_error!(
                    self.allocator.find_or_allocate(package_name, package_name, None),
                    "Launch {}: no slot available",
                    package_name
                );
                (allocation.slot, allocation.newly_allocated)
            }
        };

        let target = LaunchTarget {
            slot,
            package_name: package_name.to_string(),
            class_name: slot.class_name(&self.host_package),
            action: slot.action(&self.host_package),
            icon_uri: request.icon_uri.clone(),
            first_launch,
        };
        info!(
            "Launch {} in slot {}{}",
            package_name,
            slot,
            if first_launch { " (first launch)" } else { "" }
        );
        self.launcher.launch(&target)?;
        Ok((slot, first_launch))
    }
}
