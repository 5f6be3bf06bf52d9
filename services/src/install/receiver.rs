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

//! Package added / removed notifications.

use std::sync::Arc;

use crate::allocator::WebAppAllocator;
use crate::registry::{PackageManager, WebAppRegistry};

/// Keeps the registry and slot bindings in step with package changes.
pub struct PackageReceiver {
    registry: Arc<WebAppRegistry>,
    allocator: Arc<WebAppAllocator>,
    package_manager: Arc<dyn PackageManager>,
}

impl PackageReceiver {
    /// Creates a receiver.
    pub fn new(
        registry: Arc<WebAppRegistry>,
        allocator: Arc<WebAppAllocator>,
        package_manager: Arc<dyn PackageManager>,
    ) -> Self {
        Self {
            registry,
            allocator,
            package_manager,
        }
    }

    /// Handles a package added broadcast.
    ///
    /// # Returns
    ///
    /// `true` if the registry changed.
    pub fn on_package_added(&self, package_name: &str) -> bool {
        if package_name.is_empty() {
            warn!("package added without a package name");
            return false;
        }
        match self
            .registry
            .add_apk(self.package_manager.as_ref(), package_name)
        {
            Ok(changed) => changed,
            Err(e) => {
                error!("register added package {} failed: {}", package_name, e);
                false
            }
        }
    }

    /// Handles a package removed broadcast.
    ///
    /// Drops the registry entry and releases the package's launcher slot in
    /// the background.
    ///
    /// # Returns
    ///
    /// `true` if the registry changed.
    pub fn on_package_removed(&self, package_name: &str) -> bool {
        if package_name.is_empty() {
            warn!("package removed without a package name");
            return false;
        }
        if let Some((slot, _)) = self.allocator.release_by_identity(package_name) {
            info!("removed package {} frees slot {}", package_name, slot);
        }
        match self.registry.remove_apk(package_name) {
            Ok(changed) => changed,
            Err(e) => {
                error!("unregister removed package {} failed: {}", package_name, e);
                false
            }
        }
    }
}
