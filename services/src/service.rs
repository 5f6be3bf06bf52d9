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

//! Service composition root.

use std::sync::Arc;

use webapp_prefs::PreferenceStore;

use crate::allocator::WebAppAllocator;
use crate::bridge::events::PackagedRun;
use crate::bridge::Bridge;
use crate::config::WebAppConfig;
use crate::dispatch::{LaunchRequest, Launcher, WebAppDispatcher};
use crate::error::ServiceError;
use crate::install::{
    request_packaged_run, ApkResources, InstallCallback, InstallHelper, PackageReceiver,
};
use crate::registry::{PackageManager, ReconcileReport, WebAppRegistry};
use crate::utils::BackgroundRuntime;
use crate::Slot;

/// The web-app launcher service.
///
/// Owns the slot allocator, the registry and the background runtime, and
/// wires them to the platform through the given bridge, package manager and
/// launcher. Collaborators receive shared handles; there is no global
/// instance.
pub struct WebAppService {
    config: WebAppConfig,
    allocator: Arc<WebAppAllocator>,
    registry: Arc<WebAppRegistry>,
    dispatcher: WebAppDispatcher,
    receiver: PackageReceiver,
    bridge: Arc<dyn Bridge>,
    package_manager: Arc<dyn PackageManager>,
    // Dropped last so pending background work can still finish.
    _runtime: BackgroundRuntime,
}

impl WebAppService {
    /// Opens the stores described by `config` and starts the service.
    ///
    /// # Errors
    ///
    /// Fails if a store cannot be opened or the background threads cannot
    /// be started.
    pub fn init(
        config: WebAppConfig,
        bridge: Arc<dyn Bridge>,
        package_manager: Arc<dyn PackageManager>,
        launcher: Arc<dyn Launcher>,
    ) -> Result<Self, ServiceError> {
        let runtime = cvt_res_error!(
            BackgroundRuntime::new(config.background_workers),
            "WebAppService init: background runtime failed"
        );
        let slots = cvt_res_error!(
            PreferenceStore::open(&config.slot_store),
            "WebAppService init: slot store failed"
        );
        let entries = cvt_res_error!(
            PreferenceStore::open(&config.registry_store),
            "WebAppService init: registry store failed"
        );

        let allocator = Arc::new(WebAppAllocator::new(
            slots,
            config.max_slots,
            runtime.handle(),
        ));
        let registry = Arc::new(WebAppRegistry::new(entries, bridge.clone()));
        let dispatcher =
            WebAppDispatcher::new(allocator.clone(), launcher, &config.host_package);
        let receiver =
            PackageReceiver::new(registry.clone(), allocator.clone(), package_manager.clone());
        info!(
            "WebAppService started with {} slots, {} bound",
            config.max_slots,
            allocator.bindings().len()
        );

        Ok(Self {
            config,
            allocator,
            registry,
            dispatcher,
            receiver,
            bridge,
            package_manager,
            _runtime: runtime,
        })
    }

    /// Configuration the service was started with.
    pub fn config(&self) -> &WebAppConfig {
        &self.config
    }

    /// The slot allocator.
    pub fn allocator(&self) -> &Arc<WebAppAllocator> {
        &self.allocator
    }

    /// The installed web-app registry.
    pub fn registry(&self) -> &Arc<WebAppRegistry> {
        &self.registry
    }

    /// Package added / removed handler.
    pub fn receiver(&self) -> &PackageReceiver {
        &self.receiver
    }

    /// Rebuilds the registry from the installed packages.
    pub fn reconcile(&self) -> Result<ReconcileReport, ServiceError> {
        self.registry.reconcile(self.package_manager.as_ref())
    }

    /// Prepares the installation of the web app carried by `package_name`.
    ///
    /// The returned helper still has to be started.
    pub fn installer(
        &self,
        package_name: &str,
        callback: Option<Arc<dyn InstallCallback>>,
    ) -> Result<Arc<InstallHelper>, ServiceError> {
        let apk = cvt_res_error!(
            ApkResources::load(self.package_manager.as_ref(), package_name),
            "Install {}: package cannot be installed",
            package_name
        );
        Ok(InstallHelper::new(
            apk,
            self.allocator.clone(),
            self.bridge.clone(),
            callback,
        ))
    }

    /// Launches a web app in its slot.
    pub fn dispatch(&self, request: &LaunchRequest) -> Result<(Slot, bool), ServiceError> {
        self.dispatcher.dispatch(request)
    }

    /// Asks the engine to install a packaged app from its package.
    pub fn request_packaged_run(
        &self,
        package_name: &str,
        authority: Option<&str>,
    ) -> Result<PackagedRun, ServiceError> {
        request_packaged_run(
            self.package_manager.as_ref(),
            self.bridge.as_ref(),
            package_name,
            authority,
        )
    }

    /// Rereads slot bindings written by launcher processes.
    pub fn reload(&self) -> Result<(), ServiceError> {
        self.allocator.reload()
    }
}
