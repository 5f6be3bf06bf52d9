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

//! Web-app installation.
//!
//! Installing a web app carried by a package is a handshake with the engine:
//! the [`InstallHelper`] sends the bundled manifest, the engine installs the
//! app into a profile and answers with `WebApps:PostInstall`, and the helper
//! then binds the app to a launcher slot, records its origin and asks the
//! engine to launch it.

mod apk;
mod packaged;
mod receiver;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub use apk::ApkResources;
pub use packaged::request_packaged_run;
pub use receiver::PackageReceiver;
use serde_json::Value;
use webapp_utils::origin::origin_of;

use crate::allocator::{Slot, SlotTransaction, WebAppAllocator, UNKNOWN_COLOR};
use crate::bridge::events::{AppInstalled, LaunchApp, PostInstall, POST_INSTALL};
use crate::bridge::{Bridge, BridgeEvent, BridgeListener};
use crate::error::ServiceError;
use crate::utils::{BackgroundTask, Icon};

/// Name used when the engine reports none.
pub const DEFAULT_APP_NAME: &str = "WebApp";

/// Result of a finished installation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallOutcome {
    /// Package carrying the app.
    pub package_name: String,
    /// Launcher slot the app is bound to.
    pub slot: Slot,
    /// Web origin reported by the engine.
    pub origin: Option<String>,
    /// Manifest URL of the installed app.
    pub manifest_url: String,
    /// Display name.
    pub name: String,
}

/// Notified once an installation finished.
#[cfg_attr(test, mockall::automock)]
pub trait InstallCallback: Send + Sync {
    /// Called once per install with its outcome.
    fn install_completed(&self, outcome: &InstallOutcome);
}

/// Drives the installation of one web-app package.
pub struct InstallHelper {
    apk: ApkResources,
    allocator: Arc<WebAppAllocator>,
    bridge: Arc<dyn Bridge>,
    callback: Option<Arc<dyn InstallCallback>>,
    completed: AtomicBool,
    tasks: Mutex<Vec<BackgroundTask>>,
}

impl InstallHelper {
    /// Creates a helper installing `apk`.
    pub fn new(
        apk: ApkResources,
        allocator: Arc<WebAppAllocator>,
        bridge: Arc<dyn Bridge>,
        callback: Option<Arc<dyn InstallCallback>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            apk,
            allocator,
            bridge,
            callback,
            completed: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Resources of the package being installed.
    pub fn apk(&self) -> &ApkResources {
        &self.apk
    }

    /// Sends the install request and waits for `WebApps:PostInstall`.
    ///
    /// Hosted apps are requested with `Webapps:AutoInstall`, packaged apps
    /// with `Webapps:AutoInstallPackage` carrying their mini manifest. If the
    /// package already owns a slot its logo color is refreshed in the
    /// background.
    ///
    /// # Errors
    ///
    /// Fails if a bundled manifest is not valid JSON; nothing is sent then.
    pub fn start_install(self: &Arc<Self>, profile_path: Option<&Path>) -> Result<(), ServiceError> {
        let request = cvt_res_error!(
            self.apk.install_request(profile_path),
            "Install {}: bundled manifest is not valid json",
            self.apk.package_name()
        );
        let event = if self.apk.is_packaged() {
            BridgeEvent::AutoInstallPackage(request)
        } else {
            BridgeEvent::AutoInstall(request)
        };
        self.bridge.register_listener(POST_INSTALL, self.clone());
        self.bridge.send_event(&event);
        info!("Install {} requested", self.apk.package_name());

        if let Some(icon) = self.apk.icon() {
            match self.allocator.find_index_for_identity(self.apk.package_name()) {
                Some(slot) => self.color_from_icon(slot, icon.clone()),
                None => debug!("{} has no slot yet", self.apk.package_name()),
            }
        }
        Ok(())
    }

    /// Stops waiting for the engine.
    pub fn cancel(&self) {
        if !self.completed.swap(true, Ordering::AcqRel) {
            self.bridge.unregister_listener(POST_INSTALL, self);
            info!("Install {} cancelled", self.apk.package_name());
        }
    }

    /// Returns `true` once the install finished or was cancelled.
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Waits for the icon color updates scheduled by this helper.
    pub fn join_background(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap());
        for task in tasks {
            task.join();
        }
    }

    fn track(&self, task: BackgroundTask) {
        self.tasks.lock().unwrap().push(task);
    }

    fn finish(&self, message: &Value) -> Result<InstallOutcome, ServiceError> {
        let post: PostInstall = serde_json::from_value(message.clone())?;
        let package_name = self.apk.package_name();
        let name = post
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
        let origin = origin_of(&post.origin);
        if origin.is_none() {
            warn!("Install {}: cannot decode origin {:?}", package_name, post.origin);
        }

        let (slot, newly_allocated) = {
            let mut tx = self.allocator.begin();
            let resolved = self.resolve_slot(&mut tx, &post)?;
            if let Some(origin) = origin.as_deref() {
                tx.set_origin(resolved.0, origin)?;
            }
            tx.end()?;
            resolved
        };
        if newly_allocated {
            info!("bound {} ({}) to slot {}", package_name, name, slot);
            if let Some(icon) = self.apk.icon() {
                self.color_from_icon(slot, icon.clone());
            }
        }

        if self.apk.icon().is_none() {
            if let Some(icon_url) = post.icon_url.as_deref() {
                self.color_from_icon_url(slot, icon_url);
            }
        }

        let manifest_url = if post.manifest_url.is_empty() {
            self.apk.manifest_url().to_string()
        } else {
            post.manifest_url
        };
        self.bridge.send_event(&BridgeEvent::AppInstalled(AppInstalled {
            manifest_url: manifest_url.clone(),
        }));
        self.bridge.send_event(&BridgeEvent::LaunchFromJava(LaunchApp {
            url: manifest_url.clone(),
            name: name.clone(),
        }));
        info!("Install {} finished in slot {}", package_name, slot);

        Ok(InstallOutcome {
            package_name: package_name.to_string(),
            slot,
            origin,
            manifest_url,
            name,
        })
    }

    // Identity first, then the slot of the app's original origin, then a
    // free slot.
    fn resolve_slot(
        &self,
        tx: &mut SlotTransaction<'_>,
        post: &PostInstall,
    ) -> Result<(Slot, bool), ServiceError> {
        let package_name = self.apk.package_name();
        if let Some(slot) = tx.find_identity(package_name) {
            return Ok((slot, false));
        }
        let previous = post
            .original_origin
            .as_deref()
            .map(|o| origin_of(o).unwrap_or_else(|| o.to_string()))
            .and_then(|o| tx.find_origin(&o));
        if let Some(slot) = previous {
            info!("{} takes over slot {} of its original origin", package_name, slot);
            tx.set_identity(slot, package_name);
            return Ok((slot, false));
        }
        Ok((tx.allocate(package_name)?, true))
    }

    fn color_from_icon(&self, slot: Slot, icon: Icon) {
        match self.allocator.update_color_async(slot, icon) {
            Ok(task) => self.track(task),
            Err(e) => debug!(
                "Install {}: slot {} color skipped: {}",
                self.apk.package_name(),
                slot,
                e
            ),
        }
    }

    fn color_from_icon_url(&self, slot: Slot, icon_url: &str) {
        if !Icon::is_data_uri(icon_url) || self.allocator.get_color(slot) != UNKNOWN_COLOR {
            return;
        }
        match Icon::from_data_uri(icon_url) {
            Ok(icon) => self.color_from_icon(slot, icon),
            Err(e) => warn!("Install {}: unusable icon: {}", self.apk.package_name(), e),
        }
    }
}

impl BridgeListener for InstallHelper {
    fn handle_message(&self, event: &str, message: &Value) {
        if event != POST_INSTALL {
            return;
        }
        let reported = message.get("manifestURL").and_then(Value::as_str);
        if matches!(reported, Some(url) if !url.is_empty() && url != self.apk.manifest_url()) {
            debug!("PostInstall for another app ignored by {}", self.apk.package_name());
            return;
        }
        if self.completed.swap(true, Ordering::AcqRel) {
            debug!("Duplicate PostInstall for {} ignored", self.apk.package_name());
            return;
        }
        self.bridge.unregister_listener(POST_INSTALL, self);

        match self.finish(message) {
            Ok(outcome) => {
                if let Some(callback) = self.callback.as_ref() {
                    callback.install_completed(&outcome);
                }
            }
            Err(e) => error!("Install {} failed: {}", self.apk.package_name(), e),
        }
    }
}
