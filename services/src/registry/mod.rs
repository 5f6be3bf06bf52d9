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

//! Registry of installed web-app packages.
//!
//! The registry maps each installed package that declares a web app to the
//! manifest URL it declares, in the `webAppRegistry` store. It is kept in
//! step with the package manager by a full [`reconcile`] pass at startup and
//! by package added / removed notifications afterwards. Every change is
//! reported to the engine with `SynthAPK:AppAdded` or `SynthAPK:AppRemoved`.
//!
//! The registry is independent of launcher slot bindings.
//!
//! [`reconcile`]: WebAppRegistry::reconcile

mod package;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

pub use package::{
    ApplicationInfo, PackageManager, WebAppType, MANIFEST_RESOURCE, META_MANIFEST_URL,
    META_ORIGIN_URL, META_WEBAPP, MINI_MANIFEST_RESOURCE,
};
cfg_test! {
    pub use package::MockPackageManager;
}
use webapp_prefs::{Editor, PrefValue, PreferenceStore};

use crate::bridge::{Bridge, BridgeEvent};
use crate::error::{ErrorCode, ServiceError};

/// Outcome of a [`reconcile`] pass.
///
/// [`reconcile`]: WebAppRegistry::reconcile
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Packages whose entry was created or refreshed.
    pub added: Vec<String>,
    /// Packages whose entry was removed.
    pub removed: Vec<String>,
    /// Web-app packages skipped for missing metadata.
    pub skipped: Vec<String>,
    /// Number of entries already up to date.
    pub unchanged: usize,
}

impl ReconcileReport {
    /// Returns `true` if the pass changed nothing.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// The installed web-app registry.
pub struct WebAppRegistry {
    prefs: PreferenceStore,
    bridge: Arc<dyn Bridge>,
}

impl WebAppRegistry {
    /// Creates a registry over the `webAppRegistry` store.
    pub fn new(prefs: PreferenceStore, bridge: Arc<dyn Bridge>) -> Self {
        Self { prefs, bridge }
    }

    /// Returns every entry, package name to manifest URL.
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.prefs
            .all()
            .into_iter()
            .filter_map(|(package, value)| match value {
                PrefValue::String(url) => Some((package, url)),
                PrefValue::Int(_) => None,
            })
            .collect()
    }

    /// Returns the manifest URL registered for `package_name`.
    pub fn manifest_url(&self, package_name: &str) -> Option<String> {
        self.prefs.get_string(package_name)
    }

    /// Returns `true` if `package_name` is registered.
    pub fn contains(&self, package_name: &str) -> bool {
        self.prefs.contains(package_name)
    }

    /// Brings the registry in line with the installed packages.
    ///
    /// Web-app packages with a manifest URL get an entry, web-app packages
    /// without one are skipped, and entries of every other package are
    /// dropped. All edits are committed together before any event is sent.
    ///
    /// # Errors
    ///
    /// Fails if the package list cannot be read or the store cannot be
    /// written; the registry is then unchanged.
    pub fn reconcile(
        &self,
        package_manager: &dyn PackageManager,
    ) -> Result<ReconcileReport, ServiceError> {
        let start = Instant::now();
        let current = self.entries();
        let installed = cvt_res_error!(
            package_manager.installed_applications(),
            "Reconcile registry: cannot list installed packages"
        );

        let mut report = ReconcileReport::default();
        let mut present = HashSet::new();
        let mut editor = self.prefs.edit();
        let mut events = Vec::new();

        for info in installed.iter().filter(|info| info.is_web_app()) {
            let Some(manifest_url) = info.manifest_url() else {
                warn!(
                    "{} declares a web app without a manifest url",
                    info.package_name
                );
                report.skipped.push(info.package_name.clone());
                continue;
            };
            present.insert(info.package_name.as_str());
            if current.get(&info.package_name).map(String::as_str) == Some(manifest_url) {
                report.unchanged += 1;
                continue;
            }
            editor.put_string(&info.package_name, manifest_url);
            events.push(BridgeEvent::AppAdded(manifest_url.to_string()));
            report.added.push(info.package_name.clone());
        }

        for package_name in current.keys() {
            if !present.contains(package_name.as_str()) {
                editor.remove(package_name);
                events.push(BridgeEvent::AppRemoved(package_name.clone()));
                report.removed.push(package_name.clone());
            }
        }

        editor.commit()?;
        for event in events.iter() {
            self.bridge.send_event(event);
        }
        info!(
            "Reconcile registry took {} ms: {} added, {} removed, {} skipped",
            start.elapsed().as_millis(),
            report.added.len(),
            report.removed.len(),
            report.skipped.len()
        );
        self.log();
        Ok(report)
    }

    /// Records `info` in the registry.
    ///
    /// An identical entry is left alone. A new or changed manifest URL is
    /// written and announced. A web app without a manifest URL loses its
    /// entry.
    ///
    /// # Returns
    ///
    /// `true` if the registry changed.
    ///
    /// # Errors
    ///
    /// `NotWebApp` if the package declares no web app.
    pub fn register_app(&self, info: &ApplicationInfo) -> Result<bool, ServiceError> {
        if !info.is_web_app() {
            return Err(ErrorCode::NotWebApp.into());
        }
        let mut editor = self.prefs.edit();
        let Some(event) = self.stage(&mut editor, info) else {
            return Ok(false);
        };
        editor.commit()?;
        self.bridge.send_event(&event);
        Ok(true)
    }

    /// Drops the entry of `package_name`.
    ///
    /// # Returns
    ///
    /// `true` if an entry existed.
    pub fn unregister_app(&self, package_name: &str) -> Result<bool, ServiceError> {
        if !self.contains(package_name) {
            debug!("{} is not a registered web app", package_name);
            return Ok(false);
        }
        self.prefs.edit().remove(package_name).commit()?;
        info!("unregistered web app {}", package_name);
        self.bridge
            .send_event(&BridgeEvent::AppRemoved(package_name.to_string()));
        Ok(true)
    }

    /// Handles a package added notification.
    ///
    /// Unknown packages and packages without a web app are logged and left
    /// out.
    pub fn add_apk(
        &self,
        package_manager: &dyn PackageManager,
        package_name: &str,
    ) -> Result<bool, ServiceError> {
        let info = match package_manager.application_info(package_name) {
            Ok(info) => info,
            Err(e) if e.code() == ErrorCode::PackageNotFound => {
                warn!("added package {} not found", package_name);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        if !info.is_web_app() {
            debug!("added package {} is not a web app", package_name);
            return Ok(false);
        }
        self.register_app(&info)
    }

    /// Handles a package removed notification.
    pub fn remove_apk(&self, package_name: &str) -> Result<bool, ServiceError> {
        self.unregister_app(package_name)
    }

    /// Logs every registered package.
    pub fn log(&self) {
        let entries = self.entries();
        info!("{} web apps registered", entries.len());
        for (package_name, manifest_url) in entries.iter() {
            debug!("  {} -> {}", package_name, manifest_url);
        }
    }

    fn stage(&self, editor: &mut Editor, info: &ApplicationInfo) -> Option<BridgeEvent> {
        let package_name = info.package_name.as_str();
        let current = self.manifest_url(package_name);
        match info.manifest_url() {
            Some(url) if current.as_deref() == Some(url) => None,
            Some(url) => {
                info!("registered web app {} from {}", package_name, url);
                editor.put_string(package_name, url);
                Some(BridgeEvent::AppAdded(url.to_string()))
            }
            None => {
                warn!("{} declares a web app without a manifest url", package_name);
                current.map(|_| {
                    editor.remove(package_name);
                    BridgeEvent::AppRemoved(package_name.to_string())
                })
            }
        }
    }
}
