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

//! Bridge message names and payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::WebAppType;

/// Asks the engine to install a hosted web app.
pub const AUTO_INSTALL: &str = "Webapps:AutoInstall";
/// Asks the engine to install a packaged web app.
pub const AUTO_INSTALL_PACKAGE: &str = "Webapps:AutoInstallPackage";
/// Reports a finished installation.
pub const APP_INSTALLED: &str = "Webapps:AppInstalled";
/// Asks the engine to launch an installed web app.
pub const LAUNCH_FROM_JAVA: &str = "Webapps:LaunchFromJava";
/// Reports a web-app package added to the registry.
pub const APP_ADDED: &str = "SynthAPK:AppAdded";
/// Reports a web-app package removed from the registry.
pub const APP_REMOVED: &str = "SynthAPK:AppRemoved";
/// Asks the engine to install a packaged app from its package.
pub const INSTALL_APK_PACKAGED_APP: &str = "WebApps:InstallApkPackagedApp";
/// Sent by the engine once an installation finished.
pub const POST_INSTALL: &str = "WebApps:PostInstall";

/// Install request sent for a web-app package.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallRequest {
    /// Package carrying the web app.
    pub package_name: String,
    /// Manifest URL declared by the package.
    pub manifest_url: String,
    /// Label of the package.
    pub title: String,
    /// Hosted or packaged.
    #[serde(rename = "type")]
    pub app_type: WebAppType,
    /// The bundled manifest.
    pub manifest: Value,
    /// The bundled mini manifest of a packaged app.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_manifest: Option<Value>,
    /// Engine profile to install into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<String>,
}

/// Completion message received once the engine installed an app.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PostInstall {
    /// Web origin of the installed app.
    #[serde(default)]
    pub origin: String,
    /// Manifest URL of the installed app.
    #[serde(rename = "manifestURL", default)]
    pub manifest_url: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Icon, possibly a `data:` URI.
    #[serde(rename = "iconURL", default)]
    pub icon_url: Option<String>,
    /// Origin before the engine rewrote it, for packaged apps.
    #[serde(rename = "originalOrigin", default)]
    pub original_origin: Option<String>,
}

/// Installation report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInstalled {
    /// Manifest URL of the installed app.
    pub manifest_url: String,
}

/// Launch request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaunchApp {
    /// Manifest URL of the app to launch.
    pub url: String,
    /// Display name.
    pub name: String,
}

/// Packaged-app install request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagedRun {
    /// Origin the packaged app is served from.
    pub origin_url: String,
    /// Package carrying the app.
    pub package_name: String,
    /// Content authority the engine reads the package from.
    pub authority: String,
}

/// A typed outbound bridge message.
#[derive(Clone, Debug, PartialEq)]
pub enum BridgeEvent {
    /// Hosted app install request.
    AutoInstall(InstallRequest),
    /// Packaged app install request.
    AutoInstallPackage(InstallRequest),
    /// Installation report.
    AppInstalled(AppInstalled),
    /// Launch request.
    LaunchFromJava(LaunchApp),
    /// Registry gained or refreshed a package; carries its manifest URL.
    AppAdded(String),
    /// Registry dropped a package; carries its package name.
    AppRemoved(String),
    /// Packaged-app install request.
    InstallApkPackagedApp(PackagedRun),
}

impl BridgeEvent {
    /// Returns the message name.
    pub fn name(&self) -> &'static str {
        match self {
            BridgeEvent::AutoInstall(_) => AUTO_INSTALL,
            BridgeEvent::AutoInstallPackage(_) => AUTO_INSTALL_PACKAGE,
            BridgeEvent::AppInstalled(_) => APP_INSTALLED,
            BridgeEvent::LaunchFromJava(_) => LAUNCH_FROM_JAVA,
            BridgeEvent::AppAdded(_) => APP_ADDED,
            BridgeEvent::AppRemoved(_) => APP_REMOVED,
            BridgeEvent::InstallApkPackagedApp(_) => INSTALL_APK_PACKAGED_APP,
        }
    }

    /// Returns the JSON payload.
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            BridgeEvent::AutoInstall(request) | BridgeEvent::AutoInstallPackage(request) => {
                serde_json::to_value(request)
            }
            BridgeEvent::AppInstalled(installed) => serde_json::to_value(installed),
            BridgeEvent::LaunchFromJava(launch) => serde_json::to_value(launch),
            BridgeEvent::AppAdded(manifest_url) => Ok(Value::String(manifest_url.clone())),
            BridgeEvent::AppRemoved(package_name) => Ok(Value::String(package_name.clone())),
            BridgeEvent::InstallApkPackagedApp(run) => serde_json::to_value(run),
        }
    }
}
