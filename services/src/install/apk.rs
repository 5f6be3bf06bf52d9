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

//! Web-app resources bundled in a package.

use std::path::Path;

use serde_json::Value;

use crate::bridge::events::InstallRequest;
use crate::error::{ErrorCode, ServiceError};
use crate::registry::{
    PackageManager, WebAppType, MANIFEST_RESOURCE, MINI_MANIFEST_RESOURCE,
};
use crate::utils::Icon;

/// Everything needed to install the web app carried by a package.
#[derive(Clone, Debug)]
pub struct ApkResources {
    package_name: String,
    app_name: String,
    app_type: WebAppType,
    manifest_url: String,
    manifest: String,
    mini_manifest: Option<String>,
    icon: Option<Icon>,
}

impl ApkResources {
    /// Reads the web-app declaration and resources of `package_name`.
    ///
    /// # Errors
    ///
    /// * `PackageNotFound` if the package is not installed.
    /// * `NotWebApp` if it declares no known kind of web app.
    /// * `MetadataUnavailable` if it lacks a manifest URL.
    /// * Any error reading the `manifest` resource, or `mini` for packaged
    ///   apps.
    pub fn load(
        package_manager: &dyn PackageManager,
        package_name: &str,
    ) -> Result<Self, ServiceError> {
        let info = package_manager.application_info(package_name)?;
        let app_type = info.web_app_type().ok_or_else(|| {
            error!("{} does not declare a web app", package_name);
            ErrorCode::NotWebApp
        })?;
        let manifest_url = info.manifest_url().ok_or_else(|| {
            error!("{} declares no manifest url", package_name);
            ErrorCode::MetadataUnavailable
        })?;
        let manifest = package_manager.read_raw_resource(package_name, MANIFEST_RESOURCE)?;
        let mini_manifest = match app_type {
            WebAppType::Packaged => {
                Some(package_manager.read_raw_resource(package_name, MINI_MANIFEST_RESOURCE)?)
            }
            WebAppType::Hosted => None,
        };
        Ok(Self {
            package_name: package_name.to_string(),
            app_name: info.label.clone(),
            app_type,
            manifest_url: manifest_url.to_string(),
            manifest,
            mini_manifest,
            icon: package_manager.load_icon(package_name),
        })
    }

    /// Package name.
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Package label.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Hosted or packaged.
    pub fn app_type(&self) -> WebAppType {
        self.app_type
    }

    /// Returns `true` for packaged apps.
    pub fn is_packaged(&self) -> bool {
        self.app_type == WebAppType::Packaged
    }

    /// Declared manifest URL.
    pub fn manifest_url(&self) -> &str {
        &self.manifest_url
    }

    /// Raw manifest.
    pub fn manifest(&self) -> &str {
        &self.manifest
    }

    /// Raw mini manifest of a packaged app.
    pub fn mini_manifest(&self) -> Option<&str> {
        self.mini_manifest.as_deref()
    }

    /// Package logo.
    pub fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref()
    }

    pub(crate) fn install_request(
        &self,
        profile_path: Option<&Path>,
    ) -> Result<InstallRequest, ServiceError> {
        let manifest: Value = serde_json::from_str(&self.manifest)?;
        let update_manifest = match self.mini_manifest.as_deref() {
            Some(mini) => Some(serde_json::from_str(mini)?),
            None => None,
        };
        Ok(InstallRequest {
            package_name: self.package_name.clone(),
            manifest_url: self.manifest_url.clone(),
            title: self.app_name.clone(),
            app_type: self.app_type,
            manifest,
            update_manifest,
            profile_path: profile_path.map(|path| path.to_string_lossy().into_owned()),
        })
    }
}
