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

//! Platform view of installed packages.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::utils::Icon;

/// Metadata key declaring a web app and its kind.
pub const META_WEBAPP: &str = "webapp";
/// Metadata key holding the manifest URL.
pub const META_MANIFEST_URL: &str = "manifestUrl";
/// Metadata key holding the origin of a packaged app.
pub const META_ORIGIN_URL: &str = "originUrl";

/// Raw resource holding the app manifest.
pub const MANIFEST_RESOURCE: &str = "manifest";
/// Raw resource holding the mini manifest of a packaged app.
pub const MINI_MANIFEST_RESOURCE: &str = "mini";

/// Kind of web app carried by a package.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebAppType {
    /// Served from the web.
    Hosted,
    /// Served from a bundled archive.
    Packaged,
}

impl WebAppType {
    /// Parses the `webapp` metadata value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hosted" => Some(WebAppType::Hosted),
            "packaged" => Some(WebAppType::Packaged),
            _ => None,
        }
    }

    /// Returns the metadata value.
    pub fn as_str(self) -> &'static str {
        match self {
            WebAppType::Hosted => "hosted",
            WebAppType::Packaged => "packaged",
        }
    }
}

/// An installed package as reported by the platform.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApplicationInfo {
    /// Package name.
    pub package_name: String,
    /// User visible label.
    pub label: String,
    /// Metadata declared by the package.
    pub metadata: HashMap<String, String>,
}

impl ApplicationInfo {
    /// Creates a package without metadata.
    pub fn new(package_name: &str, label: &str) -> Self {
        Self {
            package_name: package_name.to_string(),
            label: label.to_string(),
            metadata: HashMap::new(),
        }
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    /// Returns `true` if the package declares a web app of any kind.
    pub fn is_web_app(&self) -> bool {
        self.metadata.contains_key(META_WEBAPP)
    }

    /// Returns the declared web-app kind, `None` if absent or unknown.
    pub fn web_app_type(&self) -> Option<WebAppType> {
        self.metadata
            .get(META_WEBAPP)
            .and_then(|value| WebAppType::parse(value))
    }

    /// Returns the declared manifest URL, ignoring empty values.
    pub fn manifest_url(&self) -> Option<&str> {
        self.non_empty(META_MANIFEST_URL)
    }

    /// Returns the declared origin URL, ignoring empty values.
    pub fn origin_url(&self) -> Option<&str> {
        self.non_empty(META_ORIGIN_URL)
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Access to the platform package manager.
#[cfg_attr(test, mockall::automock)]
pub trait PackageManager: Send + Sync {
    /// Lists every installed package.
    fn installed_applications(&self) -> Result<Vec<ApplicationInfo>, ServiceError>;

    /// Looks up one package, `PackageNotFound` if it is not installed.
    fn application_info(&self, package_name: &str) -> Result<ApplicationInfo, ServiceError>;

    /// Reads the raw resource `name` bundled in the package.
    fn read_raw_resource(&self, package_name: &str, name: &str) -> Result<String, ServiceError>;

    /// Loads the package logo.
    fn load_icon(&self, package_name: &str) -> Option<Icon>;
}
