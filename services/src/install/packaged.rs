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

//! Running packaged apps straight from their package.

use crate::bridge::events::PackagedRun;
use crate::bridge::{Bridge, BridgeEvent};
use crate::error::{ErrorCode, ServiceError};
use crate::registry::{PackageManager, WebAppType};

/// Asks the engine to install the packaged app carried by `package_name`.
///
/// # Arguments
///
/// * `authority` - Content authority serving the package, defaults to the
///   package name.
///
/// # Errors
///
/// * `PackageNotFound` if the package is not installed.
/// * `NotWebApp` unless it declares a packaged web app.
/// * `MetadataUnavailable` if it declares no origin URL.
pub fn request_packaged_run(
    package_manager: &dyn PackageManager,
    bridge: &dyn Bridge,
    package_name: &str,
    authority: Option<&str>,
) -> Result<PackagedRun, ServiceError> {
    let info = package_manager.application_info(package_name)?;
    if info.web_app_type() != Some(WebAppType::Packaged) {
        error!("{} is not a packaged web app", package_name);
        return Err(ErrorCode::NotWebApp.into());
    }
    let Some(origin_url) = info.origin_url() else {
        error!("{} declares no origin url", package_name);
        return Err(ErrorCode::MetadataUnavailable.into());
    };
    let run = PackagedRun {
        origin_url: origin_url.to_string(),
        package_name: package_name.to_string(),
        authority: authority
            .filter(|authority| !authority.is_empty())
            .unwrap_or(package_name)
            .to_string(),
    };
    bridge.send_event(&BridgeEvent::InstallApkPackagedApp(run.clone()));
    info!("Packaged run of {} from {} requested", package_name, run.origin_url);
    Ok(run)
}
