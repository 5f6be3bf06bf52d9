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

use serde_json::json;

use super::*;

// @tc.name: ut_events_install_request
// @tc.desc: Test the wire format of install requests
// @tc.precon: NA
// @tc.step: 1. Serialize a packaged request and a hosted request
// @tc.expect: Keys are camel case, optional fields are omitted when absent
// @tc.type: FUNC
// @tc.require: issues#WEBAPP09
#[test]
fn ut_events_install_request() {
    let mut request = InstallRequest {
        package_name: "org.a".to_string(),
        manifest_url: "https://a.example/manifest.webapp".to_string(),
        title: "A".to_string(),
        app_type: WebAppType::Packaged,
        manifest: json!({"name": "A"}),
        update_manifest: Some(json!({"name": "A", "package_path": "a.zip"})),
        profile_path: Some("/data/profiles/webapp0".to_string()),
    };
    let event = BridgeEvent::AutoInstallPackage(request.clone());
    assert_eq!(event.name(), AUTO_INSTALL_PACKAGE);
    assert_eq!(
        event.payload().unwrap(),
        json!({
            "packageName": "org.a",
            "manifestUrl": "https://a.example/manifest.webapp",
            "title": "A",
            "type": "packaged",
            "manifest": {"name": "A"},
            "updateManifest": {"name": "A", "package_path": "a.zip"},
            "profilePath": "/data/profiles/webapp0",
        })
    );

    request.app_type = WebAppType::Hosted;
    request.update_manifest = None;
    request.profile_path = None;
    let payload = BridgeEvent::AutoInstall(request).payload().unwrap();
    assert_eq!(payload["type"], "hosted");
    assert!(payload.get("updateManifest").is_none());
    assert!(payload.get("profilePath").is_none());
}

// @tc.name: ut_events_post_install
// @tc.desc: Test parsing completion messages
// @tc.precon: NA
// @tc.step: 1. Parse a full completion message
//           2. Parse an empty object
// @tc.expect: Renamed keys are read; absent keys default
// @tc.type: FUNC
// @tc.require: issues#WEBAPP09
#[test]
fn ut_events_post_install() {
    let post: PostInstall = serde_json::from_value(json!({
        "origin": "app://a.example",
        "manifestURL": "https://a.example/manifest.webapp",
        "name": "A",
        "iconURL": "data:image/png;base64,AAAA",
        "originalOrigin": "app://{1234}",
    }))
    .unwrap();
    assert_eq!(post.origin, "app://a.example");
    assert_eq!(post.manifest_url, "https://a.example/manifest.webapp");
    assert_eq!(post.name.as_deref(), Some("A"));
    assert_eq!(post.icon_url.as_deref(), Some("data:image/png;base64,AAAA"));
    assert_eq!(post.original_origin.as_deref(), Some("app://{1234}"));

    let empty: PostInstall = serde_json::from_value(json!({})).unwrap();
    assert_eq!(empty, PostInstall::default());
}

// @tc.name: ut_events_simple_payloads
// @tc.desc: Test the payloads of the remaining events
// @tc.precon: NA
// @tc.step: 1. Build each remaining event
// @tc.expect: Names and payloads match the wire format
// @tc.type: FUNC
// @tc.require: issues#WEBAPP09
#[test]
fn ut_events_simple_payloads() {
    let added = BridgeEvent::AppAdded("https://a.example/manifest.webapp".to_string());
    assert_eq!(added.name(), APP_ADDED);
    assert_eq!(added.payload().unwrap(), json!("https://a.example/manifest.webapp"));

    let removed = BridgeEvent::AppRemoved("org.a".to_string());
    assert_eq!(removed.name(), APP_REMOVED);
    assert_eq!(removed.payload().unwrap(), json!("org.a"));

    let installed = BridgeEvent::AppInstalled(AppInstalled {
        manifest_url: "https://a.example/m".to_string(),
    });
    assert_eq!(installed.name(), APP_INSTALLED);
    assert_eq!(
        installed.payload().unwrap(),
        json!({"manifestUrl": "https://a.example/m"})
    );

    let launch = BridgeEvent::LaunchFromJava(LaunchApp {
        url: "https://a.example/m".to_string(),
        name: "WebApp".to_string(),
    });
    assert_eq!(launch.name(), LAUNCH_FROM_JAVA);
    assert_eq!(
        launch.payload().unwrap(),
        json!({"url": "https://a.example/m", "name": "WebApp"})
    );

    let run = BridgeEvent::InstallApkPackagedApp(PackagedRun {
        origin_url: "app://a.example".to_string(),
        package_name: "org.a".to_string(),
        authority: "org.a".to_string(),
    });
    assert_eq!(run.name(), INSTALL_APK_PACKAGED_APP);
    assert_eq!(
        run.payload().unwrap(),
        json!({"originUrl": "app://a.example", "packageName": "org.a", "authority": "org.a"})
    );
}
