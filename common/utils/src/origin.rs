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

//! Web origin helpers.
//!
//! Slots record the origin of the web app they host. Origins reported by the
//! rendering engine are normalized here so that lookups compare
//! `scheme://host[:port]` strings and never full URLs.

use url::Url;

/// Returns the `scheme://host[:port]` origin of `url`.
///
/// Default ports are omitted. Schemes the URL standard treats as opaque (such
/// as `app://`) still yield an origin as long as the URL carries a host.
///
/// # Examples
///
/// ```rust
/// use webapp_utils::origin::origin_of;
///
/// assert_eq!(
///     origin_of("https://example.com:443/app/manifest.webapp").as_deref(),
///     Some("https://example.com")
/// );
/// assert_eq!(
///     origin_of("app://game.example/index.html").as_deref(),
///     Some("app://game.example")
/// );
/// assert_eq!(origin_of("not a url"), None);
/// ```
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin();
    if origin.is_tuple() {
        return Some(origin.ascii_serialization());
    }
    let host = parsed.host_str()?;
    match parsed.port() {
        Some(port) => Some(format!("{}://{}:{}", parsed.scheme(), host, port)),
        None => Some(format!("{}://{}", parsed.scheme(), host)),
    }
}
