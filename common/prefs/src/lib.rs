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

//! Named key/value preference stores.
//!
//! A [`PreferenceStore`] keeps every entry of one named store in memory for
//! synchronous reads and persists changes through an [`Editor`], which batches
//! puts and removals and commits them as a single SQLite transaction.
//!
//! # Examples
//!
//! ```rust
//! use webapp_prefs::{OpenConfig, PreferenceStore};
//!
//! let store = PreferenceStore::open(OpenConfig::new("webapps").in_memory()).unwrap();
//! store
//!     .edit()
//!     .put_string("package-name-0", "com.example.app")
//!     .put_int("color-0", -1)
//!     .commit()
//!     .unwrap();
//! assert_eq!(store.get_string("package-name-0").as_deref(), Some("com.example.app"));
//! assert_eq!(store.get_int("color-0"), Some(-1));
//! ```

#![warn(missing_docs)]
#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;

mod config;
mod editor;
mod error;
mod store;

pub use config::OpenConfig;
pub use editor::Editor;
pub use error::PrefsError;
pub use store::{PrefValue, PreferenceStore};
