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

//! Preference store configuration.
//!
//! Provides the builder used to describe where a named store lives and how it
//! behaves when several processes share it.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a writer waits for another process holding the database lock.
const MULTI_PROCESS_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration options for opening a [`PreferenceStore`].
///
/// Stores are in-memory unless a directory is given, in which case the store
/// is persisted as `<directory>/<name>.db`.
///
/// [`PreferenceStore`]: crate::PreferenceStore
#[derive(Clone, Debug)]
pub struct OpenConfig {
    /// Name of the store, also used for the database file name.
    pub(crate) name: String,
    /// Directory holding the database file, `None` for an in-memory store.
    pub(crate) directory: Option<PathBuf>,
    /// Whether other processes may write the same store concurrently.
    pub(crate) multi_process: bool,
}

impl OpenConfig {
    /// Creates a configuration for the store called `name`.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the store, e.g. `"webapps"`
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            directory: None,
            multi_process: false,
        }
    }

    /// Keeps the store in memory only.
    pub fn in_memory(&mut self) -> &mut Self {
        self.directory = None;
        self
    }

    /// Persists the store under `directory`.
    ///
    /// The directory is created on open if it does not exist yet.
    pub fn directory<P: AsRef<Path>>(&mut self, directory: P) -> &mut Self {
        self.directory = Some(directory.as_ref().to_path_buf());
        self
    }

    /// Allows several processes to share the store.
    ///
    /// Writers then wait for each other instead of failing with a busy error,
    /// and callers should [`reload`] before reading data another process may
    /// have changed.
    ///
    /// [`reload`]: crate::PreferenceStore::reload
    pub fn multi_process(&mut self, multi_process: bool) -> &mut Self {
        self.multi_process = multi_process;
        self
    }

    /// Returns the database file path, or `None` for an in-memory store.
    pub fn path(&self) -> Option<PathBuf> {
        self.directory
            .as_ref()
            .map(|dir| dir.join(format!("{}.db", self.name)))
    }

    pub(crate) fn busy_timeout(&self) -> Option<Duration> {
        self.multi_process.then_some(MULTI_PROCESS_BUSY_TIMEOUT)
    }
}
