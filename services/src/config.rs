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

//! Service configuration.
//!
//! [`WebAppConfig`] describes how many launcher slots exist, where the slot
//! and registry stores live, which host package owns the launcher activities
//! and how many threads run background work. Use [`ConfigBuilder`] to build
//! one.

use std::path::Path;

use webapp_prefs::OpenConfig;

use crate::allocator::MAX_SLOTS;

/// Name of the store holding slot bindings.
pub const SLOT_STORE_NAME: &str = "webapps";

/// Name of the store holding the installed web-app registry.
pub const REGISTRY_STORE_NAME: &str = "webAppRegistry";

/// Package that hosts the per-slot launcher activities.
pub const DEFAULT_HOST_PACKAGE: &str = "org.mozilla.gecko";

const DEFAULT_BACKGROUND_WORKERS: usize = 2;

/// Configuration of a [`WebAppService`].
///
/// [`WebAppService`]: crate::WebAppService
#[derive(Clone, Debug)]
pub struct WebAppConfig {
    pub(crate) max_slots: usize,
    pub(crate) slot_store: OpenConfig,
    pub(crate) registry_store: OpenConfig,
    pub(crate) host_package: String,
    pub(crate) background_workers: usize,
}

impl WebAppConfig {
    /// Returns the number of launcher slots.
    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    /// Returns the slot store configuration.
    pub fn slot_store(&self) -> &OpenConfig {
        &self.slot_store
    }

    /// Returns the registry store configuration.
    pub fn registry_store(&self) -> &OpenConfig {
        &self.registry_store
    }

    /// Returns the package hosting the launcher activities.
    pub fn host_package(&self) -> &str {
        &self.host_package
    }

    /// Returns the number of background worker threads.
    pub fn background_workers(&self) -> usize {
        self.background_workers
    }
}

impl Default for WebAppConfig {
    /// In-memory stores, 100 slots, the default host package.
    ///
    /// The slot store is shared with the launcher processes, so it is opened
    /// in multi-process mode.
    fn default() -> Self {
        let mut slot_store = OpenConfig::new(SLOT_STORE_NAME);
        slot_store.multi_process(true);
        Self {
            max_slots: MAX_SLOTS,
            slot_store,
            registry_store: OpenConfig::new(REGISTRY_STORE_NAME),
            host_package: DEFAULT_HOST_PACKAGE.to_string(),
            background_workers: DEFAULT_BACKGROUND_WORKERS,
        }
    }
}

/// Builder for [`WebAppConfig`].
pub struct ConfigBuilder {
    inner: WebAppConfig,
}

impl ConfigBuilder {
    /// Creates a builder holding the default configuration.
    pub fn new() -> Self {
        Self {
            inner: WebAppConfig::default(),
        }
    }

    /// Sets the number of launcher slots.
    ///
    /// # Panics
    ///
    /// Panics if `max_slots` is zero.
    pub fn max_slots(&mut self, max_slots: usize) -> &mut Self {
        assert!(max_slots > 0, "at least one launcher slot is required");
        self.inner.max_slots = max_slots;
        self
    }

    /// Persists both stores under `directory`.
    pub fn store_directory<P: AsRef<Path>>(&mut self, directory: P) -> &mut Self {
        self.inner.slot_store.directory(directory.as_ref());
        self.inner.registry_store.directory(directory.as_ref());
        self
    }

    /// Keeps both stores in memory.
    pub fn in_memory(&mut self) -> &mut Self {
        self.inner.slot_store.in_memory();
        self.inner.registry_store.in_memory();
        self
    }

    /// Sets the package hosting the launcher activities.
    pub fn host_package(&mut self, host_package: &str) -> &mut Self {
        self.inner.host_package = host_package.to_string();
        self
    }

    /// Sets the number of background worker threads, at least one.
    pub fn background_workers(&mut self, workers: usize) -> &mut Self {
        self.inner.background_workers = workers.max(1);
        self
    }

    /// Builds the configuration.
    pub fn build(&mut self) -> WebAppConfig {
        self.inner.clone()
    }
}
