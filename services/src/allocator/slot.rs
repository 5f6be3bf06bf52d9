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

//! Launcher slots and their persisted bindings.

use core::fmt;

use crate::utils::BackgroundTask;

/// Default number of launcher slots.
pub const MAX_SLOTS: usize = 100;

/// Color stored while a slot's icon color is not known.
pub const UNKNOWN_COLOR: i32 = -1;

const IDENTITY_PREFIX: &str = "package-name-";
const ORIGIN_PREFIX: &str = "origin-";
const COLOR_PREFIX: &str = "color-";

/// A launcher slot.
///
/// Each slot owns one launcher activity, one engine profile and one intent
/// action, all derived from its index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(usize);

impl Slot {
    /// Creates the slot with the given index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the slot index.
    pub fn index(self) -> usize {
        self.0
    }

    /// Returns the engine profile name, e.g. `webapp3`.
    pub fn profile_name(self) -> String {
        format!("webapp{}", self.0)
    }

    /// Returns the launch intent action of `host_package`, e.g.
    /// `org.mozilla.gecko.WEBAPP3`.
    pub fn action(self, host_package: &str) -> String {
        format!("{}.WEBAPP{}", host_package, self.0)
    }

    /// Returns the launcher activity class inside `host_package`, e.g.
    /// `org.mozilla.gecko.WebApps$WebApp3`.
    pub fn class_name(self, host_package: &str) -> String {
        format!("{}.WebApps$WebApp{}", host_package, self.0)
    }

    pub(crate) fn identity_key(self) -> String {
        format!("{}{}", IDENTITY_PREFIX, self.0)
    }

    pub(crate) fn origin_key(self) -> String {
        format!("{}{}", ORIGIN_PREFIX, self.0)
    }

    pub(crate) fn color_key(self) -> String {
        format!("{}{}", COLOR_PREFIX, self.0)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of a bound slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotBinding {
    /// The slot.
    pub slot: Slot,
    /// Package name of the web app bound to the slot.
    pub identity: String,
    /// Web origin of the app, once known.
    pub origin: Option<String>,
    /// Packed ARGB icon color, [`UNKNOWN_COLOR`] if not computed yet.
    pub color: i32,
}

/// Result of [`find_or_allocate`].
///
/// [`find_or_allocate`]: super::WebAppAllocator::find_or_allocate
pub struct Allocation {
    /// The slot bound to the identity.
    pub slot: Slot,
    /// Whether the slot was bound by this call.
    pub newly_allocated: bool,
    /// Icon color computation scheduled for a new slot.
    pub color_task: Option<BackgroundTask>,
}

impl fmt::Debug for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Allocation")
            .field("slot", &self.slot)
            .field("newly_allocated", &self.newly_allocated)
            .field("color_task", &self.color_task.is_some())
            .finish()
    }
}
