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

//! Launcher slot allocation.
//!
//! Every web app runs in one of a fixed number of launcher slots. The
//! [`WebAppAllocator`] binds app identities to slots and keeps the binding,
//! the app's web origin and its icon color in the `webapps` preference store,
//! which launcher processes read to find their app.
//!
//! Bindings are stored under `package-name-<N>`, `origin-<N>` and
//! `color-<N>`. A slot without an identity is free.

mod slot;
mod transaction;

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

pub use slot::{Allocation, Slot, SlotBinding, MAX_SLOTS, UNKNOWN_COLOR};
use tokio::runtime::Handle;
pub use transaction::SlotTransaction;
use webapp_prefs::PreferenceStore;

use crate::error::{ErrorCode, ServiceError};
use crate::utils::{dominant_color, BackgroundTask, Icon};

pub(crate) struct SlotTable {
    prefs: PreferenceStore,
    max_slots: usize,
}

impl SlotTable {
    fn check(&self, slot: Slot) {
        check_range(slot, self.max_slots);
    }

    fn slots(&self) -> impl Iterator<Item = Slot> {
        (0..self.max_slots).map(Slot::new)
    }

    fn identity(&self, slot: Slot) -> Option<String> {
        self.prefs.get_string(&slot.identity_key())
    }

    fn origin(&self, slot: Slot) -> Option<String> {
        self.prefs.get_string(&slot.origin_key())
    }

    fn color(&self, slot: Slot) -> i32 {
        self.prefs
            .get_int(&slot.color_key())
            .unwrap_or(UNKNOWN_COLOR)
    }

    fn is_bound(&self, slot: Slot) -> bool {
        self.prefs.contains(&slot.identity_key())
    }

    fn find_identity(&self, identity: &str) -> Option<Slot> {
        self.slots()
            .find(|slot| self.identity(*slot).as_deref() == Some(identity))
    }

    fn find_origin(&self, origin: &str) -> Option<Slot> {
        self.slots().find(|slot| {
            self.is_bound(*slot) && self.origin(*slot).as_deref() == Some(origin)
        })
    }
}

fn check_range(slot: Slot, max_slots: usize) {
    assert!(
        slot.index() < max_slots,
        "slot {} out of range, only {} slots exist",
        slot,
        max_slots
    );
}

// Edits are staged until commit, so a panic under the lock leaves the table
// as it was.
fn lock_or_recover(table: &Mutex<SlotTable>) -> MutexGuard<'_, SlotTable> {
    match table.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Binds web-app identities to launcher slots.
///
/// All operations are serialized by one lock. Icon color extraction and slot
/// release commit on the background runtime and take the lock again before
/// touching slot state.
pub struct WebAppAllocator {
    table: Arc<Mutex<SlotTable>>,
    max_slots: usize,
    runtime: Handle,
}

impl WebAppAllocator {
    /// Creates an allocator over `prefs` with `max_slots` slots.
    ///
    /// # Arguments
    ///
    /// * `prefs` - The `webapps` store.
    /// * `max_slots` - Number of slots, fixed for the allocator's lifetime.
    /// * `runtime` - Runtime running background work.
    pub fn new(prefs: PreferenceStore, max_slots: usize, runtime: Handle) -> Self {
        Self {
            table: Arc::new(Mutex::new(SlotTable { prefs, max_slots })),
            max_slots,
            runtime,
        }
    }

    /// Returns the number of slots.
    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    /// Starts a batch of slot edits holding the allocator lock.
    ///
    /// Any other allocator call made by the same thread before the
    /// transaction ends deadlocks.
    pub fn begin(&self) -> SlotTransaction<'_> {
        SlotTransaction::new(self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, SlotTable> {
        lock_or_recover(&self.table)
    }

    fn check(&self, slot: Slot) {
        check_range(slot, self.max_slots);
    }

    /// Returns the slot bound to `identity`, scanning from slot 0.
    pub fn find_index_for_identity(&self, identity: &str) -> Option<Slot> {
        self.lock().find_identity(identity)
    }

    /// Returns the first bound slot whose stored origin is `origin`.
    pub fn find_index_for_origin(&self, origin: &str) -> Option<Slot> {
        self.lock().find_origin(origin)
    }

    /// Returns the identity bound to `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range, as do all per-slot accessors. The
    /// allocator stays usable afterwards.
    pub fn get_identity(&self, slot: Slot) -> Option<String> {
        self.check(slot);
        self.lock().identity(slot)
    }

    /// Returns the web origin stored for `slot`.
    pub fn get_origin(&self, slot: Slot) -> Option<String> {
        self.check(slot);
        self.lock().origin(slot)
    }

    /// Stores the web origin of `slot`.
    ///
    /// # Errors
    ///
    /// `InvalidIdentity` if `slot` is free.
    pub fn set_origin(&self, slot: Slot, origin: &str) -> Result<(), ServiceError> {
        self.check(slot);
        let mut tx = self.begin();
        tx.set_origin(slot, origin)?;
        tx.end()
    }

    /// Returns the icon color of `slot`, [`UNKNOWN_COLOR`] if not known.
    pub fn get_color(&self, slot: Slot) -> i32 {
        self.check(slot);
        self.lock().color(slot)
    }

    /// Stores an icon color computed elsewhere.
    ///
    /// # Errors
    ///
    /// `InvalidIdentity` if `slot` is free.
    pub fn set_color(&self, slot: Slot, color: i32) -> Result<(), ServiceError> {
        self.check(slot);
        let mut tx = self.begin();
        tx.set_color(slot, color)?;
        tx.end()
    }

    /// Returns the slot bound to `identity`, binding the lowest free slot if
    /// there is none.
    ///
    /// A new binding is written before this returns, with an unknown color.
    /// If `icon` is given its color is then computed in the background and
    /// the task is returned in the [`Allocation`]. An existing binding is left
    /// untouched.
    ///
    /// # Arguments
    ///
    /// * `identity` - Package name of the web app.
    /// * `display_name` - Human readable name, only logged.
    /// * `icon` - Icon used for the slot color.
    ///
    /// # Errors
    ///
    /// * `InvalidIdentity` if `identity` is empty.
    /// * `SlotExhausted` if every slot is bound. Nothing is changed.
    pub fn find_or_allocate(
        &self,
        identity: &str,
        display_name: &str,
        icon: Option<&Icon>,
    ) -> Result<Allocation, ServiceError> {
        if identity.is_empty() {
            return Err(ErrorCode::InvalidIdentity.into());
        }
        let mut tx = self.begin();
        if let Some(slot) = tx.find_identity(identity) {
            debug!("{} already bound to slot {}", identity, slot);
            return Ok(Allocation {
                slot,
                newly_allocated: false,
                color_task: None,
            });
        }
        let slot = tx.allocate(identity)?;
        tx.end()?;
        info!("bound {} ({}) to slot {}", identity, display_name, slot);

        let color_task =
            icon.map(|icon| self.spawn_color(slot, identity.to_string(), icon.clone()));
        Ok(Allocation {
            slot,
            newly_allocated: true,
            color_task,
        })
    }

    /// Rewrites the binding of `slot`.
    ///
    /// A given identity is written together with an unknown color unless an
    /// icon accompanies it; an identity bound to another slot is moved here.
    /// A given icon has its color computed in the background. `None` leaves
    /// the current identity in place.
    ///
    /// # Errors
    ///
    /// `InvalidIdentity` if the identity is empty, or if only an icon is
    /// given for a free slot.
    pub fn update_binding(
        &self,
        slot: Slot,
        identity: Option<&str>,
        icon: Option<&Icon>,
    ) -> Result<Option<BackgroundTask>, ServiceError> {
        self.check(slot);
        let mut tx = self.begin();
        let owner = match identity {
            Some("") => return Err(ErrorCode::InvalidIdentity.into()),
            Some(identity) => {
                if let Some(previous) = tx.find_identity(identity).filter(|s| *s != slot) {
                    warn!("{} moves from slot {} to slot {}", identity, previous, slot);
                    tx.clear(previous);
                }
                tx.set_identity(slot, identity);
                if icon.is_none() {
                    tx.set_color(slot, UNKNOWN_COLOR)?;
                }
                Some(identity.to_string())
            }
            None => tx.identity(slot),
        };
        tx.end()?;
        match (icon, owner) {
            (Some(icon), Some(owner)) => Ok(Some(self.spawn_color(slot, owner, icon.clone()))),
            (Some(_), None) => Err(ErrorCode::InvalidIdentity.into()),
            (None, _) => Ok(None),
        }
    }

    /// Computes the dominant color of `icon` in the background and stores it
    /// for `slot`.
    ///
    /// Only the color key is written. If extraction fails or panics the
    /// failure is logged and the color becomes [`UNKNOWN_COLOR`]. If the slot
    /// was released or rebound in the meantime nothing is written.
    ///
    /// # Errors
    ///
    /// `InvalidIdentity` if `slot` is free.
    pub fn update_color_async(
        &self,
        slot: Slot,
        icon: Icon,
    ) -> Result<BackgroundTask, ServiceError> {
        self.check(slot);
        let owner = self
            .lock()
            .identity(slot)
            .ok_or(ErrorCode::InvalidIdentity)?;
        Ok(self.spawn_color(slot, owner, icon))
    }

    fn spawn_color(&self, slot: Slot, owner: String, icon: Icon) -> BackgroundTask {
        let table = self.table.clone();
        BackgroundTask::spawn(&self.runtime, move || {
            let color = match panic::catch_unwind(AssertUnwindSafe(|| dominant_color(&icon))) {
                Ok(Ok(color)) => color,
                Ok(Err(e)) => {
                    error!("icon color of slot {} unavailable: {}", slot, e);
                    UNKNOWN_COLOR
                }
                Err(_) => {
                    error!("icon color extraction of slot {} panicked", slot);
                    UNKNOWN_COLOR
                }
            };
            let table = lock_or_recover(&table);
            if table.identity(slot).as_deref() != Some(owner.as_str()) {
                debug!("slot {} no longer bound to {}, color dropped", slot, owner);
                return;
            }
            if let Err(e) = table
                .prefs
                .edit()
                .put_int(&slot.color_key(), color)
                .commit()
            {
                error!("store color of slot {} failed: {}", slot, e);
                return;
            }
            debug!("slot {} color {:#010x}", slot, color as u32);
        })
    }

    /// Unbinds `slot` in the background. Releasing a free slot is harmless.
    pub fn release_by_slot(&self, slot: Slot) -> BackgroundTask {
        self.check(slot);
        let table = self.table.clone();
        BackgroundTask::spawn(&self.runtime, move || {
            let mut tx = SlotTransaction::new(lock_or_recover(&table));
            tx.clear(slot);
            match tx.end() {
                Ok(()) => info!("released slot {}", slot),
                Err(e) => error!("release slot {} failed: {}", slot, e),
            }
        })
    }

    /// Unbinds the slot bound to `identity`, if any.
    pub fn release_by_identity(&self, identity: &str) -> Option<(Slot, BackgroundTask)> {
        let slot = self.find_index_for_identity(identity)?;
        Some((slot, self.release_by_slot(slot)))
    }

    /// Returns every bound slot in index order.
    pub fn bindings(&self) -> Vec<SlotBinding> {
        let table = self.lock();
        table
            .slots()
            .filter_map(|slot| {
                table.identity(slot).map(|identity| SlotBinding {
                    slot,
                    identity,
                    origin: table.origin(slot),
                    color: table.color(slot),
                })
            })
            .collect()
    }

    /// Rereads bindings written by other processes.
    pub fn reload(&self) -> Result<(), ServiceError> {
        self.lock().prefs.reload()?;
        Ok(())
    }
}

cfg_test! {
    impl WebAppAllocator {
        pub(crate) fn prefs(&self) -> PreferenceStore {
            self.lock().prefs.clone()
        }
    }
}
