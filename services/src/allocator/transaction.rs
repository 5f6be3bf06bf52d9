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

//! Batched slot edits.

use std::collections::HashMap;
use std::sync::MutexGuard;

use webapp_prefs::Editor;

use super::{Slot, SlotTable, UNKNOWN_COLOR};
use crate::error::{ErrorCode, ServiceError};

/// A batch of slot edits made under the allocator lock.
///
/// The transaction holds the allocator lock for its whole lifetime, so no
/// other slot operation can interleave with it. Setters only stage edits;
/// reads observe the state as it was before the transaction. The edits are
/// written together by [`end`], or when the transaction is dropped. A
/// transaction dropped while its thread panics writes nothing.
///
/// Only one transaction per allocator exists at a time. Helpers that add to
/// a larger batch take `&mut SlotTransaction` instead of starting their own.
///
/// [`end`]: SlotTransaction::end
pub struct SlotTransaction<'a> {
    table: MutexGuard<'a, SlotTable>,
    editor: Editor,
    staged: HashMap<Slot, bool>,
}

impl std::fmt::Debug for SlotTransaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotTransaction")
            .field("staged", &self.staged)
            .finish_non_exhaustive()
    }
}

impl<'a> SlotTransaction<'a> {
    pub(crate) fn new(table: MutexGuard<'a, SlotTable>) -> Self {
        let editor = table.prefs.edit();
        Self {
            table,
            editor,
            staged: HashMap::new(),
        }
    }

    /// Returns the identity bound to `slot`.
    pub fn identity(&self, slot: Slot) -> Option<String> {
        self.table.check(slot);
        self.table.identity(slot)
    }

    /// Returns the slot bound to `identity`.
    pub fn find_identity(&self, identity: &str) -> Option<Slot> {
        self.table.find_identity(identity)
    }

    /// Returns the bound slot whose origin is `origin`.
    pub fn find_origin(&self, origin: &str) -> Option<Slot> {
        self.table.find_origin(origin)
    }

    pub(crate) fn remove_origin(&mut self, slot: Slot) -> &mut Self {
        self.editor.remove(&slot.origin_key());
        self
    }

    // Bound once this transaction commits.
    fn will_be_bound(&self, slot: Slot) -> bool {
        match self.staged.get(&slot) {
            Some(bound) => *bound,
            None => self.table.is_bound(slot),
        }
    }

    /// Binds `identity` to the lowest free slot with an unknown color and no
    /// origin.
    ///
    /// # Errors
    ///
    /// `SlotExhausted` if no slot is free.
    pub(crate) fn allocate(&mut self, identity: &str) -> Result<Slot, ServiceError> {
        let slot = self
            .table
            .slots()
            .find(|slot| !self.will_be_bound(*slot))
            .ok_or_else(|| {
                warn!("no free slot left for {}", identity);
                ErrorCode::SlotExhausted
            })?;
        self.set_identity(slot, identity)
            .remove_origin(slot)
            .set_color(slot, UNKNOWN_COLOR)?;
        Ok(slot)
    }

    /// Binds `slot` to `identity`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    pub fn set_identity(&mut self, slot: Slot, identity: &str) -> &mut Self {
        self.table.check(slot);
        self.editor.put_string(&slot.identity_key(), identity);
        self.staged.insert(slot, true);
        self
    }

    /// Stores the web origin of `slot`.
    ///
    /// # Errors
    ///
    /// `InvalidIdentity` if `slot` is free and not bound earlier in this
    /// transaction. Nothing is staged then.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    pub fn set_origin(&mut self, slot: Slot, origin: &str) -> Result<&mut Self, ServiceError> {
        self.table.check(slot);
        if !self.will_be_bound(slot) {
            warn!("origin {} for free slot {} refused", origin, slot);
            return Err(ErrorCode::InvalidIdentity.into());
        }
        self.editor.put_string(&slot.origin_key(), origin);
        Ok(self)
    }

    /// Stores the icon color of `slot`.
    ///
    /// # Errors
    ///
    /// `InvalidIdentity` if `slot` is free and not bound earlier in this
    /// transaction. Nothing is staged then.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    pub fn set_color(&mut self, slot: Slot, color: i32) -> Result<&mut Self, ServiceError> {
        self.table.check(slot);
        if !self.will_be_bound(slot) {
            warn!("color for free slot {} refused", slot);
            return Err(ErrorCode::InvalidIdentity.into());
        }
        self.editor.put_int(&slot.color_key(), color);
        Ok(self)
    }

    /// Unbinds `slot`, removing its identity, origin and color.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    pub fn clear(&mut self, slot: Slot) -> &mut Self {
        self.table.check(slot);
        self.editor
            .remove(&slot.identity_key())
            .remove(&slot.origin_key())
            .remove(&slot.color_key());
        self.staged.insert(slot, false);
        self
    }

    /// Writes all staged edits and releases the allocator lock.
    pub fn end(mut self) -> Result<(), ServiceError> {
        self.editor.commit()?;
        Ok(())
    }
}

impl Drop for SlotTransaction<'_> {
    fn drop(&mut self) {
        if self.editor.is_empty() {
            return;
        }
        if std::thread::panicking() {
            error!("slot transaction abandoned by a panic, edits discarded");
            return;
        }
        if let Err(e) = self.editor.commit() {
            error!("slot transaction commit on drop failed: {}", e);
        }
    }
}
