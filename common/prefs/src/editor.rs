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

//! Batched preference modifications.

use crate::error::PrefsError;
use crate::store::{PrefValue, PreferenceStore};

/// A single pending modification.
#[derive(Debug)]
pub(crate) enum EditOp {
    Put(String, PrefValue),
    Remove(String),
    Clear,
}

/// Accumulates modifications to a [`PreferenceStore`].
///
/// Operations are applied in the order they were recorded. Dropping an editor
/// without committing discards its pending operations.
pub struct Editor {
    store: PreferenceStore,
    ops: Vec<EditOp>,
}

impl Editor {
    pub(crate) fn new(store: PreferenceStore) -> Self {
        Self {
            store,
            ops: Vec::new(),
        }
    }

    /// Stores a string under `key`.
    pub fn put_string(&mut self, key: &str, value: &str) -> &mut Self {
        self.ops
            .push(EditOp::Put(key.to_string(), PrefValue::String(value.to_string())));
        self
    }

    /// Stores an integer under `key`.
    pub fn put_int(&mut self, key: &str, value: i32) -> &mut Self {
        self.ops
            .push(EditOp::Put(key.to_string(), PrefValue::Int(value as i64)));
        self
    }

    /// Removes `key`. Removing an absent key is not an error.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.ops.push(EditOp::Remove(key.to_string()));
        self
    }

    /// Removes every entry of the store.
    pub fn clear(&mut self) -> &mut Self {
        self.ops.push(EditOp::Clear);
        self
    }

    /// Returns `true` if no modification is pending.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Writes all pending modifications as one transaction.
    ///
    /// The editor is empty afterwards and can be reused. On error nothing is
    /// applied and the pending modifications are dropped.
    pub fn commit(&mut self) -> Result<(), PrefsError> {
        if self.ops.is_empty() {
            return Ok(());
        }
        let ops = std::mem::take(&mut self.ops);
        let count = ops.len();
        self.store.apply(ops)?;
        debug!("{} committed {} edits", self.store.name(), count);
        Ok(())
    }
}
