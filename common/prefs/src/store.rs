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

//! Preference store implementation.
//!
//! Every store is loaded fully into memory on open. Reads are served from that
//! snapshot; writes go through an [`Editor`] and are applied to the database
//! and the snapshot under the same lock, so readers never observe a state the
//! database does not hold.

use std::collections::BTreeMap;
use std::fs;
use std::sync::{Arc, Mutex, RwLock};

use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::{params, Connection, ToSql};

use crate::config::OpenConfig;
use crate::editor::{EditOp, Editor};
use crate::error::PrefsError;

const CREATE_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS preferences (key TEXT PRIMARY KEY NOT NULL, value)";
const SELECT_ALL: &str = "SELECT key, value FROM preferences";
const UPSERT: &str = "INSERT OR REPLACE INTO preferences (key, value) VALUES (?1, ?2)";
const DELETE_ONE: &str = "DELETE FROM preferences WHERE key = ?1";
const DELETE_ALL: &str = "DELETE FROM preferences";

/// A value held by a preference store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrefValue {
    /// A string value.
    String(String),
    /// An integer value.
    Int(i64),
}

impl ToSql for PrefValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            PrefValue::String(s) => s.to_sql(),
            PrefValue::Int(i) => i.to_sql(),
        }
    }
}

/// A named, persistent key/value store.
///
/// Cloning is cheap; clones share the same underlying store.
#[derive(Clone)]
pub struct PreferenceStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    name: String,
    conn: Mutex<Connection>,
    entries: RwLock<BTreeMap<String, PrefValue>>,
}

impl PreferenceStore {
    /// Opens the store described by `config`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store directory cannot be created or the
    /// database cannot be opened and read.
    pub fn open(config: &OpenConfig) -> Result<Self, PrefsError> {
        let conn = match config.path() {
            Some(path) => {
                if let Some(dir) = path.parent() {
                    fs::create_dir_all(dir)?;
                }
                Connection::open(&path)?
            }
            None => Connection::open_in_memory()?,
        };
        if let Some(timeout) = config.busy_timeout() {
            conn.busy_timeout(timeout)?;
        }
        conn.execute(CREATE_TABLE, ())?;
        let entries = load_entries(&conn)?;
        debug!("open preference store {} with {} entries", config.name, entries.len());

        Ok(Self {
            inner: Arc::new(StoreInner {
                name: config.name.clone(),
                conn: Mutex::new(conn),
                entries: RwLock::new(entries),
            }),
        })
    }

    /// Returns the name of the store.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the string stored under `key`.
    ///
    /// An integer stored under `key` is reported as absent.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.inner.entries.read().unwrap().get(key) {
            Some(PrefValue::String(s)) => Some(s.clone()),
            Some(PrefValue::Int(_)) => {
                warn!("{}: key {} holds an integer, not a string", self.inner.name, key);
                None
            }
            None => None,
        }
    }

    /// Returns the integer stored under `key`.
    ///
    /// A string, or an integer outside the `i32` range, is reported as absent.
    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.inner.entries.read().unwrap().get(key) {
            Some(PrefValue::Int(i)) => match i32::try_from(*i) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("{}: key {} overflows i32: {}", self.inner.name, key, i);
                    None
                }
            },
            Some(PrefValue::String(_)) => {
                warn!("{}: key {} holds a string, not an integer", self.inner.name, key);
                None
            }
            None => None,
        }
    }

    /// Returns `true` if any value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.entries.read().unwrap().contains_key(key)
    }

    /// Returns a snapshot of every entry, ordered by key.
    pub fn all(&self) -> BTreeMap<String, PrefValue> {
        self.inner.entries.read().unwrap().clone()
    }

    /// Returns every key, ordered.
    pub fn keys(&self) -> Vec<String> {
        self.inner.entries.read().unwrap().keys().cloned().collect()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.entries.read().unwrap().len()
    }

    /// Returns `true` if the store holds no entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts a batch of modifications.
    ///
    /// Nothing is written until [`Editor::commit`] is called.
    pub fn edit(&self) -> Editor {
        Editor::new(self.clone())
    }

    /// Re-reads the store from its database.
    ///
    /// Only useful for multi-process stores, where another process may have
    /// committed since this one last looked.
    pub fn reload(&self) -> Result<(), PrefsError> {
        let conn = self.inner.conn.lock().unwrap();
        let entries = load_entries(&conn)?;
        *self.inner.entries.write().unwrap() = entries;
        Ok(())
    }

    /// Applies a batch of edits in one transaction.
    pub(crate) fn apply(&self, ops: Vec<EditOp>) -> Result<(), PrefsError> {
        let mut conn = self.inner.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for op in ops.iter() {
            match op {
                EditOp::Put(key, value) => {
                    tx.execute(UPSERT, params![key, value])?;
                }
                EditOp::Remove(key) => {
                    tx.execute(DELETE_ONE, params![key])?;
                }
                EditOp::Clear => {
                    tx.execute(DELETE_ALL, ())?;
                }
            }
        }
        tx.commit()?;

        // The connection lock is still held, so the snapshot follows commit order.
        let mut entries = self.inner.entries.write().unwrap();
        for op in ops {
            match op {
                EditOp::Put(key, value) => {
                    entries.insert(key, value);
                }
                EditOp::Remove(key) => {
                    entries.remove(&key);
                }
                EditOp::Clear => entries.clear(),
            }
        }
        Ok(())
    }
}

fn load_entries(conn: &Connection) -> Result<BTreeMap<String, PrefValue>, PrefsError> {
    let mut stmt = conn.prepare(SELECT_ALL)?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Value>(1)?))
    })?;

    let mut entries = BTreeMap::new();
    for row in rows {
        let (key, value) = row?;
        match value {
            Value::Integer(i) => {
                entries.insert(key, PrefValue::Int(i));
            }
            Value::Text(s) => {
                entries.insert(key, PrefValue::String(s));
            }
            other => error!("skip preference {} with unsupported value {:?}", key, other),
        }
    }
    Ok(entries)
}
