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

//! Preference store errors.

use core::fmt;
use std::io;

/// Errors raised while opening or committing to a preference store.
#[derive(Debug)]
pub enum PrefsError {
    /// The backing SQLite database failed.
    Sqlite(rusqlite::Error),
    /// The store directory could not be prepared.
    Io(io::Error),
}

impl From<rusqlite::Error> for PrefsError {
    fn from(value: rusqlite::Error) -> Self {
        PrefsError::Sqlite(value)
    }
}

impl From<io::Error> for PrefsError {
    fn from(value: io::Error) -> Self {
        PrefsError::Io(value)
    }
}

impl std::error::Error for PrefsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrefsError::Sqlite(e) => Some(e),
            PrefsError::Io(e) => Some(e),
        }
    }
}

impl fmt::Display for PrefsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrefsError::Sqlite(e) => write!(f, "preference database error: {}", e),
            PrefsError::Io(e) => write!(f, "preference store io error: {}", e),
        }
    }
}
