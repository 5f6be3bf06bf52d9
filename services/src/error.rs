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

//! Service error types.

use core::fmt;
use std::io;

use webapp_prefs::PrefsError;

/// Failure codes reported by the service.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorCode {
    /// Every slot is bound; nothing was allocated.
    SlotExhausted = 1,
    /// An empty identity was given where a package name is required.
    InvalidIdentity = 2,
    /// The package manager does not know the package.
    PackageNotFound = 3,
    /// The package lacks metadata the operation needs.
    MetadataUnavailable = 4,
    /// The package does not declare a web app, or the wrong kind of web app.
    NotWebApp = 5,
    /// A bridge message could not be understood.
    InvalidPayload = 6,
    /// Any other platform failure.
    Other = 99,
}

impl From<ServiceError> for ErrorCode {
    fn from(value: ServiceError) -> Self {
        value.code()
    }
}

/// Error returned by service operations.
#[derive(Debug)]
pub enum ServiceError {
    /// Filesystem or runtime setup failed.
    IoError(io::Error),
    /// A preference store failed.
    Prefs(PrefsError),
    /// A bridge payload could not be (de)serialized.
    Json(serde_json::Error),
    /// A service level failure.
    ErrorCode(ErrorCode),
}

impl ServiceError {
    /// Returns the failure code that best describes this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::IoError(_) | ServiceError::Prefs(_) => ErrorCode::Other,
            ServiceError::Json(_) => ErrorCode::InvalidPayload,
            ServiceError::ErrorCode(code) => *code,
        }
    }
}

impl From<ErrorCode> for ServiceError {
    fn from(value: ErrorCode) -> Self {
        ServiceError::ErrorCode(value)
    }
}

impl From<io::Error> for ServiceError {
    fn from(value: io::Error) -> Self {
        ServiceError::IoError(value)
    }
}

impl From<PrefsError> for ServiceError {
    fn from(value: PrefsError) -> Self {
        ServiceError::Prefs(value)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(value: serde_json::Error) -> Self {
        ServiceError::Json(value)
    }
}

impl std::error::Error for ServiceError {}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServiceError::IoError(e) => write!(f, "io error: {}", e),
            ServiceError::Prefs(e) => write!(f, "{}", e),
            ServiceError::Json(e) => write!(f, "invalid json payload: {}", e),
            ServiceError::ErrorCode(code) => write!(f, "{:?}", code),
        }
    }
}
