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

//! Web-app launcher service.
//!
//! This service assigns every installed web app one of a fixed number of
//! launcher *slots*, keeps the slot bindings and the registry of installed web
//! apps in preference stores, drives the install handshake with the rendering
//! engine over a message bridge, and resolves launch requests to slot-indexed
//! launch targets.

#![allow(
    unreachable_pub,
    clippy::new_without_default,
    unknown_lints,
    stable_features
)]
#![warn(
    missing_docs,
    clippy::redundant_static_lifetimes,
    clippy::enum_variant_names,
    clippy::clone_on_copy,
    clippy::unused_async
)]

#[macro_use]
extern crate log;

#[macro_use]
extern crate webapp_utils;

#[macro_use]
mod macros;

pub mod allocator;
pub mod bridge;
pub mod config;
pub mod dispatch;
mod error;
pub mod install;
pub mod registry;
mod service;
pub mod utils;

pub use allocator::{Allocation, Slot, SlotBinding, SlotTransaction, WebAppAllocator};
pub use error::{ErrorCode, ServiceError};
pub use service::WebAppService;
