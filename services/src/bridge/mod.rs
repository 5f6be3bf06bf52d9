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

//! Message bridge to the rendering engine.
//!
//! The service and the engine exchange named JSON messages. Outbound
//! messages are built from the typed payloads in [`events`]; inbound
//! messages are delivered to [`BridgeListener`]s registered per name.

pub mod events;
mod local;

use std::sync::Arc;

pub use events::BridgeEvent;
pub use local::LocalBridge;
use serde_json::Value;

/// Receives inbound bridge messages.
pub trait BridgeListener: Send + Sync {
    /// Handles the message `event` carrying `message`.
    fn handle_message(&self, event: &str, message: &Value);
}

/// A named message channel to the engine.
pub trait Bridge: Send + Sync {
    /// Sends the message `event` carrying `payload`.
    fn send(&self, event: &str, payload: Value);

    /// Delivers inbound `event` messages to `listener`.
    fn register_listener(&self, event: &str, listener: Arc<dyn BridgeListener>);

    /// Stops delivering `event` messages to `listener`.
    ///
    /// Listeners are compared by address, so a listener can unregister
    /// itself from inside [`BridgeListener::handle_message`].
    fn unregister_listener(&self, event: &str, listener: &dyn BridgeListener);

    /// Serializes and sends a typed event.
    fn send_event(&self, event: &BridgeEvent) {
        match event.payload() {
            Ok(payload) => {
                debug!("bridge send {}", event.name());
                self.send(event.name(), payload);
            }
            Err(e) => error!("cannot serialize {}: {}", event.name(), e),
        }
    }
}

pub(crate) fn same_listener(
    registered: &Arc<dyn BridgeListener>,
    listener: &dyn BridgeListener,
) -> bool {
    std::ptr::eq(
        Arc::as_ptr(registered) as *const (),
        listener as *const _ as *const (),
    )
}
