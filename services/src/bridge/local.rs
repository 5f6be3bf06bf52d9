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

//! In-process bridge.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::{same_listener, Bridge, BridgeListener};

/// A bridge living entirely in this process.
///
/// Outbound messages are recorded in order and can be inspected or drained;
/// inbound messages are injected with [`deliver`]. Embedders forward the
/// recorded messages to the engine.
///
/// [`deliver`]: LocalBridge::deliver
#[derive(Default)]
pub struct LocalBridge {
    sent: Mutex<Vec<(String, Value)>>,
    listeners: Mutex<HashMap<String, Vec<Arc<dyn BridgeListener>>>>,
}

impl LocalBridge {
    /// Creates a bridge with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers an inbound message to the listeners registered for `event`.
    ///
    /// Listeners are called outside the bridge lock, in registration order,
    /// and may register or unregister listeners while being called.
    ///
    /// # Returns
    ///
    /// The number of listeners called.
    pub fn deliver(&self, event: &str, message: &Value) -> usize {
        let listeners = self
            .listeners
            .lock()
            .unwrap()
            .get(event)
            .cloned()
            .unwrap_or_default();
        if listeners.is_empty() {
            debug!("bridge message {} has no listener", event);
        }
        for listener in listeners.iter() {
            listener.handle_message(event, message);
        }
        listeners.len()
    }

    /// Returns every message sent so far, oldest first.
    pub fn sent(&self) -> Vec<(String, Value)> {
        self.sent.lock().unwrap().clone()
    }

    /// Returns the payloads of the sent messages named `event`.
    pub fn sent_named(&self, event: &str) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// Removes and returns every message sent so far.
    pub fn take_sent(&self) -> Vec<(String, Value)> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    /// Returns the number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .lock()
            .unwrap()
            .get(event)
            .map_or(0, Vec::len)
    }
}

impl Bridge for LocalBridge {
    fn send(&self, event: &str, payload: Value) {
        self.sent.lock().unwrap().push((event.to_string(), payload));
    }

    fn register_listener(&self, event: &str, listener: Arc<dyn BridgeListener>) {
        self.listeners
            .lock()
            .unwrap()
            .entry(event.to_string())
            .or_default()
            .push(listener);
    }

    fn unregister_listener(&self, event: &str, listener: &dyn BridgeListener) {
        let mut listeners = self.listeners.lock().unwrap();
        if let Some(registered) = listeners.get_mut(event) {
            registered.retain(|l| !same_listener(l, listener));
            if registered.is_empty() {
                listeners.remove(event);
            }
        }
    }
}
