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

//! Background execution.
//!
//! Color extraction and slot release commits run off the calling path on a
//! dedicated runtime. Every piece of background work hands back a
//! [`BackgroundTask`] that callers may join or simply drop.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

/// Owns the threads that run background work.
pub struct BackgroundRuntime {
    runtime: Runtime,
}

impl BackgroundRuntime {
    /// Starts a runtime with `workers` threads, at least one.
    ///
    /// # Errors
    ///
    /// Returns an error if the threads cannot be spawned.
    pub fn new(workers: usize) -> io::Result<Self> {
        let workers = workers.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .max_blocking_threads(workers)
            .thread_name("webapp-background")
            .build()?;
        Ok(Self { runtime })
    }

    /// Returns a handle used to spawn work onto this runtime.
    pub fn handle(&self) -> Handle {
        self.runtime.handle().clone()
    }
}

/// Handle to a piece of background work.
///
/// Dropping the handle detaches the work, which still runs to completion.
/// The task is also a [`Future`] resolving once the work has finished.
#[derive(Debug)]
pub struct BackgroundTask {
    handle: JoinHandle<()>,
    runtime: Handle,
}

impl BackgroundTask {
    pub(crate) fn spawn<F>(runtime: &Handle, work: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            handle: runtime.spawn_blocking(work),
            runtime: runtime.clone(),
        }
    }

    /// Blocks the current thread until the work has finished.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous context; `.await` the
    /// task there instead.
    pub fn join(self) {
        let runtime = self.runtime.clone();
        runtime.block_on(self)
    }

    /// Returns `true` once the work has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Future for BackgroundTask {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|res| {
            if let Err(e) = res {
                error!("background task failed: {}", e);
            }
        })
    }
}
