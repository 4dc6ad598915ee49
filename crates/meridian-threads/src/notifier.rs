// Copyright 2025 eraflo
//
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

//! Hooks fired around the life of worker threads.

use std::fmt;
use std::sync::{Arc, RwLock};

/// Called when a worker thread starts or stops.
///
/// Arguments: pool-local index, global index, pool name, postfix.
pub type ThreadCallback = Arc<dyn Fn(usize, usize, &str, &str) + Send + Sync>;

/// Called when a worker thread reports an error.
///
/// Arguments: global index, message. Returning `false` asks the runtime to
/// stop the worker.
pub type ErrorCallback = Arc<dyn Fn(usize, &str) -> bool + Send + Sync>;

/// Lists of callbacks shared by every pool of a runtime.
///
/// Callbacks are meant to be added at setup time and are invoked in
/// registration order.
#[derive(Default)]
pub struct CallbackNotifier {
    on_start: RwLock<Vec<ThreadCallback>>,
    on_stop: RwLock<Vec<ThreadCallback>>,
    on_error: RwLock<Vec<ErrorCallback>>,
}

impl CallbackNotifier {
    /// Creates a notifier without callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a callback fired when a worker thread starts.
    pub fn add_on_start_thread<F>(&self, callback: F)
    where
        F: Fn(usize, usize, &str, &str) + Send + Sync + 'static,
    {
        write(&self.on_start).push(Arc::new(callback));
    }

    /// Adds a callback fired when a worker thread stops.
    pub fn add_on_stop_thread<F>(&self, callback: F)
    where
        F: Fn(usize, usize, &str, &str) + Send + Sync + 'static,
    {
        write(&self.on_stop).push(Arc::new(callback));
    }

    /// Adds a callback fired when a worker thread reports an error.
    pub fn add_on_error<F>(&self, callback: F)
    where
        F: Fn(usize, &str) -> bool + Send + Sync + 'static,
    {
        write(&self.on_error).push(Arc::new(callback));
    }

    /// Fires every start callback.
    pub fn on_start_thread(&self, local: usize, global: usize, pool_name: &str, postfix: &str) {
        for callback in snapshot(&self.on_start) {
            callback(local, global, pool_name, postfix);
        }
    }

    /// Fires every stop callback.
    pub fn on_stop_thread(&self, local: usize, global: usize, pool_name: &str, postfix: &str) {
        for callback in snapshot(&self.on_stop) {
            callback(local, global, pool_name, postfix);
        }
    }

    /// Fires every error callback. Returns `false` if any of them did.
    ///
    /// All callbacks run even after one returned `false`.
    pub fn on_error(&self, global: usize, message: &str) -> bool {
        snapshot(&self.on_error)
            .iter()
            .fold(true, |keep, callback| callback(global, message) && keep)
    }
}

// Callbacks are cloned out so they can register further callbacks without
// deadlocking.
fn snapshot<T: Clone>(list: &RwLock<Vec<T>>) -> Vec<T> {
    list.read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

fn write<T>(list: &RwLock<Vec<T>>) -> std::sync::RwLockWriteGuard<'_, Vec<T>> {
    list.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl fmt::Debug for CallbackNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackNotifier")
            .field("on_start", &snapshot(&self.on_start).len())
            .field("on_stop", &snapshot(&self.on_stop).len())
            .field("on_error", &snapshot(&self.on_error).len())
            .finish()
    }
}
