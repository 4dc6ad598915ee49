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

//! The per-thread worker index.
//!
//! A thread may be registered with several pools at once (a pool running
//! nested inside a worker of another). Registrations are kept as a stack per
//! thread; each guard removes exactly its own entry, whatever the drop order.

use crate::notifier::CallbackNotifier;
use std::cell::{Cell, RefCell};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
struct Registration {
    token: u64,
    pool_index: usize,
    local: usize,
}

thread_local! {
    static REGISTRATIONS: RefCell<Vec<Registration>> = const { RefCell::new(Vec::new()) };
    static NEXT_TOKEN: Cell<u64> = const { Cell::new(0) };
}

/// The pool-local index from the calling thread's most recent live
/// registration, whatever the pool. `None` outside any worker.
pub fn current_worker() -> Option<usize> {
    REGISTRATIONS.with(|stack| stack.borrow().last().map(|r| r.local))
}

/// The calling thread's index within pool `pool_index`, if it is registered
/// with that pool.
pub(crate) fn worker_in_pool(pool_index: usize) -> Option<usize> {
    REGISTRATIONS.with(|stack| {
        stack
            .borrow()
            .iter()
            .rev()
            .find(|r| r.pool_index == pool_index)
            .map(|r| r.local)
    })
}

/// Marks the current thread as a pool worker for as long as it lives.
///
/// Created by [`ThreadPoolBase::enter_worker`](crate::ThreadPoolBase::enter_worker).
/// On drop the stop callbacks fire and the registration is withdrawn, so
/// the thread goes back to whatever it was registered as before. The guard
/// is tied to the thread that created it.
#[must_use = "the thread stops being a worker when the guard is dropped"]
pub struct WorkerGuard {
    token: u64,
    local: usize,
    global: usize,
    pool_name: String,
    notifier: Arc<CallbackNotifier>,
    // !Send: the guard must be dropped on the thread it registered.
    _not_send: std::marker::PhantomData<*const ()>,
}

impl WorkerGuard {
    pub(crate) fn enter(
        pool_index: usize,
        local: usize,
        global: usize,
        pool_name: &str,
        notifier: Arc<CallbackNotifier>,
    ) -> Self {
        let token = NEXT_TOKEN.with(|next| {
            let token = next.get();
            next.set(token.wrapping_add(1));
            token
        });
        REGISTRATIONS.with(|stack| {
            stack.borrow_mut().push(Registration {
                token,
                pool_index,
                local,
            })
        });
        notifier.on_start_thread(local, global, pool_name, "");
        Self {
            token,
            local,
            global,
            pool_name: pool_name.to_owned(),
            notifier,
            _not_send: std::marker::PhantomData,
        }
    }

    /// The pool-local index this guard registered.
    pub fn local(&self) -> usize {
        self.local
    }

    /// The global index this guard registered.
    pub fn global(&self) -> usize {
        self.global
    }
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.notifier
            .on_stop_thread(self.local, self.global, &self.pool_name, "");
        let token = self.token;
        REGISTRATIONS.with(|stack| stack.borrow_mut().retain(|r| r.token != token));
    }
}

impl std::fmt::Debug for WorkerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerGuard")
            .field("local", &self.local)
            .field("global", &self.global)
            .field("pool_name", &self.pool_name)
            .finish()
    }
}
