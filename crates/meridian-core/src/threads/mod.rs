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

//! Types and collaborator contracts used by worker-thread pools.
//!
//! A pool needs three facts from the outside world when it initializes:
//! how many processing units the machine has ([`Topology`]), which units
//! each of its worker threads was assigned ([`ResourcePartitioner`]), and a
//! way to read a cheap cycle counter next to a wall clock
//! ([`TimestampSource`]).

mod mask;
mod mode;

pub use mask::PuMask;
pub use mode::{SchedulerMode, SchedulerModeFlag};

use std::fmt;

/// The identity of a thread pool. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PoolId {
    index: usize,
    name: String,
}

impl PoolId {
    /// Creates a new pool identity.
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }

    /// The pool's position among the runtime's pools.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The pool's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.index)
    }
}

/// Assigns processing units to worker threads.
///
/// Implementations decide the binding policy. An empty mask means "no
/// binding" for that thread; pools still account for it (see
/// `ThreadPoolBase::init` in `meridian-threads`). Whether two pools may be
/// handed overlapping units is also this collaborator's decision.
pub trait ResourcePartitioner: Send + Sync {
    /// The affinity mask of the worker thread with the given global index.
    fn get_pu_mask(&self, global_thread_num: usize) -> PuMask;
}

/// Reports facts about the hardware.
pub trait Topology: Send + Sync {
    /// Total number of processing units (cores or hardware threads).
    fn hardware_concurrency(&self) -> usize;
}

/// A hardware cycle counter paired with a monotonic wall clock.
pub trait TimestampSource {
    /// Current value of the cycle counter.
    fn cycles(&self) -> u64;
    /// Current wall-clock reading, in nanoseconds since an arbitrary origin.
    fn now_ns(&self) -> u64;
}
