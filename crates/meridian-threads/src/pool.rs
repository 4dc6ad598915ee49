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

use crate::notifier::CallbackNotifier;
use crate::thread_num::{self, WorkerGuard};
use crate::time_scale;
use meridian_core::{PoolId, PuMask, ResourcePartitioner, SchedulerMode, TimestampSource, Topology};
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// State shared by every worker-thread pool, whatever its scheduling policy.
///
/// A pool is created with [`new`](Self::new), then [`init`](Self::init)
/// records which processing units its workers occupy. All methods take
/// `&self`; the pool is meant to be shared behind an `Arc`.
pub struct ThreadPoolBase {
    id: PoolId,
    notifier: Arc<CallbackNotifier>,
    mode: AtomicU32,
    thread_offset: AtomicUsize,
    thread_count: AtomicUsize,
    // f64 bits.
    timestamp_scale: AtomicU64,
    used_processing_units: Mutex<PuMask>,
}

impl ThreadPoolBase {
    /// Creates a pool. No thread is started and no unit is marked used.
    pub fn new(
        notifier: Arc<CallbackNotifier>,
        index: usize,
        name: impl Into<String>,
        mode: SchedulerMode,
        thread_offset: usize,
    ) -> Self {
        Self {
            id: PoolId::new(index, name),
            notifier,
            mode: AtomicU32::new(mode.bits()),
            thread_offset: AtomicUsize::new(thread_offset),
            thread_count: AtomicUsize::new(0),
            timestamp_scale: AtomicU64::new(1.0f64.to_bits()),
            used_processing_units: Mutex::new(PuMask::new()),
        }
    }

    /// Records which processing units the pool's `pool_threads` workers use.
    ///
    /// Worker `i` gets the mask the partitioner reports for global thread
    /// `threads_offset + i`. A worker with an empty mask is accounted for by
    /// marking unit `threads_offset + i`. The new mask replaces the old one
    /// in a single step, so concurrent readers see either of them in full.
    pub fn init(
        &self,
        pool_threads: usize,
        threads_offset: usize,
        partitioner: &dyn ResourcePartitioner,
        topology: &dyn Topology,
    ) {
        self.thread_offset.store(threads_offset, Ordering::Release);

        let mut used = PuMask::with_size(topology.hardware_concurrency());
        for global in threads_offset..threads_offset + pool_threads {
            let mask = partitioner.get_pu_mask(global);
            if mask.any() {
                used |= &mask;
            } else {
                used.set(global);
            }
        }

        log::info!(
            "Pool '{}' initialized with {} thread(s) at offset {}, using {} unit(s)",
            self.id,
            pool_threads,
            threads_offset,
            used.count()
        );

        *self.lock_units() = used;
        self.thread_count.store(pool_threads, Ordering::Release);
    }

    /// A snapshot of the processing units the pool's workers occupy.
    pub fn get_used_processing_units(&self) -> PuMask {
        self.lock_units().clone()
    }

    /// The calling thread's index among this pool's workers.
    ///
    /// `None` if the thread is not registered with this pool, even when it
    /// is a worker of another one.
    pub fn get_worker_thread_num(&self) -> Option<usize> {
        thread_num::worker_in_pool(self.id.index())
    }

    /// A human-readable description of the pool.
    pub fn get_description(&self) -> &str {
        self.id.name()
    }

    /// Calibrates the cycle-to-nanosecond factor against `source`.
    ///
    /// Busy-waits for about 100µs. If the cycle counter did not move the
    /// previous factor is kept. Returns the factor in effect afterwards.
    pub fn init_pool_time_scale(&self, source: &dyn TimestampSource) -> f64 {
        match time_scale::calibrate_time_scale(source) {
            Some(scale) => {
                self.timestamp_scale.store(scale.to_bits(), Ordering::Release);
                log::info!("Pool '{}' timestamp scale: {scale} ns/cycle", self.id);
                scale
            }
            None => {
                let scale = self.timestamp_scale();
                log::warn!(
                    "Pool '{}': cycle counter did not advance during calibration, keeping scale {scale}",
                    self.id
                );
                scale
            }
        }
    }

    /// Registers the calling thread as worker `local` of this pool.
    ///
    /// Fires the start callbacks now and the stop callbacks when the guard
    /// is dropped.
    pub fn enter_worker(&self, local: usize, global: usize) -> WorkerGuard {
        WorkerGuard::enter(
            self.id.index(),
            local,
            global,
            self.id.name(),
            self.notifier.clone(),
        )
    }

    /// The pool's identity.
    pub fn pool_id(&self) -> &PoolId {
        &self.id
    }

    /// The pool's position among the runtime's pools.
    pub fn pool_index(&self) -> usize {
        self.id.index()
    }

    /// The pool's name.
    pub fn pool_name(&self) -> &str {
        self.id.name()
    }

    /// Global index of the pool's first worker thread.
    pub fn thread_offset(&self) -> usize {
        self.thread_offset.load(Ordering::Acquire)
    }

    /// Number of worker threads recorded by the last [`init`](Self::init).
    pub fn thread_count(&self) -> usize {
        self.thread_count.load(Ordering::Acquire)
    }

    /// The current scheduler mode.
    pub fn scheduler_mode(&self) -> SchedulerMode {
        SchedulerMode::from_bits_truncate(self.mode.load(Ordering::Acquire))
    }

    /// Replaces the scheduler mode.
    pub fn set_scheduler_mode(&self, mode: SchedulerMode) {
        self.mode.store(mode.bits(), Ordering::Release);
    }

    /// Enables the flags of `mode`.
    pub fn add_scheduler_mode(&self, mode: SchedulerMode) {
        self.mode.fetch_or(mode.bits(), Ordering::AcqRel);
    }

    /// Disables the flags of `mode`.
    pub fn remove_scheduler_mode(&self, mode: SchedulerMode) {
        self.mode.fetch_and(!mode.bits(), Ordering::AcqRel);
    }

    /// Returns `true` if every flag of `mode` is enabled.
    pub fn has_scheduler_mode(&self, mode: SchedulerMode) -> bool {
        self.scheduler_mode().contains(mode)
    }

    /// Nanoseconds per cycle-counter tick. `1.0` until calibrated.
    pub fn timestamp_scale(&self) -> f64 {
        f64::from_bits(self.timestamp_scale.load(Ordering::Acquire))
    }

    /// Converts a cycle-counter delta to nanoseconds.
    pub fn scale_cycles(&self, cycles: u64) -> f64 {
        cycles as f64 * self.timestamp_scale()
    }

    /// The callbacks fired by this pool's workers.
    pub fn notifier(&self) -> &Arc<CallbackNotifier> {
        &self.notifier
    }

    fn lock_units(&self) -> MutexGuard<'_, PuMask> {
        self.used_processing_units
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ThreadPoolBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPoolBase")
            .field("id", &self.id)
            .field("mode", &self.scheduler_mode())
            .field("thread_offset", &self.thread_offset())
            .field("thread_count", &self.thread_count())
            .field("used_processing_units", &self.get_used_processing_units())
            .finish()
    }
}

/// The processing units claimed by more than one of `pools`.
pub fn overlapping_units(pools: &[&ThreadPoolBase]) -> PuMask {
    let mut seen = PuMask::new();
    let mut shared = PuMask::new();
    for pool in pools {
        let used = pool.get_used_processing_units();
        shared |= &(&seen & &used);
        seen |= &used;
    }
    shared
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Cores(usize);

    impl Topology for Cores {
        fn hardware_concurrency(&self) -> usize {
            self.0
        }
    }

    struct Unbound;

    impl ResourcePartitioner for Unbound {
        fn get_pu_mask(&self, _global_thread_num: usize) -> PuMask {
            PuMask::new()
        }
    }

    fn pool(name: &str) -> ThreadPoolBase {
        ThreadPoolBase::new(
            Arc::new(CallbackNotifier::new()),
            0,
            name,
            SchedulerMode::default(),
            0,
        )
    }

    #[test]
    fn test_new_pool_is_empty() {
        let pool = pool("default");
        assert!(!pool.get_used_processing_units().any());
        assert_eq!(pool.timestamp_scale(), 1.0);
        assert_eq!(pool.get_description(), "default");
        assert_eq!(pool.thread_count(), 0);
    }

    #[test]
    fn test_unbound_threads_mark_their_own_unit() {
        let pool = pool("default");
        pool.init(3, 2, &Unbound, &Cores(8));
        assert_eq!(pool.get_used_processing_units(), PuMask::from_units([2, 3, 4]));
        assert_eq!(pool.get_used_processing_units().size(), 8);
        assert_eq!(pool.thread_offset(), 2);
        assert_eq!(pool.thread_count(), 3);
    }

    #[test]
    fn test_reinit_replaces_mask() {
        let pool = pool("default");
        pool.init(4, 0, &Unbound, &Cores(4));
        pool.init(1, 3, &Unbound, &Cores(4));
        assert_eq!(pool.get_used_processing_units(), PuMask::from_units([3]));
    }

    #[test]
    fn test_scheduler_mode_updates() {
        let pool = pool("default");
        assert!(pool.has_scheduler_mode(SchedulerMode::DELAY_EXIT));

        pool.add_scheduler_mode(SchedulerMode::ENABLE_STEALING);
        pool.remove_scheduler_mode(SchedulerMode::DELAY_EXIT);
        assert!(pool.has_scheduler_mode(SchedulerMode::ENABLE_STEALING));
        assert!(!pool.has_scheduler_mode(SchedulerMode::DELAY_EXIT));

        pool.set_scheduler_mode(SchedulerMode::FAST_IDLE_MODE);
        assert_eq!(pool.scheduler_mode(), SchedulerMode::FAST_IDLE_MODE);
    }

    #[test]
    fn test_scale_cycles_uses_default_scale() {
        assert_eq!(pool("default").scale_cycles(250), 250.0);
    }

    #[test]
    fn test_not_a_worker_outside_guard() {
        assert_eq!(pool("default").get_worker_thread_num(), None);
    }
}
