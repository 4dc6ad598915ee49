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

use serde::{Deserialize, Serialize};

crate::meridian_bitflags! {
    /// Behavioural switches a pool hands to its scheduler.
    pub struct SchedulerMode: u32 {
        /// Worker threads run background work (e.g. network polling) when idle.
        const DO_BACKGROUND_WORK = 1 << 0;
        /// Lower the OS priority of worker threads.
        const REDUCE_THREAD_PRIORITY = 1 << 1;
        /// Linger briefly before letting an idle worker exit.
        const DELAY_EXIT = 1 << 2;
        /// Back off faster when the pool has no work.
        const FAST_IDLE_MODE = 1 << 3;
        /// Allow processing units to be added to or removed from the pool.
        const ENABLE_ELASTICITY = 1 << 4;
        /// Allow workers to steal from each other's queues.
        const ENABLE_STEALING = 1 << 5;
    }
}

impl SchedulerMode {
    /// Combines a list of named flags. An empty list yields the default mode.
    pub fn from_flags(flags: &[SchedulerModeFlag]) -> Self {
        if flags.is_empty() {
            return Self::default();
        }
        flags
            .iter()
            .fold(Self::EMPTY, |mode, flag| mode | Self::from(*flag))
    }
}

impl Default for SchedulerMode {
    fn default() -> Self {
        Self::DO_BACKGROUND_WORK | Self::REDUCE_THREAD_PRIORITY | Self::DELAY_EXIT
    }
}

/// A single [`SchedulerMode`] flag, by name. Used in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum SchedulerModeFlag {
    DoBackgroundWork,
    ReduceThreadPriority,
    DelayExit,
    FastIdleMode,
    EnableElasticity,
    EnableStealing,
}

impl From<SchedulerModeFlag> for SchedulerMode {
    fn from(flag: SchedulerModeFlag) -> Self {
        match flag {
            SchedulerModeFlag::DoBackgroundWork => SchedulerMode::DO_BACKGROUND_WORK,
            SchedulerModeFlag::ReduceThreadPriority => SchedulerMode::REDUCE_THREAD_PRIORITY,
            SchedulerModeFlag::DelayExit => SchedulerMode::DELAY_EXIT,
            SchedulerModeFlag::FastIdleMode => SchedulerMode::FAST_IDLE_MODE,
            SchedulerModeFlag::EnableElasticity => SchedulerMode::ENABLE_ELASTICITY,
            SchedulerModeFlag::EnableStealing => SchedulerMode::ENABLE_STEALING,
        }
    }
}
