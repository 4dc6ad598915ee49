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

//! A fixed thread-to-unit assignment.

use crate::config::BindPolicy;
use meridian_core::{PuMask, ResourcePartitioner};

/// Binds worker threads to processing units following a [`BindPolicy`].
///
/// Units are assumed to be grouped in cores of `smt_width` consecutive
/// units. Global thread numbers past the last unit wrap around. Pools that
/// together have more threads than there are units end up sharing units;
/// `overlapping_units` in `meridian-threads` reports those.
#[derive(Debug, Clone)]
pub struct StaticPartitioner {
    policy: BindPolicy,
    units: usize,
    smt_width: usize,
}

impl StaticPartitioner {
    /// Binds threads over `units` processing units, one unit per core.
    pub fn new(policy: BindPolicy, units: usize) -> Self {
        Self {
            policy,
            units,
            smt_width: 1,
        }
    }

    /// Sets how many consecutive units share a core. Used by
    /// [`BindPolicy::Scatter`].
    pub fn with_smt_width(mut self, smt_width: usize) -> Self {
        self.smt_width = smt_width.max(1);
        self
    }

    /// The policy in effect.
    pub fn policy(&self) -> BindPolicy {
        self.policy
    }

    /// The unit assigned to `global_thread_num`, or `None` if unbound.
    pub fn unit_for(&self, global_thread_num: usize) -> Option<usize> {
        if self.units == 0 {
            return None;
        }
        let slot = global_thread_num % self.units;
        match self.policy {
            BindPolicy::None => None,
            BindPolicy::Compact => Some(slot),
            BindPolicy::Scatter => {
                let cores = (self.units / self.smt_width).max(1);
                let unit = (slot % cores) * self.smt_width + slot / cores;
                // Leftover units when `units` is not a multiple of the width.
                Some(if unit < self.units { unit } else { slot })
            }
        }
    }
}

impl ResourcePartitioner for StaticPartitioner {
    fn get_pu_mask(&self, global_thread_num: usize) -> PuMask {
        let mut mask = PuMask::with_size(self.units);
        if let Some(unit) = self.unit_for(global_thread_num) {
            mask.set(unit);
        }
        mask
    }
}
