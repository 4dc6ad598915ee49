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

//! sysinfo-based implementation of the Topology trait.

use meridian_core::Topology;
use sysinfo::System;

/// Reports the processing units seen by the `sysinfo` crate.
///
/// The count is read once, at construction.
#[derive(Debug, Clone)]
pub struct SysinfoTopology {
    processing_units: usize,
}

impl SysinfoTopology {
    /// Queries the current machine.
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        let mut processing_units = system.cpus().len();
        if processing_units == 0 {
            // Some sandboxes hide /proc; fall back to what std can see.
            processing_units = std::thread::available_parallelism()
                .map(usize::from)
                .unwrap_or(1);
            log::warn!("sysinfo reported no CPUs, assuming {processing_units}");
        }
        log::debug!("Detected {processing_units} processing unit(s)");
        Self { processing_units }
    }

    /// A topology with a fixed unit count.
    pub fn with_units(processing_units: usize) -> Self {
        Self { processing_units }
    }
}

impl Default for SysinfoTopology {
    fn default() -> Self {
        Self::new()
    }
}

impl Topology for SysinfoTopology {
    fn hardware_concurrency(&self) -> usize {
        self.processing_units
    }
}
