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

//! The cycle counter used for pool calibration.

use meridian_core::TimestampSource;
use std::time::Instant;

/// Reads the CPU timestamp counter next to a monotonic clock.
///
/// On x86_64 `cycles` is `rdtsc`. Elsewhere it falls back to the monotonic
/// clock in nanoseconds, which calibrates to a scale of about 1.0.
#[derive(Debug, Clone, Copy)]
pub struct HardwareTimestamp {
    origin: Instant,
}

impl HardwareTimestamp {
    /// Creates a source whose wall clock starts at zero now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    fn elapsed_ns(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

impl Default for HardwareTimestamp {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampSource for HardwareTimestamp {
    #[cfg(target_arch = "x86_64")]
    fn cycles(&self) -> u64 {
        // SAFETY: rdtsc is available on every x86_64 CPU and has no
        // memory effects.
        #[allow(unused_unsafe)]
        unsafe {
            core::arch::x86_64::_rdtsc()
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn cycles(&self) -> u64 {
        self.elapsed_ns()
    }

    fn now_ns(&self) -> u64 {
        self.elapsed_ns()
    }
}
