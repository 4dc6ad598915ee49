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

//! Cycle-counter to nanosecond calibration.

use meridian_core::TimestampSource;

/// How long the calibration busy-waits, in nanoseconds.
pub const CALIBRATION_WINDOW_NS: u64 = 100_000;

/// Measures how many nanoseconds one tick of `source`'s cycle counter lasts.
///
/// Reads both clocks, spins until more than [`CALIBRATION_WINDOW_NS`] have
/// passed on the wall clock, then divides the elapsed time by the elapsed
/// cycles. Returns `None` if the cycle counter did not move. Both deltas
/// use wrapping arithmetic.
pub fn calibrate_time_scale(source: &dyn TimestampSource) -> Option<f64> {
    let start_cycles = source.cycles();
    let start_ns = source.now_ns();

    let mut end_cycles = source.cycles();
    let mut end_ns = source.now_ns();
    while end_ns.wrapping_sub(start_ns) <= CALIBRATION_WINDOW_NS {
        std::hint::spin_loop();
        end_cycles = source.cycles();
        end_ns = source.now_ns();
    }

    let cycles = end_cycles.wrapping_sub(start_cycles);
    if cycles == 0 {
        return None;
    }
    Some(end_ns.wrapping_sub(start_ns) as f64 / cycles as f64)
}
