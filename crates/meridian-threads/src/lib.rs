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

//! Worker-thread pool bookkeeping.
//!
//! [`ThreadPoolBase`] carries what every concrete scheduler pool shares: its
//! identity, the processing units its workers occupy, its scheduler mode and
//! the factor that turns cycle-counter deltas into nanoseconds. Spawning and
//! scheduling work is left to the pools built on top of it.

#![warn(missing_docs)]

mod notifier;
mod pool;
mod thread_num;
mod time_scale;

pub use notifier::{CallbackNotifier, ErrorCallback, ThreadCallback};
pub use pool::{overlapping_units, ThreadPoolBase};
pub use thread_num::{current_worker, WorkerGuard};
pub use time_scale::{calibrate_time_scale, CALIBRATION_WINDOW_NS};
