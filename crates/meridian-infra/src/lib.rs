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

//! Concrete collaborators for the meridian runtime.
//!
//! `meridian-core` only states contracts. This crate fulfils them against
//! the real machine (processing-unit count, cycle counter) and provides
//! in-memory naming tables good enough for a single process.

#![warn(missing_docs)]

pub mod config;
pub mod logging;
pub mod naming;
pub mod partition;
pub mod platform;

pub use config::{BindPolicy, ConfigError, PoolConfig, PoolLayout, RuntimeConfig};
pub use naming::{InstanceTable, TableResolver};
pub use partition::StaticPartitioner;
pub use platform::{HardwareTimestamp, SysinfoTopology};
