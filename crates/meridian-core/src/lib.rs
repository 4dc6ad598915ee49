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

//! # Meridian Core
//!
//! Foundational crate containing the data model and the interface contracts
//! shared by the rest of the runtime.
//!
//! Nothing in here talks to the naming service, the hardware or the
//! scheduler directly. Those are collaborators, described by the traits in
//! [`naming`], [`component`] and [`threads`], and implemented elsewhere
//! (`meridian-infra` ships in-process reference implementations).

#![warn(missing_docs)]

pub mod component;
pub mod error;
pub mod naming;
pub mod threads;
pub mod utils;

pub use component::{types_are_compatible, Client, Component, ComponentType, PinOutcome};
pub use error::AcquireError;
pub use naming::{
    AddressResolver, AddressTranslator, CreditRelease, GlobalId, IdType, LocalAddress, Locality,
};
pub use threads::{
    PoolId, PuMask, ResourcePartitioner, SchedulerMode, SchedulerModeFlag, TimestampSource,
    Topology,
};
