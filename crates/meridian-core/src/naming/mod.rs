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

//! Naming: global identifiers, local addresses and the collaborator contracts
//! that connect the two.
//!
//! The resolution service itself is out of scope here. This module only
//! describes what the rest of the runtime consumes from it:
//!
//! - [`AddressResolver`] maps a [`GlobalId`] to a [`LocalAddress`].
//! - [`AddressTranslator`] turns the opaque `location` of a local address into
//!   a live, type-erased instance in this process.

mod address;
mod id;

pub use address::{LocalAddress, Locality};
pub use id::{CreditRelease, GlobalId, IdType};

use std::any::Any;
use std::sync::Arc;

/// Maps global identifiers to the address of the object they designate.
pub trait AddressResolver: Send + Sync {
    /// Resolves `gid`.
    ///
    /// Returns `None` if the identifier is unknown to this resolver, which
    /// callers treat the same way as an object living on another locality.
    fn resolve(&self, gid: &GlobalId) -> Option<LocalAddress>;
}

/// Maps a locality-local address to the instance stored there.
pub trait AddressTranslator: Send + Sync {
    /// Returns the instance registered at `addr.location`, if any.
    ///
    /// The returned value is type-erased; callers perform their own
    /// compatibility check before downcasting it.
    fn translate(&self, addr: &LocalAddress) -> Option<Arc<dyn Any + Send + Sync>>;
}
