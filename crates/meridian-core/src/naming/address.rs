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

use crate::component::ComponentType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One execution/address-space domain of the distributed runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Locality(pub u32);

impl Locality {
    /// Sentinel for "no locality".
    pub const INVALID: Self = Self(u32::MAX);

    /// Returns `true` unless this is [`Locality::INVALID`].
    pub const fn is_valid(&self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "locality#{}", self.0)
    }
}

/// Where an object referred to by a global id currently lives.
///
/// `location` is an opaque key understood by the locality's
/// [`AddressTranslator`](super::AddressTranslator). It is never treated as a
/// memory address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalAddress {
    /// The locality hosting the object.
    pub locality: Locality,
    /// The type tag the object was registered with.
    pub component_type: ComponentType,
    /// The locality-local key of the object.
    pub location: u64,
}

impl LocalAddress {
    /// Creates a new address.
    pub const fn new(locality: Locality, component_type: ComponentType, location: u64) -> Self {
        Self {
            locality,
            component_type,
            location,
        }
    }
}

impl fmt::Display for LocalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {:#x})",
            self.locality, self.component_type, self.location
        )
    }
}
