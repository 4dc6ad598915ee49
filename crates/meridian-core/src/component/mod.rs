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

//! The capability contract every component type satisfies.
//!
//! A component is a server-side object addressable by a global id. It may be
//! relocated ("migrated") to another locality, and the only thing standing
//! between a local caller and a dangling reference is the component's pin
//! count: while it is non-zero the relocation subsystem must leave the
//! instance in place, and the next [`Component::unpin`] tells the caller
//! whether a relocation happened in the meantime.

use crate::naming::{IdType, LocalAddress};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// A component type tag.
///
/// The low 16 bits carry the *base* type, the high 16 bits an optional
/// *derived* type. A derived server type is accepted wherever its base type
/// is requested (see [`types_are_compatible`]).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentType(pub u32);

impl ComponentType {
    /// Tag of an object whose type is unknown. Compatible with nothing.
    pub const INVALID: Self = Self(u32::MAX);

    /// Builds a tag from a base and a derived part.
    pub const fn from_parts(base: u16, derived: u16) -> Self {
        Self(((derived as u32) << 16) | base as u32)
    }

    /// Builds a tag for a base type with no derived part.
    pub const fn base_only(base: u16) -> Self {
        Self::from_parts(base, 0)
    }

    /// The base part of the tag.
    pub const fn base(&self) -> u16 {
        (self.0 & 0xffff) as u16
    }

    /// The derived part of the tag, 0 when there is none.
    pub const fn derived(&self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Returns `true` unless this is [`ComponentType::INVALID`].
    pub const fn is_valid(&self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "ComponentType({}:{})", self.base(), self.derived())
        } else {
            write!(f, "ComponentType(invalid)")
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "type[{}:{}]", self.base(), self.derived())
        } else {
            write!(f, "type[invalid]")
        }
    }
}

/// Returns `true` if an object stored with type `stored` may be accessed as
/// `requested`.
///
/// Identical tags are compatible, and so are tags sharing the same base type.
/// An invalid tag on either side is never compatible.
pub fn types_are_compatible(requested: ComponentType, stored: ComponentType) -> bool {
    if !requested.is_valid() || !stored.is_valid() {
        return false;
    }
    requested == stored || requested.base() == stored.base()
}

/// What `unpin` observed about the pinned interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    /// The instance stayed on this locality.
    StillResident,
    /// The instance was relocated elsewhere while it was pinned; the local
    /// storage is now orphaned.
    Relocated,
}

impl PinOutcome {
    /// Returns `true` for [`PinOutcome::Relocated`].
    pub fn was_relocated(&self) -> bool {
        matches!(self, PinOutcome::Relocated)
    }
}

impl From<bool> for PinOutcome {
    fn from(relocated: bool) -> Self {
        if relocated {
            PinOutcome::Relocated
        } else {
            PinOutcome::StillResident
        }
    }
}

/// The capability set every component type provides.
///
/// Implementations own their pin count and its locking; `pin` and `unpin`
/// may be called concurrently from any thread, and concurrently with a
/// relocation attempt.
pub trait Component: Any + Send + Sync {
    /// The tag this type is registered under.
    fn component_type() -> ComponentType
    where
        Self: Sized;

    /// Registers one referrer, making the instance ineligible for relocation.
    fn pin(&self);

    /// Removes one referrer and reports whether the instance was relocated
    /// while it was pinned.
    fn unpin(&self) -> PinOutcome;

    /// Returns `true` if the object at `addr` may be accessed as `Self`.
    fn is_compatible(addr: &LocalAddress) -> bool
    where
        Self: Sized,
    {
        types_are_compatible(Self::component_type(), addr.component_type)
    }
}

/// A client-side proxy for a component living somewhere in the system.
pub trait Client {
    /// The server-side component type this proxy talks to.
    type Server: Component;

    /// The global id of the server-side instance.
    fn id(&self) -> &IdType;
}
