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

//! Errors reported when acquiring a local handle to a component.

use crate::component::ComponentType;
use crate::naming::{GlobalId, LocalAddress, Locality};
use thiserror::Error;

/// Why a local handle could not be produced.
///
/// Both kinds are terminal for the call that produced them. The object may
/// have moved since it was resolved, so the caller decides whether to
/// re-resolve and retry or to route the request elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquireError {
    /// The id does not designate an object living on the calling locality.
    #[error(
        "the given component id {gid} does not belong to a local object \
         (current {current}, resolved {resolved:?}, requested {requested})"
    )]
    WrongLocality {
        /// The id that was looked up.
        gid: GlobalId,
        /// The type the caller asked for.
        requested: ComponentType,
        /// The calling locality.
        current: Locality,
        /// The address the resolver produced, `None` if it knew nothing.
        resolved: Option<LocalAddress>,
    },
    /// The object exists locally but its type cannot be accessed as requested.
    #[error(
        "requested component type {requested} does not match the given component id {gid} \
         (resolved {resolved})"
    )]
    TypeMismatch {
        /// The id that was looked up.
        gid: GlobalId,
        /// The type the caller asked for.
        requested: ComponentType,
        /// The resolved address, carrying the stored type.
        resolved: LocalAddress,
    },
}

impl AcquireError {
    /// The id the failed acquisition was about.
    pub fn gid(&self) -> GlobalId {
        match self {
            AcquireError::WrongLocality { gid, .. } | AcquireError::TypeMismatch { gid, .. } => *gid,
        }
    }

    /// The address the resolver produced, if any.
    pub fn resolved(&self) -> Option<LocalAddress> {
        match self {
            AcquireError::WrongLocality { resolved, .. } => *resolved,
            AcquireError::TypeMismatch { resolved, .. } => Some(*resolved),
        }
    }

    /// The type the caller asked for.
    pub fn requested(&self) -> ComponentType {
        match self {
            AcquireError::WrongLocality { requested, .. }
            | AcquireError::TypeMismatch { requested, .. } => *requested,
        }
    }
}
