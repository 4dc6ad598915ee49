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

//! Global identifiers and the credit-carrying references built on top of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A raw, 128-bit global identifier.
///
/// A `GlobalId` is plain data: copying it carries no ownership. The
/// credit-carrying form is [`IdType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GlobalId {
    /// The most significant 64 bits.
    pub msb: u64,
    /// The least significant 64 bits.
    pub lsb: u64,
}

impl GlobalId {
    /// The all-zero identifier, never assigned to a live object.
    pub const INVALID: Self = Self { msb: 0, lsb: 0 };

    /// Creates an identifier from its two halves.
    pub const fn new(msb: u64, lsb: u64) -> Self {
        Self { msb, lsb }
    }

    /// Returns `true` unless this is [`GlobalId::INVALID`].
    pub const fn is_valid(&self) -> bool {
        self.msb != 0 || self.lsb != 0
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{:016x}, {:016x}}}", self.msb, self.lsb)
    }
}

/// The naming-service side of a credit-carrying reference.
///
/// When the last clone of a managed [`IdType`] goes away, the credit it held
/// is returned through this sink. What happens next (decrementing a
/// distributed reference count, deleting the object) belongs to the naming
/// collaborator.
pub trait CreditRelease: Send + Sync {
    /// Returns the credit held for `gid`.
    fn release(&self, gid: GlobalId);
}

struct ManagedId {
    gid: GlobalId,
    sink: Option<Arc<dyn CreditRelease>>,
}

impl Drop for ManagedId {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.release(self.gid);
        }
    }
}

/// An opaque distributed reference carrying an implicit reference-count credit.
///
/// Cloning shares the credit. The credit is released exactly once, when the
/// last clone is dropped or [invalidated](IdType::invalidate).
#[derive(Clone, Default)]
pub struct IdType {
    inner: Option<Arc<ManagedId>>,
}

impl IdType {
    /// An id that refers to nothing.
    pub const INVALID: Self = Self { inner: None };

    /// Creates a managed id whose credit is returned to `sink`.
    pub fn managed(gid: GlobalId, sink: Arc<dyn CreditRelease>) -> Self {
        Self {
            inner: Some(Arc::new(ManagedId {
                gid,
                sink: Some(sink),
            })),
        }
    }

    /// Creates an id that carries no credit.
    pub fn unmanaged(gid: GlobalId) -> Self {
        Self {
            inner: Some(Arc::new(ManagedId { gid, sink: None })),
        }
    }

    /// The raw identifier, or [`GlobalId::INVALID`] once invalidated.
    pub fn gid(&self) -> GlobalId {
        self.inner
            .as_ref()
            .map(|inner| inner.gid)
            .unwrap_or(GlobalId::INVALID)
    }

    /// Returns `true` while this reference still points at something.
    pub fn is_valid(&self) -> bool {
        self.inner.is_some()
    }

    /// Returns `true` if this reference carries credit.
    pub fn is_managed(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|inner| inner.sink.is_some())
    }

    /// Number of live clones sharing this reference (0 once invalidated).
    pub fn share_count(&self) -> usize {
        self.inner.as_ref().map_or(0, Arc::strong_count)
    }

    /// Drops this clone's share of the credit and turns it into [`IdType::INVALID`].
    pub fn invalidate(&mut self) {
        self.inner = None;
    }
}

impl fmt::Debug for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdType")
            .field("gid", &self.gid())
            .field("managed", &self.is_managed())
            .finish()
    }
}

impl PartialEq for IdType {
    fn eq(&self, other: &Self) -> bool {
        self.gid() == other.gid()
    }
}

impl Eq for IdType {}

impl From<GlobalId> for IdType {
    fn from(gid: GlobalId) -> Self {
        Self::unmanaged(gid)
    }
}
