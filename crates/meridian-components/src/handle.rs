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

use crate::release::{Release, ReleaseStrategy};
use meridian_core::{Component, GlobalId, LocalAddress, PinOutcome};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// An owning, pinned reference to a local component instance.
///
/// While the handle exists the instance holds one pin on its behalf, so the
/// relocation subsystem leaves it in place. The handle also keeps a clone of
/// the id it was acquired through, holding the component alive.
///
/// Dropping the handle runs its [`Release`] exactly once. Use
/// [`ComponentHandle::release`] to release early and observe the unpin
/// result.
pub struct ComponentHandle<T: Component> {
    instance: Arc<T>,
    gid: GlobalId,
    address: LocalAddress,
    release: Option<Release<T>>,
}

impl<T: Component> ComponentHandle<T> {
    pub(crate) fn new(
        instance: Arc<T>,
        gid: GlobalId,
        address: LocalAddress,
        release: Release<T>,
    ) -> Self {
        Self {
            instance,
            gid,
            address,
            release: Some(release),
        }
    }

    /// The global id this handle was acquired through.
    pub fn gid(&self) -> GlobalId {
        self.gid
    }

    /// The address the instance was resolved to at acquisition time.
    pub fn address(&self) -> LocalAddress {
        self.address
    }

    /// Returns `true` if dropping this handle follows the migration-aware
    /// discipline.
    pub fn is_migration_aware(&self) -> bool {
        matches!(
            self.release.as_ref().map(Release::strategy),
            Some(ReleaseStrategy::ForMigration { .. })
        )
    }

    /// Releases the handle now and returns what `unpin` reported.
    pub fn release(mut self) -> PinOutcome {
        match self.release.take() {
            Some(release) => release.run(),
            None => PinOutcome::StillResident,
        }
    }
}

impl<T: Component> Deref for ComponentHandle<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.instance
    }
}

impl<T: Component> Drop for ComponentHandle<T> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release.run();
        }
    }
}

impl<T: Component> fmt::Debug for ComponentHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("gid", &self.gid)
            .field("address", &self.address)
            .field("migration_aware", &self.is_migration_aware())
            .finish()
    }
}
