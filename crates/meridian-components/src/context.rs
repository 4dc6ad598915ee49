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

//! The acquisition side of the pin protocol.

use crate::deleter::DeleterRegistry;
use crate::handle::ComponentHandle;
use crate::release::{Release, ReleaseStrategy};
use meridian_core::{
    AcquireError, AddressResolver, AddressTranslator, Client, Component, IdType, LocalAddress,
    Locality,
};
use std::sync::Arc;

/// Everything a locality needs to hand out local component handles.
///
/// Acquisition is synchronous and never suspends. Failures are reported
/// as [`AcquireError`] and are never retried here.
#[derive(Clone)]
pub struct ComponentContext {
    locality: Locality,
    resolver: Arc<dyn AddressResolver>,
    translator: Arc<dyn AddressTranslator>,
    deleters: Arc<DeleterRegistry>,
}

impl ComponentContext {
    /// Creates the context of `locality`.
    pub fn new(
        locality: Locality,
        resolver: Arc<dyn AddressResolver>,
        translator: Arc<dyn AddressTranslator>,
        deleters: Arc<DeleterRegistry>,
    ) -> Self {
        Self {
            locality,
            resolver,
            translator,
            deleters,
        }
    }

    /// The calling locality.
    pub fn locality(&self) -> Locality {
        self.locality
    }

    /// The deleters consulted by migration-aware handles.
    pub fn deleters(&self) -> &Arc<DeleterRegistry> {
        &self.deleters
    }

    /// Returns a pinned handle to the local instance designated by `id`.
    ///
    /// Fails with [`AcquireError::WrongLocality`] if the instance is not on
    /// this locality and with [`AcquireError::TypeMismatch`] if it cannot be
    /// accessed as `T`. The instance is pinned only on success.
    pub fn get_ptr<T: Component>(&self, id: &IdType) -> Result<ComponentHandle<T>, AcquireError> {
        let addr = self.resolve::<T>(id)?;
        self.postproc(&addr, id, ReleaseStrategy::Ordinary)
    }

    /// Returns a pinned handle to the server-side instance behind `client`.
    pub fn get_ptr_from_client<C: Client>(
        &self,
        client: &C,
    ) -> Result<ComponentHandle<C::Server>, AcquireError> {
        self.get_ptr::<C::Server>(client.id())
    }

    /// Like [`get_ptr`](Self::get_ptr), but the handle uses the
    /// migration-aware release: if the instance turns out to have been
    /// relocated while pinned, dropping the handle reclaims its orphaned
    /// local storage.
    pub fn get_ptr_for_migration<T: Component>(
        &self,
        id: &IdType,
    ) -> Result<ComponentHandle<T>, AcquireError> {
        let addr = self.resolve::<T>(id)?;
        self.get_ptr_for_migration_resolved(&addr, id)
    }

    /// Migration-aware acquisition for callers that already resolved `id`.
    ///
    /// `addr` is still checked against the calling locality.
    pub fn get_ptr_for_migration_resolved<T: Component>(
        &self,
        addr: &LocalAddress,
        id: &IdType,
    ) -> Result<ComponentHandle<T>, AcquireError> {
        let strategy = ReleaseStrategy::ForMigration {
            locality: self.locality,
            deleters: self.deleters.clone(),
        };
        self.postproc(addr, id, strategy)
    }

    fn resolve<T: Component>(&self, id: &IdType) -> Result<LocalAddress, AcquireError> {
        let gid = id.gid();
        self.resolver
            .resolve(&gid)
            .ok_or(AcquireError::WrongLocality {
                gid,
                requested: T::component_type(),
                current: self.locality,
                resolved: None,
            })
    }

    fn postproc<T: Component>(
        &self,
        addr: &LocalAddress,
        id: &IdType,
        strategy: ReleaseStrategy,
    ) -> Result<ComponentHandle<T>, AcquireError> {
        let gid = id.gid();
        let requested = T::component_type();

        if addr.locality != self.locality {
            return Err(AcquireError::WrongLocality {
                gid,
                requested,
                current: self.locality,
                resolved: Some(*addr),
            });
        }

        if !T::is_compatible(addr) {
            return Err(AcquireError::TypeMismatch {
                gid,
                requested,
                resolved: *addr,
            });
        }

        let erased = self
            .translator
            .translate(addr)
            .ok_or(AcquireError::WrongLocality {
                gid,
                requested,
                current: self.locality,
                resolved: Some(*addr),
            })?;
        let instance = erased
            .downcast::<T>()
            .map_err(|_| AcquireError::TypeMismatch {
                gid,
                requested,
                resolved: *addr,
            })?;

        let release = Release::new(instance.clone(), id.clone(), addr.location, strategy);
        instance.pin();
        log::debug!("Pinned component {gid} at {addr}");

        Ok(ComponentHandle::new(instance, gid, *addr, release))
    }
}

impl std::fmt::Debug for ComponentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentContext")
            .field("locality", &self.locality)
            .field("deleters", &self.deleters)
            .finish()
    }
}
