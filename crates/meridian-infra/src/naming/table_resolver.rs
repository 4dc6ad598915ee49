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

use meridian_core::{AddressResolver, CreditRelease, GlobalId, LocalAddress};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

type Reclaimer = Arc<dyn Fn(GlobalId, LocalAddress) + Send + Sync>;

/// A global-id to local-address table.
///
/// Also hands out fresh global ids and receives returned credits: when the
/// last managed reference to an id goes away the binding is removed and the
/// reclaimer, if one is set, is handed the address that was bound.
pub struct TableResolver {
    prefix: u64,
    next: AtomicU64,
    entries: RwLock<HashMap<GlobalId, LocalAddress>>,
    reclaimer: RwLock<Option<Reclaimer>>,
}

impl TableResolver {
    /// Creates an empty table. Ids it allocates have `prefix` as their most
    /// significant half.
    pub fn new(prefix: u64) -> Self {
        Self {
            prefix,
            next: AtomicU64::new(1),
            entries: RwLock::new(HashMap::new()),
            reclaimer: RwLock::new(None),
        }
    }

    /// Sets what happens to the local storage of an id whose last credit
    /// was returned, typically removing it from an
    /// [`InstanceTable`](super::InstanceTable).
    pub fn set_reclaimer<F>(&self, reclaimer: F)
    where
        F: Fn(GlobalId, LocalAddress) + Send + Sync + 'static,
    {
        *self
            .reclaimer
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::new(reclaimer));
    }

    /// Allocates a new id and binds it to `addr`.
    pub fn register(&self, addr: LocalAddress) -> GlobalId {
        let gid = GlobalId::new(self.prefix, self.next.fetch_add(1, Ordering::Relaxed));
        self.bind(gid, addr);
        gid
    }

    /// Binds `gid` to `addr`, replacing any previous binding.
    pub fn bind(&self, gid: GlobalId, addr: LocalAddress) {
        log::debug!("Bound {gid} to {addr}");
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(gid, addr);
    }

    /// Removes the binding of `gid` and returns it.
    pub fn unbind(&self, gid: &GlobalId) -> Option<LocalAddress> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(gid)
    }

    /// Number of bound ids.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Returns `true` if no id is bound.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AddressResolver for TableResolver {
    fn resolve(&self, gid: &GlobalId) -> Option<LocalAddress> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(gid)
            .copied()
    }
}

impl CreditRelease for TableResolver {
    fn release(&self, gid: GlobalId) {
        let Some(addr) = self.unbind(&gid) else {
            return;
        };
        log::debug!("Last credit of {gid} returned, binding removed");
        let reclaimer = self
            .reclaimer
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        if let Some(reclaim) = reclaimer {
            reclaim(gid, addr);
        }
    }
}

impl std::fmt::Debug for TableResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableResolver")
            .field("prefix", &self.prefix)
            .field("len", &self.len())
            .finish()
    }
}
