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

use meridian_core::{AddressTranslator, Component, LocalAddress};
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

type Instance = Arc<dyn Any + Send + Sync>;

/// Owns the component instances living on this locality, keyed by location.
#[derive(Default)]
pub struct InstanceTable {
    next_location: AtomicU64,
    instances: RwLock<HashMap<u64, Instance>>,
}

impl InstanceTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `instance` and returns its location.
    pub fn insert<T: Component>(&self, instance: Arc<T>) -> u64 {
        // Location 0 is never handed out.
        let location = self.next_location.fetch_add(1, Ordering::Relaxed) + 1;
        self.instances
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(location, instance);
        location
    }

    /// Drops the table's reference to the instance at `location`.
    pub fn remove(&self, location: u64) -> bool {
        self.instances
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&location)
            .is_some()
    }

    /// Number of stored instances.
    pub fn len(&self) -> usize {
        self.instances
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Returns `true` if the table holds no instance.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AddressTranslator for InstanceTable {
    fn translate(&self, addr: &LocalAddress) -> Option<Arc<dyn Any + Send + Sync>> {
        self.instances
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&addr.location)
            .cloned()
    }
}

impl std::fmt::Debug for InstanceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceTable")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::{ComponentType, Locality, PinOutcome};

    struct Probe;

    impl Component for Probe {
        fn component_type() -> ComponentType {
            ComponentType::base_only(4)
        }
        fn pin(&self) {}
        fn unpin(&self) -> PinOutcome {
            PinOutcome::StillResident
        }
    }

    #[test]
    fn test_insert_translate_remove() {
        let table = InstanceTable::new();
        let location = table.insert(Arc::new(Probe));
        let addr = LocalAddress::new(Locality(0), Probe::component_type(), location);

        let found = table.translate(&addr).unwrap();
        assert!(found.downcast::<Probe>().is_ok());

        assert!(table.remove(location));
        assert!(table.translate(&addr).is_none());
        assert!(!table.remove(location));
    }

    #[test]
    fn test_locations_are_distinct_and_nonzero() {
        let table = InstanceTable::new();
        let a = table.insert(Arc::new(Probe));
        let b = table.insert(Arc::new(Probe));
        assert_ne!(a, 0);
        assert_ne!(a, b);
        assert_eq!(table.len(), 2);
    }
}
