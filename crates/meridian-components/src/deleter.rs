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

//! A type-indexed table of deletion functions.
//!
//! When a migration-aware handle finds out that its instance was relocated
//! while pinned, the local storage left behind has to be reclaimed. How to do
//! that depends on the component type, so each type registers a [`Deleter`]
//! here, keyed by its [`ComponentType`].

use meridian_core::{Component, ComponentType, GlobalId, LocalAddress};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Reclaims the local storage of a component instance.
///
/// Receives the instance's global id and the address of the orphaned local
/// storage.
pub type Deleter = Arc<dyn Fn(GlobalId, LocalAddress) + Send + Sync>;

/// A thread-safe registry of deleters keyed by [`ComponentType`].
#[derive(Default)]
pub struct DeleterRegistry {
    deleters: RwLock<HashMap<ComponentType, Deleter>>,
}

impl DeleterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the deleter for `component_type`, replacing any previous one.
    pub fn register<F>(&self, component_type: ComponentType, deleter: F)
    where
        F: Fn(GlobalId, LocalAddress) + Send + Sync + 'static,
    {
        let mut deleters = self
            .deleters
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if deleters
            .insert(component_type, Arc::new(deleter))
            .is_some()
        {
            log::debug!("DeleterRegistry: replaced deleter for {component_type}");
        } else {
            log::debug!("DeleterRegistry: registered deleter for {component_type}");
        }
    }

    /// Registers the deleter for component type `T`.
    pub fn register_for<T, F>(&self, deleter: F)
    where
        T: Component,
        F: Fn(GlobalId, LocalAddress) + Send + Sync + 'static,
    {
        self.register(T::component_type(), deleter);
    }

    /// Looks up the deleter registered for `component_type`.
    #[must_use]
    pub fn deleter_for(&self, component_type: ComponentType) -> Option<Deleter> {
        self.deleters
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&component_type)
            .cloned()
    }

    /// Returns `true` if a deleter is registered for `component_type`.
    #[must_use]
    pub fn contains(&self, component_type: ComponentType) -> bool {
        self.deleters
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(&component_type)
    }

    /// Returns the number of registered deleters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deleters
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Returns `true` if no deleter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for DeleterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let deleters = self
            .deleters
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f.debug_struct("DeleterRegistry")
            .field("types", &deleters.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::Locality;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_register_and_lookup() {
        let registry = DeleterRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        registry.register(ComponentType::base_only(3), move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let deleter = registry.deleter_for(ComponentType::base_only(3)).unwrap();
        deleter(
            GlobalId::new(0, 1),
            LocalAddress::new(Locality(0), ComponentType::base_only(3), 0x8),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_deleter_returns_none() {
        let registry = DeleterRegistry::new();
        assert!(registry.deleter_for(ComponentType::base_only(1)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup_is_exact_on_type_tag() {
        let registry = DeleterRegistry::new();
        registry.register(ComponentType::from_parts(5, 1), |_, _| {});
        assert!(registry.contains(ComponentType::from_parts(5, 1)));
        assert!(!registry.contains(ComponentType::base_only(5)));
    }

    #[test]
    fn test_replace_deleter() {
        let registry = DeleterRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        registry.register(ComponentType::base_only(2), |_, _| {});
        let counter = hits.clone();
        registry.register(ComponentType::base_only(2), move |_, _| {
            counter.fetch_add(10, Ordering::SeqCst);
        });
        assert_eq!(registry.len(), 1);

        let deleter = registry.deleter_for(ComponentType::base_only(2)).unwrap();
        deleter(
            GlobalId::new(0, 2),
            LocalAddress::new(Locality(0), ComponentType::base_only(2), 0),
        );
        assert_eq!(hits.load(Ordering::SeqCst), 10);
    }
}
