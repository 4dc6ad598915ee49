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

//! A trivial component every worker touches once at startup, to check that
//! local acquisition works on the configured locality.

use meridian_components::{ComponentContext, DeleterRegistry};
use meridian_core::{Component, ComponentType, IdType, LocalAddress, Locality, PinOutcome};
use meridian_infra::{InstanceTable, TableResolver};
use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts the workers that checked in.
#[derive(Debug, Default)]
pub struct CheckIn {
    pins: AtomicIsize,
    visits: AtomicUsize,
}

impl CheckIn {
    /// Records one visit.
    pub fn visit(&self) {
        self.visits.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of recorded visits.
    pub fn visits(&self) -> usize {
        self.visits.load(Ordering::Relaxed)
    }

    /// Current pin count.
    pub fn pins(&self) -> isize {
        self.pins.load(Ordering::Acquire)
    }
}

impl Component for CheckIn {
    fn component_type() -> ComponentType {
        ComponentType::base_only(1)
    }

    fn pin(&self) {
        self.pins.fetch_add(1, Ordering::AcqRel);
    }

    fn unpin(&self) -> PinOutcome {
        self.pins.fetch_sub(1, Ordering::AcqRel);
        // Never relocated: this runtime has no relocation subsystem.
        PinOutcome::StillResident
    }
}

/// Builds the naming tables of `locality` and a context over them.
///
/// Instances whose id loses its last credit are dropped from the instance
/// table.
pub fn local_naming(
    locality: Locality,
) -> (Arc<TableResolver>, Arc<InstanceTable>, ComponentContext) {
    let resolver = Arc::new(TableResolver::new(u64::from(locality.0)));
    let instances = Arc::new(InstanceTable::new());
    let table = instances.clone();
    resolver.set_reclaimer(move |_, addr| {
        table.remove(addr.location);
    });
    let context = ComponentContext::new(
        locality,
        resolver.clone(),
        instances.clone(),
        Arc::new(DeleterRegistry::new()),
    );
    (resolver, instances, context)
}

/// A [`CheckIn`] instance registered in the local naming tables.
pub struct Probe {
    context: ComponentContext,
    pub id: IdType,
    pub instance: Arc<CheckIn>,
}

impl Probe {
    /// Registers a fresh [`CheckIn`] on `context`'s locality.
    pub fn register(
        context: ComponentContext,
        resolver: &Arc<TableResolver>,
        instances: &Arc<InstanceTable>,
    ) -> Self {
        let instance = Arc::new(CheckIn::default());
        let location = instances.insert(instance.clone());
        let addr = LocalAddress::new(context.locality(), CheckIn::component_type(), location);
        let gid = resolver.register(addr);

        let table = instances.clone();
        context
            .deleters()
            .register_for::<CheckIn, _>(move |_, addr| {
                table.remove(addr.location);
            });

        Self {
            context,
            id: IdType::managed(gid, resolver.clone()),
            instance,
        }
    }

    /// Acquires the instance once and records a visit.
    pub fn check_in(&self) -> anyhow::Result<()> {
        let handle = self.context.get_ptr::<CheckIn>(&self.id)?;
        handle.visit();
        Ok(())
    }
}
