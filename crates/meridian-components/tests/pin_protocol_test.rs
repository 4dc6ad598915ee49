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

use meridian_components::{ComponentContext, DeleterRegistry};
use meridian_core::{
    AcquireError, AddressResolver, AddressTranslator, Client, Component, ComponentType,
    CreditRelease, GlobalId, IdType, LocalAddress, Locality, PinOutcome,
};
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicIsize, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;

// --- FAKE COLLABORATORS FOR THIS TEST ---

const HERE: Locality = Locality(0);
const ELSEWHERE: Locality = Locality(1);

#[derive(Default)]
struct FakeNaming {
    addrs: RwLock<HashMap<GlobalId, LocalAddress>>,
    instances: RwLock<HashMap<u64, Arc<dyn Any + Send + Sync>>>,
}

impl FakeNaming {
    fn bind<T: Component>(&self, gid: GlobalId, locality: Locality, location: u64, instance: Arc<T>) {
        self.bind_as(gid, locality, T::component_type(), location, instance);
    }

    fn bind_as<T: Component>(
        &self,
        gid: GlobalId,
        locality: Locality,
        component_type: ComponentType,
        location: u64,
        instance: Arc<T>,
    ) {
        self.addrs
            .write()
            .unwrap()
            .insert(gid, LocalAddress::new(locality, component_type, location));
        self.instances.write().unwrap().insert(location, instance);
    }
}

impl AddressResolver for FakeNaming {
    fn resolve(&self, gid: &GlobalId) -> Option<LocalAddress> {
        self.addrs.read().unwrap().get(gid).copied()
    }
}

impl AddressTranslator for FakeNaming {
    fn translate(&self, addr: &LocalAddress) -> Option<Arc<dyn Any + Send + Sync>> {
        self.instances.read().unwrap().get(&addr.location).cloned()
    }
}

#[derive(Default)]
struct CreditLedger {
    released: AtomicUsize,
}

impl CreditRelease for CreditLedger {
    fn release(&self, _gid: GlobalId) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

// --- DUMMY COMPONENTS FOR THIS TEST ---

#[derive(Default)]
struct Accumulator {
    pins: AtomicIsize,
    min_seen: AtomicIsize,
    relocated: AtomicBool,
}

impl Accumulator {
    fn pins(&self) -> isize {
        self.pins.load(Ordering::SeqCst)
    }
}

impl Component for Accumulator {
    fn component_type() -> ComponentType {
        ComponentType::base_only(100)
    }
    fn pin(&self) {
        self.pins.fetch_add(1, Ordering::SeqCst);
    }
    fn unpin(&self) -> PinOutcome {
        let now = self.pins.fetch_sub(1, Ordering::SeqCst) - 1;
        self.min_seen.fetch_min(now, Ordering::SeqCst);
        PinOutcome::from(self.relocated.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
struct Directory {
    pins: AtomicIsize,
}

impl Component for Directory {
    fn component_type() -> ComponentType {
        ComponentType::base_only(200)
    }
    fn pin(&self) {
        self.pins.fetch_add(1, Ordering::SeqCst);
    }
    fn unpin(&self) -> PinOutcome {
        self.pins.fetch_sub(1, Ordering::SeqCst);
        PinOutcome::StillResident
    }
}

struct AccumulatorClient {
    id: IdType,
}

impl Client for AccumulatorClient {
    type Server = Accumulator;

    fn id(&self) -> &IdType {
        &self.id
    }
}

fn setup() -> (Arc<FakeNaming>, ComponentContext) {
    let naming = Arc::new(FakeNaming::default());
    let ctx = ComponentContext::new(
        HERE,
        naming.clone(),
        naming.clone(),
        Arc::new(DeleterRegistry::new()),
    );
    (naming, ctx)
}

#[test]
fn test_pin_count_follows_handle_lifetime() {
    let (naming, ctx) = setup();
    let acc = Arc::new(Accumulator::default());
    let gid = GlobalId::new(1, 1);
    naming.bind(gid, HERE, 0x100, acc.clone());
    let id = IdType::from(gid);

    let first = ctx.get_ptr::<Accumulator>(&id).unwrap();
    assert_eq!(acc.pins(), 1);
    let second = ctx.get_ptr::<Accumulator>(&id).unwrap();
    assert_eq!(acc.pins(), 2);

    drop(first);
    assert_eq!(acc.pins(), 1);
    assert_eq!(second.release(), PinOutcome::StillResident);
    assert_eq!(acc.pins(), 0);
    assert_eq!(acc.min_seen.load(Ordering::SeqCst), 0);
}

#[test]
fn test_remote_object_is_wrong_locality_and_not_pinned() {
    let (naming, ctx) = setup();
    let acc = Arc::new(Accumulator::default());
    let gid = GlobalId::new(1, 2);
    naming.bind(gid, ELSEWHERE, 0x200, acc.clone());

    let err = ctx.get_ptr::<Accumulator>(&IdType::from(gid)).unwrap_err();

    match err {
        AcquireError::WrongLocality {
            current, resolved, ..
        } => {
            assert_eq!(current, HERE);
            assert_eq!(resolved.map(|a| a.locality), Some(ELSEWHERE));
        }
        other => panic!("expected WrongLocality, got {other:?}"),
    }
    assert_eq!(acc.pins(), 0);
}

#[test]
fn test_incompatible_type_is_mismatch_and_not_pinned() {
    let (naming, ctx) = setup();
    let dir = Arc::new(Directory::default());
    let gid = GlobalId::new(1, 3);
    naming.bind(gid, HERE, 0x300, dir.clone());

    let err = ctx.get_ptr::<Accumulator>(&IdType::from(gid)).unwrap_err();

    assert!(matches!(err, AcquireError::TypeMismatch { .. }));
    assert_eq!(err.requested(), Accumulator::component_type());
    assert_eq!(
        err.resolved().map(|a| a.component_type),
        Some(Directory::component_type())
    );
    assert_eq!(dir.pins.load(Ordering::SeqCst), 0);
}

#[test]
fn test_compatible_tag_but_different_instance_type_is_mismatch() {
    let (naming, ctx) = setup();
    let dir = Arc::new(Directory::default());
    let gid = GlobalId::new(1, 4);
    // Registered under a tag compatible with Accumulator, but the stored
    // instance is a Directory.
    naming.bind_as(
        gid,
        HERE,
        ComponentType::from_parts(100, 9),
        0x400,
        dir.clone(),
    );

    let err = ctx.get_ptr::<Accumulator>(&IdType::from(gid)).unwrap_err();

    assert!(matches!(err, AcquireError::TypeMismatch { .. }));
    assert_eq!(dir.pins.load(Ordering::SeqCst), 0);
}

#[test]
fn test_derived_type_tag_is_accepted() {
    let (naming, ctx) = setup();
    let acc = Arc::new(Accumulator::default());
    let gid = GlobalId::new(1, 5);
    naming.bind_as(gid, HERE, ComponentType::from_parts(100, 3), 0x500, acc.clone());

    let handle = ctx.get_ptr::<Accumulator>(&IdType::from(gid)).unwrap();
    assert_eq!(handle.address().component_type.derived(), 3);
    assert_eq!(acc.pins(), 1);
}

#[test]
fn test_client_proxy_delegates_to_id() {
    let (naming, ctx) = setup();
    let acc = Arc::new(Accumulator::default());
    let gid = GlobalId::new(1, 6);
    naming.bind(gid, HERE, 0x600, acc.clone());
    let client = AccumulatorClient {
        id: IdType::from(gid),
    };

    let handle = ctx.get_ptr_from_client(&client).unwrap();
    assert_eq!(handle.gid(), gid);
    assert_eq!(handle.pins(), 1);
}

#[test]
fn test_handle_keeps_credit_alive_until_release() {
    let (naming, ctx) = setup();
    let acc = Arc::new(Accumulator::default());
    let gid = GlobalId::new(1, 7);
    naming.bind(gid, HERE, 0x700, acc.clone());
    let ledger = Arc::new(CreditLedger::default());
    let id = IdType::managed(gid, ledger.clone());

    let handle = ctx.get_ptr::<Accumulator>(&id).unwrap();
    drop(id);
    assert_eq!(ledger.released.load(Ordering::SeqCst), 0);

    drop(handle);
    assert_eq!(ledger.released.load(Ordering::SeqCst), 1);
    assert_eq!(acc.pins(), 0);
}

#[test]
fn test_migration_release_deletes_relocated_instance_once() {
    let (naming, ctx) = setup();
    let acc = Arc::new(Accumulator::default());
    let gid = GlobalId::new(1, 8);
    naming.bind(gid, HERE, 0x800, acc.clone());

    let deletions: Arc<Mutex<Vec<(GlobalId, LocalAddress)>>> = Arc::default();
    let sink = deletions.clone();
    ctx.deleters()
        .register_for::<Accumulator, _>(move |gid, addr| sink.lock().unwrap().push((gid, addr)));

    let handle = ctx
        .get_ptr_for_migration::<Accumulator>(&IdType::from(gid))
        .unwrap();
    assert!(handle.is_migration_aware());

    // The relocation subsystem moves the object while it is pinned.
    acc.relocated.store(true, Ordering::SeqCst);
    drop(handle);

    let deletions = deletions.lock().unwrap();
    assert_eq!(
        *deletions,
        vec![(
            gid,
            LocalAddress::new(HERE, Accumulator::component_type(), 0x800)
        )]
    );
    assert_eq!(acc.pins(), 0);
}

#[test]
fn test_migration_release_without_relocation_does_not_delete() {
    let (naming, ctx) = setup();
    let acc = Arc::new(Accumulator::default());
    let gid = GlobalId::new(1, 9);
    naming.bind(gid, HERE, 0x900, acc.clone());

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    ctx.deleters().register_for::<Accumulator, _>(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let handle = ctx
        .get_ptr_for_migration::<Accumulator>(&IdType::from(gid))
        .unwrap();
    assert_eq!(handle.release(), PinOutcome::StillResident);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_ordinary_handle_never_deletes() {
    let (naming, ctx) = setup();
    let acc = Arc::new(Accumulator::default());
    let gid = GlobalId::new(1, 10);
    naming.bind(gid, HERE, 0xa00, acc.clone());

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    ctx.deleters().register_for::<Accumulator, _>(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let handle = ctx.get_ptr::<Accumulator>(&IdType::from(gid)).unwrap();
    acc.relocated.store(true, Ordering::SeqCst);
    assert_eq!(handle.release(), PinOutcome::Relocated);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_migration_handoff_rejects_remote_address() {
    let (naming, ctx) = setup();
    let acc = Arc::new(Accumulator::default());
    let gid = GlobalId::new(1, 11);
    naming.bind(gid, ELSEWHERE, 0xb00, acc.clone());

    let err = ctx
        .get_ptr_for_migration::<Accumulator>(&IdType::from(gid))
        .unwrap_err();
    assert!(matches!(err, AcquireError::WrongLocality { .. }));
    assert_eq!(acc.pins(), 0);
}

#[test]
fn test_concurrent_acquire_release_balances_pins() {
    let (naming, ctx) = setup();
    let acc = Arc::new(Accumulator::default());
    let gid = GlobalId::new(1, 12);
    naming.bind(gid, HERE, 0xc00, acc.clone());
    let id = IdType::from(gid);

    thread::scope(|scope| {
        for _ in 0..8 {
            let ctx = ctx.clone();
            let id = id.clone();
            scope.spawn(move || {
                for _ in 0..500 {
                    let handle = ctx.get_ptr::<Accumulator>(&id).unwrap();
                    assert!(handle.pins() >= 1);
                }
            });
        }
    });

    assert_eq!(acc.pins(), 0);
    assert!(acc.min_seen.load(Ordering::SeqCst) >= 0);
}
