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

//! The two release disciplines of a component handle.

use crate::deleter::DeleterRegistry;
use meridian_core::{Component, IdType, LocalAddress, Locality, PinOutcome};
use std::sync::Arc;

/// Which release discipline a handle uses.
#[derive(Clone)]
pub enum ReleaseStrategy {
    /// Drop the held id, then unpin. The unpin result is ignored; deleting a
    /// relocated instance is left to whoever observes the credit reaching
    /// zero.
    Ordinary,
    /// Unpin first. If the instance was relocated while pinned, reclaim the
    /// orphaned local storage through the registry, then drop the held id.
    ForMigration {
        /// The locality the orphaned storage lives on.
        locality: Locality,
        /// Where the per-type deleter is looked up.
        deleters: Arc<DeleterRegistry>,
    },
}

impl std::fmt::Debug for ReleaseStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseStrategy::Ordinary => f.write_str("Ordinary"),
            ReleaseStrategy::ForMigration { locality, .. } => f
                .debug_struct("ForMigration")
                .field("locality", locality)
                .finish(),
        }
    }
}

/// A single-use release operation.
///
/// Holds everything needed to undo one acquisition: the pinned instance,
/// the captured id and the location the instance was found at. [`run`]
/// consumes it, so it cannot be invoked twice.
///
/// [`run`]: Release::run
pub struct Release<T: Component> {
    instance: Arc<T>,
    id: IdType,
    location: u64,
    strategy: ReleaseStrategy,
}

impl<T: Component> Release<T> {
    /// Prepares the release of an instance pinned through `id`.
    pub fn new(instance: Arc<T>, id: IdType, location: u64, strategy: ReleaseStrategy) -> Self {
        Self {
            instance,
            id,
            location,
            strategy,
        }
    }

    /// The discipline this release will follow.
    pub fn strategy(&self) -> &ReleaseStrategy {
        &self.strategy
    }

    /// Performs the release and returns what `unpin` reported.
    pub fn run(self) -> PinOutcome {
        let Release {
            instance,
            mut id,
            location,
            strategy,
        } = self;

        match strategy {
            ReleaseStrategy::Ordinary => {
                let gid = id.gid();
                id.invalidate();
                let outcome = instance.unpin();
                log::debug!("Released component {gid} ({outcome:?})");
                outcome
            }
            ReleaseStrategy::ForMigration { locality, deleters } => {
                let outcome = instance.unpin();
                if outcome.was_relocated() {
                    let component_type = T::component_type();
                    let orphan = LocalAddress::new(locality, component_type, location);
                    match deleters.deleter_for(component_type) {
                        Some(deleter) => {
                            log::debug!(
                                "Component {} was relocated while pinned, reclaiming {}",
                                id.gid(),
                                orphan
                            );
                            deleter(id.gid(), orphan);
                        }
                        None => log::error!(
                            "Component {} was relocated while pinned but no deleter is \
                             registered for {}; local storage at {} is leaked",
                            id.gid(),
                            component_type,
                            orphan
                        ),
                    }
                }
                id.invalidate();
                outcome
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::{ComponentType, CreditRelease, GlobalId};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Step {
        Unpin,
        Credit,
        Delete(u64),
    }

    #[derive(Default)]
    struct Journal(Mutex<Vec<Step>>);

    impl Journal {
        fn push(&self, step: Step) {
            self.0.lock().unwrap().push(step);
        }
        fn steps(&self) -> Vec<Step> {
            self.0.lock().unwrap().clone()
        }
    }

    impl CreditRelease for Journal {
        fn release(&self, _gid: GlobalId) {
            self.push(Step::Credit);
        }
    }

    struct Cell {
        journal: Arc<Journal>,
        pins: AtomicUsize,
        relocated: AtomicBool,
    }

    impl Component for Cell {
        fn component_type() -> ComponentType {
            ComponentType::base_only(77)
        }
        fn pin(&self) {
            self.pins.fetch_add(1, Ordering::SeqCst);
        }
        fn unpin(&self) -> PinOutcome {
            self.pins.fetch_sub(1, Ordering::SeqCst);
            self.journal.push(Step::Unpin);
            PinOutcome::from(self.relocated.load(Ordering::SeqCst))
        }
    }

    fn pinned_cell(journal: &Arc<Journal>, relocated: bool) -> Arc<Cell> {
        let cell = Arc::new(Cell {
            journal: journal.clone(),
            pins: AtomicUsize::new(0),
            relocated: AtomicBool::new(relocated),
        });
        cell.pin();
        cell
    }

    #[test]
    fn test_ordinary_release_drops_credit_before_unpin() {
        let journal = Arc::new(Journal::default());
        let cell = pinned_cell(&journal, false);
        let id = IdType::managed(GlobalId::new(0, 1), journal.clone());

        let outcome = Release::new(cell.clone(), id, 0x10, ReleaseStrategy::Ordinary).run();

        assert_eq!(outcome, PinOutcome::StillResident);
        assert_eq!(journal.steps(), vec![Step::Credit, Step::Unpin]);
        assert_eq!(cell.pins.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_ordinary_release_ignores_relocation() {
        let journal = Arc::new(Journal::default());
        let cell = pinned_cell(&journal, true);
        let id = IdType::managed(GlobalId::new(0, 2), journal.clone());

        let outcome = Release::new(cell, id, 0x10, ReleaseStrategy::Ordinary).run();

        assert!(outcome.was_relocated());
        assert_eq!(journal.steps(), vec![Step::Credit, Step::Unpin]);
    }

    #[test]
    fn test_migration_release_deletes_before_dropping_credit() {
        let journal = Arc::new(Journal::default());
        let deleters = Arc::new(DeleterRegistry::new());
        let recorder = journal.clone();
        deleters.register_for::<Cell, _>(move |_, addr| recorder.push(Step::Delete(addr.location)));

        let cell = pinned_cell(&journal, true);
        let id = IdType::managed(GlobalId::new(0, 3), journal.clone());
        let strategy = ReleaseStrategy::ForMigration {
            locality: Locality(4),
            deleters,
        };

        let outcome = Release::new(cell, id, 0x20, strategy).run();

        assert!(outcome.was_relocated());
        assert_eq!(
            journal.steps(),
            vec![Step::Unpin, Step::Delete(0x20), Step::Credit]
        );
    }

    #[test]
    fn test_migration_release_without_relocation_skips_deleter() {
        let journal = Arc::new(Journal::default());
        let deleters = Arc::new(DeleterRegistry::new());
        let recorder = journal.clone();
        deleters.register_for::<Cell, _>(move |_, addr| recorder.push(Step::Delete(addr.location)));

        let cell = pinned_cell(&journal, false);
        let id = IdType::managed(GlobalId::new(0, 4), journal.clone());
        let strategy = ReleaseStrategy::ForMigration {
            locality: Locality(0),
            deleters,
        };

        Release::new(cell, id, 0x30, strategy).run();

        assert_eq!(journal.steps(), vec![Step::Unpin, Step::Credit]);
    }

    #[test]
    fn test_migration_release_without_deleter_still_drops_credit() {
        let journal = Arc::new(Journal::default());
        let cell = pinned_cell(&journal, true);
        let id = IdType::managed(GlobalId::new(0, 5), journal.clone());
        let strategy = ReleaseStrategy::ForMigration {
            locality: Locality(0),
            deleters: Arc::new(DeleterRegistry::new()),
        };

        Release::new(cell, id, 0x40, strategy).run();

        assert_eq!(journal.steps(), vec![Step::Unpin, Step::Credit]);
    }
}
