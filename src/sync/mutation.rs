use std::sync::Arc;

use crate::types::Order;

/// Where a speculative cache edit is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    SnapshotCaptured,
    OptimisticApplied,
    Confirmed,
    RolledBack,
}

/// A speculative edit of the order cache that can be undone exactly
///
/// The pre-edit list is kept as the same `Arc`, so a rollback restores the
/// cache to precisely what it was, not to a rebuilt copy.
#[derive(Debug)]
pub struct OptimisticMutation {
    before: Arc<Vec<Order>>,
    phase: MutationPhase,
}

impl OptimisticMutation {
    pub fn capture(current: &Arc<Vec<Order>>) -> Self {
        Self {
            before: Arc::clone(current),
            phase: MutationPhase::SnapshotCaptured,
        }
    }

    /// Build the speculative list from the captured one
    pub fn apply<F>(&mut self, edit: F) -> Arc<Vec<Order>>
    where
        F: FnOnce(&[Order]) -> Vec<Order>,
    {
        debug_assert_eq!(self.phase, MutationPhase::SnapshotCaptured);
        self.phase = MutationPhase::OptimisticApplied;
        Arc::new(edit(&self.before))
    }

    pub fn confirm(&mut self) {
        self.phase = MutationPhase::Confirmed;
    }

    /// The list to put back into the cache
    pub fn roll_back(&mut self) -> Arc<Vec<Order>> {
        self.phase = MutationPhase::RolledBack;
        Arc::clone(&self.before)
    }

    pub fn phase(&self) -> MutationPhase {
        self.phase
    }

    pub fn captured(&self) -> &Arc<Vec<Order>> {
        &self.before
    }
}
