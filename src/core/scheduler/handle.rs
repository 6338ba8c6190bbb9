//! Access to host-owned cluster state for plugins.

use std::sync::{Arc, PoisonError, RwLock};

use prefer_node_label_derive::StateData;

use crate::core::scheduler::cycle_state::CycleState;
use crate::core::snapshot::{SharedLister, Snapshot};

/// Key under which the framework pins the snapshot of the running cycle.
pub const CYCLE_SNAPSHOT_KEY: &str = "Snapshot";

/// Snapshot taken when a cycle starts. Every plugin call of that cycle reads it, even if the
/// host swaps the handle's snapshot meanwhile.
#[derive(Clone, StateData)]
pub struct CycleSnapshot(pub Arc<Snapshot>);

pub trait Handle: Send + Sync {
    /// Latest snapshot installed by the host. Read-only for plugins.
    fn snapshot_shared_lister(&self) -> Arc<dyn SharedLister>;
}

/// Lister plugins should use inside a cycle: the snapshot pinned in `state`, or the handle's
/// latest one when called outside a framework cycle.
pub fn cycle_shared_lister(state: &CycleState, handle: &dyn Handle) -> Arc<dyn SharedLister> {
    if let Some(snapshot) = state.read::<CycleSnapshot>(CYCLE_SNAPSHOT_KEY) {
        return snapshot.0.clone();
    }
    handle.snapshot_shared_lister()
}

/// Handle owned by the host. The host swaps the whole snapshot between cycles; a running cycle
/// keeps the snapshot it pinned.
#[derive(Debug, Default)]
pub struct FrameworkHandle {
    snapshot: RwLock<Arc<Snapshot>>,
}

impl FrameworkHandle {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update_snapshot(&self, snapshot: Snapshot) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
    }
}

impl Handle for FrameworkHandle {
    fn snapshot_shared_lister(&self) -> Arc<dyn SharedLister> {
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::helpers::labeled_node;

    #[test]
    fn test_pinned_snapshot_outlives_update() {
        let handle = FrameworkHandle::new(Snapshot::new(vec![labeled_node("old", &[])]));
        let mut state = CycleState::new();
        state.write(CYCLE_SNAPSHOT_KEY, Box::new(CycleSnapshot(handle.snapshot())));

        handle.update_snapshot(Snapshot::new(vec![labeled_node("new", &[])]));

        let pinned = cycle_shared_lister(&state, &handle);
        assert!(pinned.node_infos().get("old").is_ok());
        assert!(pinned.node_infos().get("new").is_err());

        let latest = cycle_shared_lister(&CycleState::new(), &handle);
        assert!(latest.node_infos().get("new").is_ok());
        assert_eq!(latest.node_infos().list().len(), 1);
    }
}
