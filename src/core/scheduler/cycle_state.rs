//! Per-cycle scratch storage shared by the plugins of one scheduling cycle.

use std::collections::HashMap;
use std::fmt;

use downcast_rs::{impl_downcast, Downcast};
use dyn_clone::DynClone;

/// Data stored in a [`CycleState`]. Implement it with `#[derive(StateData)]`.
pub trait StateData: Downcast + DynClone + Send + Sync {}
impl_downcast!(StateData);
dyn_clone::clone_trait_object!(StateData);

#[derive(Clone, Default)]
pub struct CycleState {
    storage: HashMap<String, Box<dyn StateData>>,
}

impl CycleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, key: &str, data: Box<dyn StateData>) {
        self.storage.insert(key.to_string(), data);
    }

    /// None if the key is absent or holds data of another type.
    pub fn read<T: StateData>(&self, key: &str) -> Option<&T> {
        self.storage.get(key)?.downcast_ref::<T>()
    }

    pub fn delete(&mut self, key: &str) -> Option<Box<dyn StateData>> {
        self.storage.remove(key)
    }
}

impl fmt::Debug for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.storage.keys().collect();
        keys.sort();
        f.debug_struct("CycleState").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use prefer_node_label_derive::StateData;

    use super::*;

    #[derive(Clone, Debug, PartialEq, StateData)]
    struct Counter(u64);

    #[derive(Clone, StateData)]
    struct Other;

    #[test]
    fn test_read_back_written_data() {
        let mut state = CycleState::new();
        state.write("counter", Box::new(Counter(7)));
        assert_eq!(state.read::<Counter>("counter"), Some(&Counter(7)));
        assert!(state.read::<Other>("counter").is_none());
        assert!(state.read::<Counter>("missing").is_none());
    }

    #[test]
    fn test_clone_is_deep() {
        let mut state = CycleState::new();
        state.write("counter", Box::new(Counter(1)));
        let snapshot = state.clone();
        state.write("counter", Box::new(Counter(2)));
        assert_eq!(snapshot.read::<Counter>("counter"), Some(&Counter(1)));
        assert!(state.delete("counter").is_some());
        assert!(state.read::<Counter>("counter").is_none());
    }
}
