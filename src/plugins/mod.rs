//! Plugins shipped with this crate.

pub mod prefer_node_label;

use crate::core::scheduler::interface::ConstructionError;
use crate::core::scheduler::registry::Registry;

/// Registry holding every plugin of this crate.
pub fn new_registry() -> Result<Registry, ConstructionError> {
    let mut registry = Registry::new();
    registry.register(prefer_node_label::NAME, prefer_node_label::PreferNodeLabel::new)?;
    Ok(registry)
}
