//! Registry of plugin factories keyed by plugin name.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::core::scheduler::handle::Handle;
use crate::core::scheduler::interface::{ConstructionError, Plugin};

/// Builds a plugin from its optional args. Args are decoded exactly once, here.
pub type PluginFactory =
    fn(Option<&Value>, Arc<dyn Handle>) -> Result<Box<dyn Plugin>, ConstructionError>;

#[derive(Clone, Default)]
pub struct Registry {
    factories: BTreeMap<String, PluginFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, factory: PluginFactory) -> Result<(), ConstructionError> {
        if self.factories.contains_key(name) {
            return Err(ConstructionError::DuplicatePlugin(name.to_string()));
        }
        self.factories.insert(name.to_string(), factory);
        Ok(())
    }

    /// Adds all factories of `other`, for example out-of-tree plugins. Nothing is added if any
    /// name is already registered.
    pub fn merge(&mut self, other: Registry) -> Result<(), ConstructionError> {
        if let Some(name) = other.names().find(|name| self.contains(name)) {
            return Err(ConstructionError::DuplicatePlugin(name.to_string()));
        }
        self.factories.extend(other.factories);
        Ok(())
    }

    pub fn build(
        &self,
        name: &str,
        args: Option<&Value>,
        handle: Arc<dyn Handle>,
    ) -> Result<Box<dyn Plugin>, ConstructionError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConstructionError::UnknownPlugin(name.to_string()))?;
        factory(args, handle)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}
