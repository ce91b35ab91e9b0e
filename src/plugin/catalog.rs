//! Compiled-in plugins
//!
//! Plugins built into the binary install a factory here. A `.plugin`
//! artifact with `entry = "<key>"` activates the matching factory.

use std::collections::BTreeMap;

use super::protocol::Plugin;
use super::sample;

/// Creates a plugin instance
pub type PluginFactory = fn() -> Box<dyn Plugin>;

/// Registry of compiled-in plugin factories
#[derive(Default)]
pub struct PluginCatalog {
    factories: BTreeMap<String, PluginFactory>,
}

impl PluginCatalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding every plugin shipped with majic
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        sample::install(&mut catalog);
        catalog
    }

    /// Adds a factory under `entry`, replacing any previous one
    pub fn install(&mut self, entry: impl Into<String>, factory: PluginFactory) {
        self.factories.insert(entry.into(), factory);
    }

    /// Instantiates the plugin installed under `entry`
    pub fn instantiate(&self, entry: &str) -> Option<Box<dyn Plugin>> {
        self.factories.get(entry).map(|factory| factory())
    }

    /// Lists installed entry keys
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
