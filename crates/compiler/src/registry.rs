//! Plugin type registry
//!
//! Maps type tags to adapter constructors, one table per role. A registry is
//! an ordinary value: populate it up front, then share it (it is
//! `Send + Sync`) with any number of compilers.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use contracts::{ContractError, Sink, SinkBase, Source, SourceBase};

/// Builds a source from its base; the constructor consumes the fields it needs
pub type SourceConstructor =
    Arc<dyn Fn(SourceBase) -> Result<Box<dyn Source>, ContractError> + Send + Sync>;

/// Builds a sink from its base; the constructor consumes the fields it needs
pub type SinkConstructor =
    Arc<dyn Fn(SinkBase) -> Result<Box<dyn Sink>, ContractError> + Send + Sync>;

/// Type tag -> constructor tables
#[derive(Clone, Default)]
pub struct PluginRegistry {
    sources: BTreeMap<String, SourceConstructor>,
    sinks: BTreeMap<String, SinkConstructor>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source constructor, replacing any previous one for the tag
    pub fn register_source<F>(&mut self, plugin_type: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(SourceBase) -> Result<Box<dyn Source>, ContractError> + Send + Sync + 'static,
    {
        self.sources.insert(plugin_type.into(), Arc::new(constructor));
        self
    }

    /// Register a sink constructor, replacing any previous one for the tag
    pub fn register_sink<F>(&mut self, plugin_type: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(SinkBase) -> Result<Box<dyn Sink>, ContractError> + Send + Sync + 'static,
    {
        self.sinks.insert(plugin_type.into(), Arc::new(constructor));
        self
    }

    pub fn resolve_source(&self, plugin_type: &str) -> Option<SourceConstructor> {
        self.sources.get(plugin_type).cloned()
    }

    pub fn resolve_sink(&self, plugin_type: &str) -> Option<SinkConstructor> {
        self.sinks.get(plugin_type).cloned()
    }

    pub fn source_types(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn sink_types(&self) -> impl Iterator<Item = &str> {
        self.sinks.keys().map(String::as_str)
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("sinks", &self.sinks.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BlockRequest, Row};

    struct NullSink(SinkBase);

    impl Sink for NullSink {
        fn base(&self) -> &SinkBase {
            &self.0
        }

        fn base_mut(&mut self) -> &mut SinkBase {
            &mut self.0
        }

        fn write_block(
            &mut self,
            rows: &mut dyn Iterator<Item = Row>,
            _request: &BlockRequest<'_>,
        ) -> Result<usize, ContractError> {
            Ok(rows.count())
        }
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_registry_is_shareable() {
        assert_send_sync::<PluginRegistry>();
    }

    #[test]
    fn test_roles_are_separate() {
        let mut registry = PluginRegistry::new();
        registry.register_sink("null", |base| Ok(Box::new(NullSink(base)) as Box<dyn Sink>));

        assert!(registry.resolve_sink("null").is_some());
        assert!(registry.resolve_source("null").is_none());
        assert_eq!(registry.sink_types().collect::<Vec<_>>(), vec!["null"]);
    }
}
