//! # Adapters
//!
//! Built-in sources and sinks.
//!
//! | type tag | role | |
//! |---|---|---|
//! | `csv` | source | delimited file |
//! | `static` | source | rows declared inline |
//! | `local_file` | sink | one text file per object id |
//! | `log` | sink | block summaries through `tracing` |

pub mod sinks;
pub mod sources;

pub use sinks::{FileSinkConfig, LocalFileSink, LogSink};
pub use sources::{CsvSource, CsvSourceConfig, StaticSource, StaticSourceConfig};

use compiler::PluginRegistry;
use contracts::{Sink, Source};

/// Register every built-in adapter under its type tag
pub fn register_builtins(registry: &mut PluginRegistry) -> &mut PluginRegistry {
    registry
        .register_source("csv", |base| Ok(Box::new(CsvSource::new(base)?) as Box<dyn Source>))
        .register_source("static", |base| {
            Ok(Box::new(StaticSource::new(base)?) as Box<dyn Source>)
        })
        .register_sink("local_file", |base| {
            Ok(Box::new(LocalFileSink::new(base)?) as Box<dyn Sink>)
        })
        .register_sink("log", |base| Ok(Box::new(LogSink::new(base)?) as Box<dyn Sink>))
}

/// A registry holding only the built-ins
pub fn builtin_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    register_builtins(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_type_tags() {
        let registry = builtin_registry();
        assert_eq!(registry.source_types().collect::<Vec<_>>(), vec!["csv", "static"]);
        assert_eq!(registry.sink_types().collect::<Vec<_>>(), vec!["local_file", "log"]);
    }
}
