//! CompiledTemplate - compiler output
//!
//! Constructed, wired components keyed by name. Both maps keep declaration
//! order, which is the order the runner executes sources in.

use std::fmt;

use contracts::{SharedSink, Source};
use indexmap::IndexMap;

/// Ready-to-run pipeline
pub struct CompiledTemplate {
    pub name: String,
    pub sources: IndexMap<String, Box<dyn Source>>,
    pub sinks: IndexMap<String, SharedSink>,
}

impl CompiledTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sources: IndexMap::new(),
            sinks: IndexMap::new(),
        }
    }

    pub fn source(&self, name: &str) -> Option<&dyn Source> {
        self.sources.get(name).map(|s| s.as_ref())
    }

    pub fn sink(&self, name: &str) -> Option<&SharedSink> {
        self.sinks.get(name)
    }

    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn sink_names(&self) -> impl Iterator<Item = &str> {
        self.sinks.keys().map(String::as_str)
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("name", &self.name)
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("sinks", &self.sinks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "template: {}", self.name)?;

        writeln!(f, "sources:")?;
        for (name, source) in &self.sources {
            let base = source.base();
            write!(f, "  {name} ({}) -> [{}]", base.kind, base.sink_names.join(", "))?;
            if let Some(processes) = base.hints.processes {
                write!(f, " processes={processes}")?;
            }
            if let Some(concurrency) = base.hints.concurrency {
                write!(f, " concurrency={concurrency}")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "sinks:")?;
        for (name, sink) in &self.sinks {
            let sink = sink.lock();
            let base = sink.base();
            write!(f, "  {name} ({})", base.kind)?;
            if let Some(data_type) = &base.data_type {
                write!(f, " data_type={data_type}")?;
            }
            if sink.telemetry_enabled() {
                write!(f, " telemetry")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
