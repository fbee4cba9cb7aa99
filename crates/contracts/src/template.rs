//! TemplateDefinition - Template Registry output
//!
//! Describes a pipeline template: declared parameters, source specs and sink
//! specs. Parameters of a component spec are an open bag; any key that is not
//! one of the spec's own fields lands in `params`.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

use crate::ParamMap;

/// Template format version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// A named, parameterized pipeline declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    /// Template name; filled from the lookup name when the file omits it
    #[serde(default)]
    pub name: String,

    /// Format version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Declared template parameters with their default values
    #[serde(default)]
    pub parameters: ParamMap,

    /// Source component specs, in declaration order
    #[serde(default)]
    pub sources: Vec<SourceSpec>,

    /// Sink component specs, in declaration order
    #[serde(default)]
    pub sinks: Vec<SinkSpec>,
}

/// Source component spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Plugin type tag
    #[serde(rename = "type")]
    pub kind: String,

    /// Unique component name
    pub name: String,

    /// Names of the sinks this source writes to
    #[serde(default)]
    pub sink_names: Vec<String>,

    /// Advisory worker-process hint
    #[serde(default, deserialize_with = "hint", skip_serializing_if = "Option::is_none")]
    pub processes: Option<u32>,

    /// Advisory concurrency hint
    #[serde(default, deserialize_with = "hint", skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<u32>,

    /// Adapter-specific parameters
    #[serde(flatten)]
    pub params: ParamMap,
}

/// Sink component spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkSpec {
    /// Plugin type tag
    #[serde(rename = "type")]
    pub kind: String,

    /// Unique component name
    pub name: String,

    /// Optional payload shape tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    /// Adapter-specific parameters
    #[serde(flatten)]
    pub params: ParamMap,
}

/// Execution hints carried by a source
///
/// Accepted as configuration only; parallelism, if any, belongs to the
/// adapter's own `run()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionHints {
    pub processes: Option<u32>,
    pub concurrency: Option<u32>,
}

/// Non-positive values (the legacy `-1`) mean "unset"
fn hint<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<i64>::deserialize(deserializer)?;
    Ok(value
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0))
}

impl SourceSpec {
    pub fn hints(&self) -> ExecutionHints {
        ExecutionHints {
            processes: self.processes,
            concurrency: self.concurrency,
        }
    }
}

impl TemplateDefinition {
    /// Create an empty definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: ConfigVersion::V1,
            parameters: ParamMap::new(),
            sources: Vec::new(),
            sinks: Vec::new(),
        }
    }

    /// Source spec by name
    pub fn source(&self, name: &str) -> Option<&SourceSpec> {
        self.sources.iter().find(|spec| spec.name == name)
    }

    /// Sink spec by name
    pub fn sink(&self, name: &str) -> Option<&SinkSpec> {
        self.sinks.iter().find(|spec| spec.name == name)
    }

    /// All component names, sources first
    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.sources
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.sinks.iter().map(|s| s.name.as_str()))
    }

    /// First component name declared more than once, across sources and sinks
    pub fn duplicate_name(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.component_names().find(|name| !seen.insert(*name))
    }
}
