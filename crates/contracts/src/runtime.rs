//! RuntimeConfig - per-run inputs
//!
//! Selects the template, carries credentials and parameter overrides.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{ParamMap, ParamValue};

/// Runtime configuration for one pipeline execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Template to resolve through the registry
    pub template_name: String,

    /// Credential name -> secret
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub credentials: BTreeMap<String, String>,

    /// Flat parameter overrides
    ///
    /// A plain key overrides the template parameter of that name and the
    /// same key in any component bag; `"<component>.<key>"` targets a single
    /// component.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: ParamMap,
}

impl RuntimeConfig {
    /// Config selecting `template_name` with no overrides
    pub fn new(template_name: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_credential(mut self, name: impl Into<String>, secret: impl Into<String>) -> Self {
        self.credentials.insert(name.into(), secret.into());
        self
    }

    /// Overrides without a component scope
    pub fn global_overrides(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params
            .iter()
            .filter(|(key, _)| !key.contains('.'))
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Overrides scoped to `component`, with the scope stripped from the key
    pub fn scoped_overrides<'a>(
        &'a self,
        component: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a ParamValue)> + 'a {
        self.params.iter().filter_map(move |(key, value)| {
            key.split_once('.')
                .filter(|(scope, _)| *scope == component)
                .map(|(_, field)| (field, value))
        })
    }
}
