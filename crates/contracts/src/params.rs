//! Params - component parameter bag
//!
//! Ordinary parameters and credentials are kept apart; credentials are only
//! reachable through the reserved `credentials` key.
//!
//! `required_*` lookups consume the entry: a field can be fetched as required
//! at most once per instance. Use [`Params::get`] / [`Params::credential`] for
//! optional inspection after construction.

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

use crate::ContractError;

/// Parameter value as written in a template or config
pub type ParamValue = serde_json::Value;

/// Flat key -> value parameter map
pub type ParamMap = BTreeMap<String, ParamValue>;

/// Reserved key under which credentials are exposed
pub const CREDENTIALS_KEY: &str = "credentials";

/// Parameter bag handed to a component constructor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    component: String,
    fields: ParamMap,
    credentials: BTreeMap<String, String>,
}

impl Params {
    /// Create a bag owned by `component`
    pub fn new(
        component: impl Into<String>,
        fields: ParamMap,
        credentials: BTreeMap<String, String>,
    ) -> Self {
        Self {
            component: component.into(),
            fields,
            credentials,
        }
    }

    /// Name of the owning component (used in error messages)
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Consume a required field
    ///
    /// `null` counts as absent.
    pub fn required_field(&mut self, name: &str) -> Result<ParamValue, ContractError> {
        match self.fields.remove(name) {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(ContractError::missing_field(&self.component, name)),
        }
    }

    /// Consume a required credential
    pub fn required_credential(&mut self, name: &str) -> Result<String, ContractError> {
        self.credentials
            .remove(name)
            .ok_or_else(|| ContractError::missing_credential(&self.component, name))
    }

    /// Consume a required field and convert it to `T`
    pub fn required<T: DeserializeOwned>(&mut self, name: &str) -> Result<T, ContractError> {
        let value = self.required_field(name)?;
        self.convert(name, value)
    }

    /// Consume a required string field
    ///
    /// Scalars (numbers, booleans) are accepted and rendered as text.
    pub fn required_str(&mut self, name: &str) -> Result<String, ContractError> {
        let value = self.required_field(name)?;
        self.to_text(name, value)
    }

    /// Consume an optional field and convert it to `T`
    pub fn optional<T: DeserializeOwned>(&mut self, name: &str) -> Result<Option<T>, ContractError> {
        match self.fields.remove(name) {
            Some(value) if !value.is_null() => self.convert(name, value).map(Some),
            _ => Ok(None),
        }
    }

    /// Consume an optional string field
    pub fn optional_str(&mut self, name: &str) -> Result<Option<String>, ContractError> {
        match self.fields.remove(name) {
            Some(value) if !value.is_null() => self.to_text(name, value).map(Some),
            _ => Ok(None),
        }
    }

    /// Non-consuming lookup
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.fields.get(name)
    }

    /// Non-consuming credential lookup
    pub fn credential(&self, name: &str) -> Option<&str> {
        self.credentials.get(name).map(String::as_str)
    }

    /// Remaining (unconsumed) ordinary parameters
    pub fn fields(&self) -> &ParamMap {
        &self.fields
    }

    /// Names of remaining credentials (values are never exposed here)
    pub fn credential_names(&self) -> impl Iterator<Item = &str> {
        self.credentials.keys().map(String::as_str)
    }

    fn convert<T: DeserializeOwned>(&self, name: &str, value: ParamValue) -> Result<T, ContractError> {
        serde_json::from_value(value)
            .map_err(|e| ContractError::invalid_field(&self.component, name, e.to_string()))
    }

    fn to_text(&self, name: &str, value: ParamValue) -> Result<String, ContractError> {
        match value {
            ParamValue::String(s) => Ok(s),
            ParamValue::Number(n) => Ok(n.to_string()),
            ParamValue::Bool(b) => Ok(b.to_string()),
            other => Err(ContractError::invalid_field(
                &self.component,
                name,
                format!("expected a string, got {other}"),
            )),
        }
    }
}
