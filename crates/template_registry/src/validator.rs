//! Structural validation
//!
//! Rules:
//! - component names non-empty and unique across sources and sinks
//! - type tags non-empty
//! - sink references non-empty
//! - the reserved `credentials` key is not used as an ordinary parameter
//!
//! Whether sink references resolve is left to the compiler.

use contracts::{TemplateDefinition, CREDENTIALS_KEY};

use crate::error::{RegistryError, Result};

/// Validate a parsed definition
///
/// Returns the first error encountered.
pub fn validate(definition: &TemplateDefinition) -> Result<()> {
    validate_sources(definition)?;
    validate_sinks(definition)?;
    validate_unique_names(definition)?;
    Ok(())
}

fn validate_sources(definition: &TemplateDefinition) -> Result<()> {
    for (idx, source) in definition.sources.iter().enumerate() {
        if source.name.is_empty() {
            return Err(invalid(definition, format!("sources[{idx}].name"), "component name cannot be empty"));
        }
        if source.kind.is_empty() {
            return Err(invalid(definition, format!("sources[{}].type", source.name), "type tag cannot be empty"));
        }
        if source.sink_names.iter().any(String::is_empty) {
            return Err(invalid(
                definition,
                format!("sources[{}].sink_names", source.name),
                "sink name cannot be empty",
            ));
        }
        if source.params.contains_key(CREDENTIALS_KEY) {
            return Err(invalid(
                definition,
                format!("sources[{}].{CREDENTIALS_KEY}", source.name),
                "reserved key; credentials come from the runtime config",
            ));
        }
    }
    Ok(())
}

fn validate_sinks(definition: &TemplateDefinition) -> Result<()> {
    for (idx, sink) in definition.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(invalid(definition, format!("sinks[{idx}].name"), "component name cannot be empty"));
        }
        if sink.kind.is_empty() {
            return Err(invalid(definition, format!("sinks[{}].type", sink.name), "type tag cannot be empty"));
        }
        if sink.params.contains_key(CREDENTIALS_KEY) {
            return Err(invalid(
                definition,
                format!("sinks[{}].{CREDENTIALS_KEY}", sink.name),
                "reserved key; credentials come from the runtime config",
            ));
        }
    }
    Ok(())
}

fn validate_unique_names(definition: &TemplateDefinition) -> Result<()> {
    match definition.duplicate_name() {
        Some(name) => Err(invalid(
            definition,
            format!("components[name={name}]"),
            "duplicate component name",
        )),
        None => Ok(()),
    }
}

fn invalid(definition: &TemplateDefinition, field: String, message: &str) -> RegistryError {
    RegistryError::invalid(&definition.name, field, message)
}
