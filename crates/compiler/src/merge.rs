//! Parameter merging
//!
//! Order of precedence for a component key, lowest first:
//! 1. the component spec value, with `${name}` placeholders resolved from the
//!    effective template parameters
//! 2. an un-scoped runtime override of the same key (only if the key exists)
//! 3. a scoped runtime override `"<component>.<key>"`
//!
//! Effective template parameters are the declared parameters overlaid by the
//! un-scoped runtime overrides.

use std::sync::OnceLock;

use contracts::{ParamMap, ParamValue, RuntimeConfig};
use regex::Regex;

use crate::error::{CompileError, Result};

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_.\-]*)\}").unwrap_or_else(|e| unreachable!("{e}"))
    })
}

/// Template parameters after un-scoped overrides
pub fn effective_parameters(declared: &ParamMap, config: &RuntimeConfig) -> ParamMap {
    let mut effective = declared.clone();
    for (key, value) in config.global_overrides() {
        effective.insert(key.to_string(), value.clone());
    }
    effective
}

/// Final parameter bag of one component
pub fn merge_component(
    component: &str,
    spec_params: &ParamMap,
    effective: &ParamMap,
    config: &RuntimeConfig,
) -> Result<ParamMap> {
    let mut merged = ParamMap::new();
    for (key, value) in spec_params {
        merged.insert(key.clone(), substitute(component, key, value, effective)?);
    }

    for (key, value) in config.global_overrides() {
        if let Some(slot) = merged.get_mut(key) {
            *slot = value.clone();
        }
    }
    for (key, value) in config.scoped_overrides(component) {
        merged.insert(key.to_string(), value.clone());
    }
    Ok(merged)
}

/// Resolve placeholders inside `value`
///
/// A string that is exactly one placeholder takes the parameter's value and
/// JSON type; placeholders embedded in longer text are interpolated.
pub fn substitute(
    component: &str,
    key: &str,
    value: &ParamValue,
    params: &ParamMap,
) -> Result<ParamValue> {
    match value {
        ParamValue::String(text) => substitute_str(component, key, text, params),
        ParamValue::Array(items) => items
            .iter()
            .map(|item| substitute(component, key, item, params))
            .collect::<Result<Vec<_>>>()
            .map(ParamValue::Array),
        ParamValue::Object(entries) => {
            let mut out = serde_json::Map::with_capacity(entries.len());
            for (name, item) in entries {
                out.insert(name.clone(), substitute(component, key, item, params)?);
            }
            Ok(ParamValue::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_str(component: &str, key: &str, text: &str, params: &ParamMap) -> Result<ParamValue> {
    let re = placeholder();

    if let Some(caps) = re.captures(text) {
        if caps.get(0).map(|m| m.as_str().len()) == Some(text.len()) {
            return lookup(component, key, &caps[1], params).cloned();
        }
    } else {
        return Ok(ParamValue::String(text.to_string()));
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&text[last..whole.start()]);
        out.push_str(&as_text(lookup(component, key, &caps[1], params)?));
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(ParamValue::String(out))
}

fn lookup<'a>(component: &str, key: &str, name: &str, params: &'a ParamMap) -> Result<&'a ParamValue> {
    params.get(name).ok_or_else(|| {
        CompileError::configuration(
            component,
            key,
            format!("unresolved placeholder '${{{name}}}'"),
        )
    })
}

fn as_text(value: &ParamValue) -> String {
    match value {
        ParamValue::String(s) => s.clone(),
        ParamValue::Null => String::new(),
        other => other.to_string(),
    }
}
