//! Extractors for inputs, outputs, results and call-site bindings.

use std::collections::HashSet;

use serde_json::Value;

use super::{FieldExtractor, Stage};
use crate::error::ExtractError;
use crate::keywords::*;
use crate::model::{FieldValue, Input, Output, ResultDef};
use crate::parse::{RawMap, value_type_name};

pub struct InputsExtractor;

impl FieldExtractor for InputsExtractor {
    fn name(&self) -> &'static str {
        "inputs"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[INPUTS_KEY]
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::BeforeExecutable]
    }

    fn extract(&self, raw: &RawMap) -> Result<Vec<(String, FieldValue)>, ExtractError> {
        let inputs = parse_inputs(INPUTS_KEY, raw.get(INPUTS_KEY).unwrap_or(&Value::Null))?;
        Ok(vec![(INPUTS_KEY.to_string(), FieldValue::Inputs(inputs))])
    }
}

pub struct OutputsExtractor;

impl FieldExtractor for OutputsExtractor {
    fn name(&self) -> &'static str {
        "outputs"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[OUTPUTS_KEY]
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::AfterExecutable]
    }

    fn extract(&self, raw: &RawMap) -> Result<Vec<(String, FieldValue)>, ExtractError> {
        let outputs = parse_named_expressions(OUTPUTS_KEY, raw.get(OUTPUTS_KEY).unwrap_or(&Value::Null))?
            .into_iter()
            .map(|(name, expression)| Output { name, expression })
            .collect();
        Ok(vec![(OUTPUTS_KEY.to_string(), FieldValue::Outputs(outputs))])
    }
}

pub struct ResultsExtractor;

impl FieldExtractor for ResultsExtractor {
    fn name(&self) -> &'static str {
        "results"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[RESULTS_KEY]
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::AfterExecutable]
    }

    fn extract(&self, raw: &RawMap) -> Result<Vec<(String, FieldValue)>, ExtractError> {
        let results = parse_named_expressions(RESULTS_KEY, raw.get(RESULTS_KEY).unwrap_or(&Value::Null))?
            .into_iter()
            .map(|(name, expression)| ResultDef { name, expression })
            .collect();
        Ok(vec![(RESULTS_KEY.to_string(), FieldValue::Results(results))])
    }
}

pub struct PublishExtractor;

impl FieldExtractor for PublishExtractor {
    fn name(&self) -> &'static str {
        "publish"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[PUBLISH_KEY]
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::AfterTask]
    }

    fn extract(&self, raw: &RawMap) -> Result<Vec<(String, FieldValue)>, ExtractError> {
        let published = parse_named_expressions(PUBLISH_KEY, raw.get(PUBLISH_KEY).unwrap_or(&Value::Null))?
            .into_iter()
            .map(|(name, expression)| Output { name, expression })
            .collect();
        Ok(vec![(PUBLISH_KEY.to_string(), FieldValue::Outputs(published))])
    }
}

/// Call-site bindings of a task's callee: `do: {alias.op: <bindings>}`.
/// The reference itself is resolved by the task compiler.
pub struct DoExtractor;

impl FieldExtractor for DoExtractor {
    fn name(&self) -> &'static str {
        "do"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[DO_KEY]
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::BeforeTask]
    }

    fn extract(&self, raw: &RawMap) -> Result<Vec<(String, FieldValue)>, ExtractError> {
        let callee = match raw.get(DO_KEY) {
            Some(Value::Object(map)) => map,
            None | Some(Value::Null) => return Ok(vec![]),
            Some(other) => return Err(ExtractError::shape(DO_KEY, "a map", value_type_name(other))),
        };

        let Some((reference, bindings)) = callee.iter().next() else {
            return Ok(vec![]);
        };

        let inputs = match bindings {
            Value::Null => Vec::new(),
            Value::Array(_) => parse_inputs(reference, bindings)?,
            Value::Object(map) => map
                .iter()
                .map(|(name, value)| parse_input_entry(reference, name, value))
                .collect::<Result<Vec<_>, _>>()?,
            other => {
                return Err(ExtractError::shape(
                    reference.as_str(),
                    "a map or list of bindings",
                    value_type_name(other),
                ));
            }
        };

        Ok(vec![(DO_KEY.to_string(), FieldValue::Inputs(inputs))])
    }
}

// =============================================================================
// PARSING HELPERS
// =============================================================================

/// Parse a list of inputs. Each item is a bare name, `name: expression`, or
/// `name: {default, required, encrypted, override, system_property}`.
fn parse_inputs(key: &str, value: &Value) -> Result<Vec<Input>, ExtractError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => return Err(ExtractError::shape(key, "a list", value_type_name(other))),
    };

    let mut seen = HashSet::new();
    let mut inputs = Vec::with_capacity(items.len());
    for item in items {
        let input = match item {
            Value::String(name) => Input::new(non_empty_name(key, name)?),
            Value::Object(map) if map.len() == 1 => {
                let Some((name, value)) = map.iter().next() else {
                    continue;
                };
                parse_input_entry(key, name, value)?
            }
            other => {
                return Err(ExtractError::shape(
                    key,
                    "a list of names or single-entry maps",
                    value_type_name(other),
                ));
            }
        };
        if !seen.insert(input.name.clone()) {
            return Err(ExtractError::invalid(key, format!("duplicate input '{}'", input.name)));
        }
        inputs.push(input);
    }
    Ok(inputs)
}

fn parse_input_entry(key: &str, name: &str, value: &Value) -> Result<Input, ExtractError> {
    let mut input = Input::new(non_empty_name(key, name)?);

    let Value::Object(props) = value else {
        input.expression = expression(name, value)?;
        return Ok(input);
    };

    for (prop, prop_value) in props {
        match prop.as_str() {
            DEFAULT_KEY => input.expression = expression(name, prop_value)?,
            REQUIRED_KEY => input.required = flag(name, prop, prop_value)?,
            ENCRYPTED_KEY => input.encrypted = flag(name, prop, prop_value)?,
            OVERRIDE_KEY => input.overridable = flag(name, prop, prop_value)?,
            SYSTEM_PROPERTY_KEY => match prop_value {
                Value::String(s) if !s.trim().is_empty() => input.system_property = Some(s.clone()),
                other => {
                    return Err(ExtractError::shape(
                        format!("{}.{}", name, prop),
                        "a non-empty string",
                        value_type_name(other),
                    ));
                }
            },
            other => {
                return Err(ExtractError::invalid(
                    name,
                    format!("unknown input property '{}'", other),
                ));
            }
        }
    }
    Ok(input)
}

/// Parse a list of bare names or `name: expression` entries.
fn parse_named_expressions(
    key: &str,
    value: &Value,
) -> Result<Vec<(String, Option<String>)>, ExtractError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => return Err(ExtractError::shape(key, "a list", value_type_name(other))),
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        let entry = match item {
            Value::String(name) => (non_empty_name(key, name)?, None),
            Value::Object(map) if map.len() == 1 => {
                let Some((name, value)) = map.iter().next() else {
                    continue;
                };
                (non_empty_name(key, name)?, expression(name, value)?)
            }
            other => {
                return Err(ExtractError::shape(
                    key,
                    "a list of names or single-entry maps",
                    value_type_name(other),
                ));
            }
        };
        if !seen.insert(entry.0.clone()) {
            return Err(ExtractError::invalid(key, format!("duplicate entry '{}'", entry.0)));
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// A scalar rendered as expression text. `null` means no expression.
fn expression(key: &str, value: &Value) -> Result<Option<String>, ExtractError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(ExtractError::shape(key, "a scalar expression", value_type_name(other))),
    }
}

fn flag(name: &str, prop: &str, value: &Value) -> Result<bool, ExtractError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(ExtractError::shape(
            format!("{}.{}", name, prop),
            "a boolean",
            value_type_name(other),
        )),
    }
}

fn non_empty_name(key: &str, name: &str) -> Result<String, ExtractError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::invalid(key, "names must not be empty"));
    }
    Ok(trimmed.to_string())
}
