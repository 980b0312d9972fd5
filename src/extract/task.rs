//! Task-level extractors: loop header and explicit navigation.

use serde_json::Value;

use super::{FieldExtractor, Stage};
use crate::error::ExtractError;
use crate::keywords::*;
use crate::model::{FieldValue, LoopStatement, Navigation};
use crate::parse::{RawMap, value_type_name};

/// `for: x in items` / `for: k, v in map`. Runs against the body found under a
/// task's `loop` key, since the builder unwraps the loop before extraction.
pub struct ForExtractor;

impl FieldExtractor for ForExtractor {
    fn name(&self) -> &'static str {
        "for"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[FOR_KEY]
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::BeforeTask]
    }

    fn extract(&self, raw: &RawMap) -> Result<Vec<(String, FieldValue)>, ExtractError> {
        let statement = match raw.get(FOR_KEY) {
            Some(Value::String(s)) => parse_loop_statement(s)?,
            Some(other) => {
                return Err(ExtractError::shape(FOR_KEY, "a string", value_type_name(other)));
            }
            None => return Ok(vec![]),
        };
        Ok(vec![(FOR_KEY.to_string(), FieldValue::Loop(statement))])
    }
}

fn parse_loop_statement(statement: &str) -> Result<LoopStatement, ExtractError> {
    let Some((variables, collection)) = statement.split_once(" in ") else {
        return Err(ExtractError::invalid(
            FOR_KEY,
            format!("'{}' must have the form 'var in collection'", statement),
        ));
    };

    let variables: Vec<String> = variables.split(',').map(|v| v.trim().to_string()).collect();
    if variables.len() > 2 || variables.iter().any(|v| !is_identifier(v)) {
        return Err(ExtractError::invalid(
            FOR_KEY,
            format!("'{}' must declare one or two loop variables", statement),
        ));
    }

    let collection = collection.trim();
    if collection.is_empty() {
        return Err(ExtractError::invalid(
            FOR_KEY,
            format!("'{}' has no collection expression", statement),
        ));
    }

    Ok(LoopStatement {
        variables,
        collection: collection.to_string(),
    })
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

/// `navigate: {RESULT: next_task}`.
pub struct NavigateExtractor;

impl FieldExtractor for NavigateExtractor {
    fn name(&self) -> &'static str {
        "navigate"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[NAVIGATION_KEY]
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::AfterTask]
    }

    fn extract(&self, raw: &RawMap) -> Result<Vec<(String, FieldValue)>, ExtractError> {
        let entries = match raw.get(NAVIGATION_KEY) {
            Some(Value::Object(map)) => map,
            None | Some(Value::Null) => return Ok(vec![]),
            Some(other) => {
                return Err(ExtractError::shape(
                    NAVIGATION_KEY,
                    "a map of results to tasks",
                    value_type_name(other),
                ));
            }
        };

        let mut navigation = Navigation::new();
        for (result, target) in entries {
            match target {
                Value::String(next) if !next.trim().is_empty() => {
                    navigation.insert(result.clone(), next.trim().to_string());
                }
                other => {
                    return Err(ExtractError::shape(
                        format!("{}.{}", NAVIGATION_KEY, result),
                        "a task name or result",
                        value_type_name(other),
                    ));
                }
            }
        }

        Ok(vec![(NAVIGATION_KEY.to_string(), FieldValue::Navigation(navigation))])
    }
}
