//! Action-stage extractors.

use serde_json::Value;

use super::{FieldExtractor, Stage};
use crate::error::ExtractError;
use crate::keywords::*;
use crate::model::{FieldValue, JavaAction};
use crate::parse::{RawMap, value_type_name};

/// `java_action: {className, methodName}`.
pub struct JavaActionExtractor;

impl FieldExtractor for JavaActionExtractor {
    fn name(&self) -> &'static str {
        "java_action"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[JAVA_ACTION_KEY]
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::Action]
    }

    fn extract(&self, raw: &RawMap) -> Result<Vec<(String, FieldValue)>, ExtractError> {
        let props = match raw.get(JAVA_ACTION_KEY) {
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(ExtractError::shape(JAVA_ACTION_KEY, "a map", value_type_name(other)));
            }
            None => return Ok(vec![]),
        };

        if let Some(unknown) = props
            .keys()
            .find(|k| k.as_str() != CLASS_NAME_KEY && k.as_str() != METHOD_NAME_KEY)
        {
            return Err(ExtractError::invalid(
                JAVA_ACTION_KEY,
                format!("unrecognized property '{}'", unknown),
            ));
        }

        let action = JavaAction {
            class_name: required_string(props, CLASS_NAME_KEY)?,
            method_name: required_string(props, METHOD_NAME_KEY)?,
        };
        Ok(vec![(JAVA_ACTION_KEY.to_string(), FieldValue::JavaAction(action))])
    }
}

fn required_string(props: &RawMap, key: &str) -> Result<String, ExtractError> {
    match props.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(other) => Err(ExtractError::shape(
            format!("{}.{}", JAVA_ACTION_KEY, key),
            "a non-empty string",
            value_type_name(other),
        )),
        None => Err(ExtractError::invalid(
            JAVA_ACTION_KEY,
            format!("missing '{}'", key),
        )),
    }
}

/// `python_script: <source>`.
pub struct PythonScriptExtractor;

impl FieldExtractor for PythonScriptExtractor {
    fn name(&self) -> &'static str {
        "python_script"
    }

    fn keys(&self) -> &'static [&'static str] {
        &[PYTHON_SCRIPT_KEY]
    }

    fn stages(&self) -> &'static [Stage] {
        &[Stage::Action]
    }

    fn extract(&self, raw: &RawMap) -> Result<Vec<(String, FieldValue)>, ExtractError> {
        match raw.get(PYTHON_SCRIPT_KEY) {
            Some(Value::String(script)) => Ok(vec![(
                PYTHON_SCRIPT_KEY.to_string(),
                FieldValue::PythonScript(script.clone()),
            )]),
            Some(other) => Err(ExtractError::shape(
                PYTHON_SCRIPT_KEY,
                "a string",
                value_type_name(other),
            )),
            None => Ok(vec![]),
        }
    }
}
