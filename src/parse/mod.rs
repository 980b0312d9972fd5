//! Parse phase: JSON source → `ParsedUnit` + raw executable document.
//!
//! The textual DSL is parsed upstream; this module only splits an already
//! structured source file into the unit descriptor and the executable body.

pub mod types;

pub use types::*;

use serde_json::Value;

use crate::error::CompilerError;
use crate::keywords::*;

/// Deserialize a JSON-encoded source file and split it into its unit descriptor
/// and executable document.
pub fn parse_source(json: &str) -> Result<SourceUnit, CompilerError> {
    let value = serde_json::from_str::<Value>(json).map_err(|e| {
        CompilerError::invalid_source("P001", format!("Failed to parse source JSON: {}", e))
    })?;
    let Value::Object(mut source) = value else {
        return Err(CompilerError::invalid_source(
            "P001",
            format!("Source must be a map, found {}", value_type_name(&value)),
        ));
    };

    let namespace = match source.shift_remove(NAMESPACE_KEY) {
        Some(Value::String(ns)) => ns,
        None | Some(Value::Null) => String::new(),
        Some(other) => {
            return Err(CompilerError::invalid_source(
                "P002",
                format!("'{}' must be a string, found {}", NAMESPACE_KEY, value_type_name(&other)),
            ));
        }
    };

    let imports = match source.shift_remove(IMPORTS_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(parse_imports(map)?),
        Some(other) => {
            return Err(CompilerError::invalid_source(
                "P003",
                format!("'{}' must be a map of aliases, found {}", IMPORTS_KEY, value_type_name(&other)),
            ));
        }
    };

    if source.len() != 1 {
        let keys: Vec<&str> = source.keys().map(String::as_str).collect();
        return Err(CompilerError::invalid_source(
            "P002",
            format!(
                "Source must declare exactly one of '{}', '{}' or '{}', found {:?}",
                FLOW_TYPE, OPERATION_TYPE, SYSTEM_PROPERTY_TYPE, keys
            ),
        ));
    }

    let Some((type_key, body)) = source.into_iter().next() else {
        return Err(CompilerError::invalid_source("P002", "Source declares no executable"));
    };

    let kind = match type_key.as_str() {
        FLOW_TYPE => UnitKind::Flow,
        OPERATION_TYPE => UnitKind::Operation,
        SYSTEM_PROPERTY_TYPE => UnitKind::SystemProperties,
        other => {
            return Err(CompilerError::invalid_source(
                "P002",
                format!("Unrecognized source type '{}'", other),
            ));
        }
    };

    let document = match body {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => {
            return Err(CompilerError::invalid_source(
                "P002",
                format!("'{}' must be a map, found {}", type_key, value_type_name(&other)),
            ));
        }
    };

    let executable_name = match document.get(EXECUTABLE_NAME_KEY) {
        Some(Value::String(name)) => name.clone(),
        None if kind == UnitKind::SystemProperties => type_key.clone(),
        _ => {
            return Err(CompilerError::invalid_source(
                "P002",
                format!("'{}' must declare a string '{}'", type_key, EXECUTABLE_NAME_KEY),
            ));
        }
    };

    let unit_name = if namespace.is_empty() {
        executable_name.clone()
    } else {
        format!("{}.{}", namespace, executable_name)
    };

    Ok(SourceUnit {
        unit: ParsedUnit {
            name: unit_name,
            kind,
            namespace,
            imports,
        },
        executable_name,
        document,
    })
}

fn parse_imports(map: RawMap) -> Result<Imports, CompilerError> {
    let mut imports = Imports::new();
    for (alias, target) in map {
        match target {
            Value::String(ns) => {
                imports.insert(alias, ns);
            }
            other => {
                return Err(CompilerError::invalid_source(
                    "P003",
                    format!(
                        "Import '{}' must name a namespace string, found {}",
                        alias,
                        value_type_name(&other)
                    ),
                ));
            }
        }
    }
    Ok(imports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_flow_source() {
        let json = r#"{
            "namespace": "org.demo",
            "imports": {"ops": "org.demo.ops"},
            "flow": {"name": "deploy", "workflow": {}}
        }"#;
        let source = parse_source(json).unwrap();
        assert_eq!(source.unit.kind, UnitKind::Flow);
        assert_eq!(source.unit.name, "org.demo.deploy");
        assert_eq!(source.executable_name, "deploy");
        assert_eq!(
            source.unit.imports.as_ref().and_then(|i| i.get("ops")).map(String::as_str),
            Some("org.demo.ops")
        );
        assert!(source.document.contains_key(WORKFLOW_KEY));
    }

    #[test]
    fn source_without_imports_has_none() {
        let source = parse_source(r#"{"operation": {"name": "op"}}"#).unwrap();
        assert_eq!(source.unit.kind, UnitKind::Operation);
        assert!(source.unit.imports.is_none());
    }

    #[test]
    fn two_executables_are_rejected() {
        let err = parse_source(r#"{"flow": {"name": "a"}, "operation": {"name": "b"}}"#).unwrap_err();
        assert_eq!(err.code(), "P002");
    }

    #[test]
    fn non_string_import_is_rejected() {
        let err = parse_source(r#"{"imports": {"ops": 3}, "flow": {"name": "a"}}"#).unwrap_err();
        assert_eq!(err.code(), "P003");
    }

    #[test]
    fn invalid_json_returns_error() {
        let err = parse_source("not valid json").unwrap_err();
        assert_eq!(err.code(), "P001");
    }
}
