//! Input types handed to the builder by the parsing stage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ordered key/value document as produced by parsing. Key order is the
/// authoring order.
pub type RawMap = serde_json::Map<String, Value>;

/// Short alias → fully-qualified namespace.
pub type Imports = BTreeMap<String, String>;

/// Declared kind of a source unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Flow,
    Operation,
    SystemProperties,
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitKind::Flow => write!(f, "Flow"),
            UnitKind::Operation => write!(f, "Operation"),
            UnitKind::SystemProperties => write!(f, "System properties"),
        }
    }
}

/// Descriptor of the source unit an executable was declared in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedUnit {
    pub name: String,
    pub kind: UnitKind,
    pub namespace: String,
    /// `None` when the unit declares no imports at all.
    pub imports: Option<Imports>,
}

impl ParsedUnit {
    pub fn new(name: impl Into<String>, kind: UnitKind, namespace: impl Into<String>) -> Self {
        ParsedUnit {
            name: name.into(),
            kind,
            namespace: namespace.into(),
            imports: None,
        }
    }

    pub fn with_import(mut self, alias: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.imports
            .get_or_insert_with(Imports::new)
            .insert(alias.into(), namespace.into());
        self
    }
}

/// A front-end source split into the pieces the builder consumes.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub unit: ParsedUnit,
    pub executable_name: String,
    pub document: RawMap,
}

/// Human-readable name of a raw value's structural type, for error messages.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}
