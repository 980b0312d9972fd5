#![allow(dead_code)]

use flow_modeller::error::CompilerError;
use flow_modeller::lower::ExecutableBuilder;
use flow_modeller::model::*;
use flow_modeller::parse::{ParsedUnit, RawMap, UnitKind};
use serde_json::{Value, json};

// =============================================================================
// Document builders
// =============================================================================

pub fn raw(value: Value) -> RawMap {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a map, got {:?}", other),
    }
}

/// Flow unit `pkg.flows.<name>` importing `ns` → `pkg`.
pub fn flow_unit(name: &str) -> ParsedUnit {
    ParsedUnit::new(format!("pkg.flows.{}", name), UnitKind::Flow, "pkg.flows").with_import("ns", "pkg")
}

/// Operation unit `pkg.ops.<name>` importing `ns` → `pkg`.
pub fn operation_unit(name: &str) -> ParsedUnit {
    ParsedUnit::new(format!("pkg.ops.{}", name), UnitKind::Operation, "pkg.ops").with_import("ns", "pkg")
}

/// `{T1: {do: {ns.op1: {}}}, ..., Tn: {do: {ns.opn: {}}}}`.
pub fn linear_tasks(n: usize) -> Value {
    prefixed_tasks("T", "op", n)
}

/// `{R1: {do: {ns.recover1: {}}}, ...}`.
pub fn chain_tasks(m: usize) -> Value {
    prefixed_tasks("R", "recover", m)
}

fn prefixed_tasks(prefix: &str, op: &str, n: usize) -> Value {
    let mut tasks = serde_json::Map::new();
    for i in 1..=n {
        tasks.insert(
            format!("{}{}", prefix, i),
            json!({"do": {format!("ns.{}{}", op, i): {}}}),
        );
    }
    Value::Object(tasks)
}

/// Flow document with the given task map and optional `on_failure` section.
pub fn flow_doc(name: &str, tasks: Value, on_failure: Option<Value>) -> RawMap {
    let mut workflow = raw(tasks);
    if let Some(chain) = on_failure {
        workflow.insert("on_failure".into(), chain);
    }
    raw(json!({"name": name, "workflow": Value::Object(workflow)}))
}

// =============================================================================
// Compilation shortcuts
// =============================================================================

pub fn compile_flow(name: &str, doc: RawMap) -> Result<Executable, CompilerError> {
    ExecutableBuilder::default().assemble(&flow_unit(name), name, doc)
}

pub fn compile_operation(name: &str, doc: RawMap) -> Result<Executable, CompilerError> {
    ExecutableBuilder::default().assemble(&operation_unit(name), name, doc)
}

// =============================================================================
// Inspection
// =============================================================================

pub fn task_names(executable: &Executable) -> Vec<String> {
    executable
        .workflow()
        .expect("expected a flow")
        .tasks
        .iter()
        .map(|t| t.name.clone())
        .collect()
}

pub fn nav(success: &str, failure: &str) -> Navigation {
    Navigation::from([
        ("SUCCESS".to_string(), success.to_string()),
        ("FAILURE".to_string(), failure.to_string()),
    ])
}
