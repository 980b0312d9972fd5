//! Executable model produced by the builder.
//!
//! Everything here is constructed once per compilation and never mutated after
//! the builder returns. The downstream engine walks `Workflow::tasks` following
//! each task's navigation map; the loader uses `Executable::dependencies` to
//! fetch and compile referenced units.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// FIELDS
// =============================================================================

/// Typed fields produced by the extractor pipeline, keyed by field name.
/// Ordered so that serialization is deterministic.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Result label → next task name or terminal marker.
pub type Navigation = BTreeMap<String, String>;

/// Referenced executable id → dependency kind.
pub type Dependencies = BTreeMap<String, DependencyKind>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Inputs(Vec<Input>),
    Outputs(Vec<Output>),
    Results(Vec<ResultDef>),
    Navigation(Navigation),
    Loop(LoopStatement),
    JavaAction(JavaAction),
    PythonScript(String),
}

impl FieldValue {
    pub fn as_inputs(&self) -> Option<&[Input]> {
        match self {
            FieldValue::Inputs(inputs) => Some(inputs),
            _ => None,
        }
    }

    pub fn as_outputs(&self) -> Option<&[Output]> {
        match self {
            FieldValue::Outputs(outputs) => Some(outputs),
            _ => None,
        }
    }

    pub fn as_navigation(&self) -> Option<&Navigation> {
        match self {
            FieldValue::Navigation(nav) => Some(nav),
            _ => None,
        }
    }

    pub fn as_loop(&self) -> Option<&LoopStatement> {
        match self {
            FieldValue::Loop(stmt) => Some(stmt),
            _ => None,
        }
    }
}

// =============================================================================
// BINDINGS
// =============================================================================

/// An executable input or a call-site binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub name: String,
    /// Default value expression, if any.
    pub expression: Option<String>,
    pub required: bool,
    pub encrypted: bool,
    pub overridable: bool,
    /// Name of the system property backing this input. Fully qualified once
    /// the builder has resolved it.
    pub system_property: Option<String>,
}

impl Input {
    pub fn new(name: impl Into<String>) -> Self {
        Input {
            name: name.into(),
            expression: None,
            required: true,
            encrypted: false,
            overridable: false,
            system_property: None,
        }
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }
}

/// An executable output or a task's published value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    pub expression: Option<String>,
}

/// A declared result label, optionally guarded by an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDef {
    pub name: String,
    pub expression: Option<String>,
}

/// The iteration header of a looping task: `x in items` or `k, v in map`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopStatement {
    pub variables: Vec<String>,
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaAction {
    pub class_name: String,
    pub method_name: String,
}

// =============================================================================
// GRAPH
// =============================================================================

/// One node of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    /// Fully-qualified name of the executable this task calls.
    pub ref_id: String,
    /// Always carries `SUCCESS` and `FAILURE` unless authored otherwise.
    pub navigation: Navigation,
    pub pre_task_data: FieldMap,
    pub post_task_data: FieldMap,
}

impl Task {
    /// Call-site input bindings of the callee.
    pub fn inputs(&self) -> &[Input] {
        self.pre_task_data
            .get(crate::keywords::DO_KEY)
            .and_then(FieldValue::as_inputs)
            .unwrap_or(&[])
    }

    pub fn loop_statement(&self) -> Option<&LoopStatement> {
        self.pre_task_data
            .get(crate::keywords::FOR_KEY)
            .and_then(FieldValue::as_loop)
    }

    pub fn publish(&self) -> &[Output] {
        self.post_task_data
            .get(crate::keywords::PUBLISH_KEY)
            .and_then(FieldValue::as_outputs)
            .unwrap_or(&[])
    }

    pub fn next(&self, result: &str) -> Option<&str> {
        self.navigation.get(result).map(String::as_str)
    }
}

/// Main body tasks in authoring order, followed by the error-handling chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub tasks: Vec<Task>,
}

impl Workflow {
    pub fn first(&self) -> Option<&Task> {
        self.tasks.first()
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// A single, non-decomposable execution step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub data: FieldMap,
}

// =============================================================================
// EXECUTABLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyKind {
    Executable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutableBody {
    Flow { workflow: Workflow },
    Operation { action: Action },
}

/// A compiled flow or operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Executable {
    pub namespace: String,
    pub name: String,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub results: Vec<ResultDef>,
    pub pre_executable_data: FieldMap,
    pub post_executable_data: FieldMap,
    pub body: ExecutableBody,
    /// Direct dependencies only. Always empty for an operation.
    pub dependencies: Dependencies,
}

impl Executable {
    /// `namespace.name`, the id other units reference this executable by.
    pub fn id(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn workflow(&self) -> Option<&Workflow> {
        match &self.body {
            ExecutableBody::Flow { workflow } => Some(workflow),
            ExecutableBody::Operation { .. } => None,
        }
    }

    pub fn action(&self) -> Option<&Action> {
        match &self.body {
            ExecutableBody::Flow { .. } => None,
            ExecutableBody::Operation { action } => Some(action),
        }
    }

    pub fn is_flow(&self) -> bool {
        matches!(self.body, ExecutableBody::Flow { .. })
    }
}
