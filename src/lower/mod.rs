//! Lowering phase: raw executable document → `Executable`.
//!
//! Drives the executable-level extractor stages, then branches on the unit
//! kind: flows go through the workflow builder, operations through the action
//! compiler.

pub mod action;
pub mod dependencies;
pub mod reference;
pub mod task;
pub mod workflow;

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::config::BuilderConfig;
use crate::error::CompilerError;
use crate::extract::{ExtractorRegistry, Stage, run_stage, validate_keys};
use crate::keywords::*;
use crate::model::*;
use crate::parse::{Imports, ParsedUnit, RawMap, SourceUnit, UnitKind, value_type_name};
use crate::validate::validate_workflow;

/// What every task and action compiled for one executable shares.
pub struct Scope<'a> {
    pub registry: &'a ExtractorRegistry,
    pub imports: Option<&'a Imports>,
    /// Executable name, used to tag errors raised outside a task.
    pub unit: &'a str,
}

/// Compiles raw executable documents against a fixed extractor registry.
#[derive(Debug, Clone)]
pub struct ExecutableBuilder<'r> {
    registry: &'r ExtractorRegistry,
    config: BuilderConfig,
}

impl Default for ExecutableBuilder<'static> {
    fn default() -> Self {
        ExecutableBuilder::new(ExtractorRegistry::global(), BuilderConfig::default())
    }
}

impl<'r> ExecutableBuilder<'r> {
    pub fn new(registry: &'r ExtractorRegistry, config: BuilderConfig) -> Self {
        ExecutableBuilder { registry, config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Compile a source split by `parse::parse_source`.
    pub fn compile_source(&self, source: SourceUnit) -> Result<Executable, CompilerError> {
        self.assemble(&source.unit, &source.executable_name, source.document)
    }

    /// Compile the executable `name` declared in `unit` from its raw document.
    pub fn assemble(
        &self,
        unit: &ParsedUnit,
        name: &str,
        mut raw: RawMap,
    ) -> Result<Executable, CompilerError> {
        if raw.is_empty() {
            return Err(CompilerError::missing(
                "A002",
                &unit.name,
                format!("Executable data for '{}' is empty", name),
            ));
        }

        debug!(unit = %unit.name, executable = name, kind = %unit.kind, "assembling executable");

        let registry = self.registry;
        validate_keys(
            name,
            &raw,
            &registry.stages(&[Stage::BeforeExecutable, Stage::AfterExecutable]),
            EXECUTABLE_ADDITIONAL_KEYWORDS,
        )?;

        let mut pre_executable_data = run_stage(name, &raw, &registry.stage(Stage::BeforeExecutable))?;
        let mut post_executable_data = run_stage(name, &raw, &registry.stage(Stage::AfterExecutable))?;

        let mut inputs = match pre_executable_data.remove(INPUTS_KEY) {
            Some(FieldValue::Inputs(inputs)) => inputs,
            _ => Vec::new(),
        };
        let outputs = match post_executable_data.remove(OUTPUTS_KEY) {
            Some(FieldValue::Outputs(outputs)) => outputs,
            _ => Vec::new(),
        };
        let results = match post_executable_data.remove(RESULTS_KEY) {
            Some(FieldValue::Results(results)) => results,
            _ => Vec::new(),
        };

        let scope = Scope {
            registry,
            imports: unit.imports.as_ref(),
            unit: name,
        };
        reference::resolve_system_properties(&mut inputs, scope.imports)
            .map_err(|e| e.in_unit(&unit.name))?;

        let (body, dependencies) = match unit.kind {
            UnitKind::Flow => {
                let workflow = self.compile_flow_body(&scope, unit, &mut raw)?;
                let dependencies = dependencies::direct_dependencies(&workflow);
                debug!(
                    executable = name,
                    tasks = workflow.len(),
                    dependencies = dependencies.len(),
                    "flow compiled"
                );
                (ExecutableBody::Flow { workflow }, dependencies)
            }
            UnitKind::Operation => {
                let action = self.compile_operation_body(&scope, unit, &mut raw)?;
                debug!(executable = name, "operation compiled");
                (ExecutableBody::Operation { action }, Dependencies::new())
            }
            UnitKind::SystemProperties => {
                return Err(CompilerError::UnsupportedKind {
                    unit: unit.name.clone(),
                });
            }
        };

        Ok(Executable {
            namespace: unit.namespace.clone(),
            name: name.to_string(),
            inputs,
            outputs,
            results,
            pre_executable_data,
            post_executable_data,
            body,
            dependencies,
        })
    }

    fn compile_flow_body(
        &self,
        scope: &Scope<'_>,
        unit: &ParsedUnit,
        raw: &mut RawMap,
    ) -> Result<Workflow, CompilerError> {
        let name = scope.unit;
        let mut raw_tasks = match raw.shift_remove(WORKFLOW_KEY) {
            None => {
                return Err(CompilerError::missing(
                    "A003",
                    &unit.name,
                    format!("Flow '{}' has no '{}' property", name, WORKFLOW_KEY),
                ));
            }
            Some(Value::Object(map)) => map,
            Some(Value::Null) => RawMap::new(),
            Some(other) => {
                return Err(CompilerError::shape(
                    "A004",
                    &unit.name,
                    format!(
                        "Flow '{}': below '{}' there should be a map of tasks, found {}",
                        name,
                        WORKFLOW_KEY,
                        value_type_name(&other)
                    ),
                ));
            }
        };

        if raw_tasks.is_empty() {
            return Err(CompilerError::missing(
                "A005",
                &unit.name,
                format!("Flow '{}' has no workflow data", name),
            ));
        }

        let error_chain = match workflow::take_error_section(name, &mut raw_tasks)? {
            Some(section) => Some(workflow::compile_workflow(scope, section, None, true)?),
            None => None,
        };

        let workflow = workflow::compile_workflow(scope, raw_tasks, error_chain, false)?;

        if self.config.unique_task_names {
            let mut seen = HashSet::new();
            if let Some(dup) = workflow.tasks.iter().find(|t| !seen.insert(t.name.as_str())) {
                return Err(CompilerError::DuplicateTask {
                    unit: unit.name.clone(),
                    task: dup.name.clone(),
                });
            }
        }

        if self.config.validate_navigation {
            if let Some(first) = validate_workflow(&workflow).into_iter().next() {
                return Err(CompilerError::Navigation {
                    unit: unit.name.clone(),
                    source: first,
                });
            }
        }

        Ok(workflow)
    }

    fn compile_operation_body(
        &self,
        scope: &Scope<'_>,
        unit: &ParsedUnit,
        raw: &mut RawMap,
    ) -> Result<Action, CompilerError> {
        let name = scope.unit;
        let action_raw = match raw.shift_remove(ACTION_KEY) {
            Some(Value::Object(map)) if !map.is_empty() => map,
            None | Some(Value::Null) | Some(Value::Object(_)) => {
                return Err(CompilerError::missing(
                    "A008",
                    &unit.name,
                    format!("Operation '{}' has no action data", name),
                ));
            }
            Some(other) => {
                return Err(CompilerError::shape(
                    "A007",
                    &unit.name,
                    format!(
                        "Operation '{}': below '{}' there should be a map such as '{}:' or '{}:', found {}",
                        name,
                        ACTION_KEY,
                        PYTHON_SCRIPT_KEY,
                        JAVA_ACTION_KEY,
                        value_type_name(&other)
                    ),
                ));
            }
        };

        action::compile_action(scope, &action_raw)
    }
}

/// Compile with the process-wide registry and default options.
pub fn assemble(unit: &ParsedUnit, name: &str, raw: RawMap) -> Result<Executable, CompilerError> {
    ExecutableBuilder::default().assemble(unit, name, raw)
}
