//! Compile an operation's `action` section.

use super::Scope;
use crate::error::CompilerError;
use crate::extract::{Stage, run_stage, validate_keys};
use crate::keywords::ACTION_KEY;
use crate::model::Action;
use crate::parse::RawMap;

pub fn compile_action(scope: &Scope<'_>, raw: &RawMap) -> Result<Action, CompilerError> {
    let unit = format!("{} {}", scope.unit, ACTION_KEY);
    let extractors = scope.registry.stage(Stage::Action);

    validate_keys(&unit, raw, &extractors, &[])?;
    let data = run_stage(&unit, raw, &extractors)?;

    Ok(Action { data })
}
