//! Resolve `alias.name` references against a unit's import table.

use crate::error::CompilerError;
use crate::model::Input;
use crate::parse::Imports;

/// Resolve `alias.remainder` into `imports[alias].remainder`.
///
/// Only the alias is checked; whether the resolved executable exists is left
/// to the loading stage.
pub fn resolve_ref_id(reference: &str, imports: Option<&Imports>) -> Result<String, CompilerError> {
    let (alias, remainder) = split_ref(reference);

    let imports = imports.ok_or_else(|| CompilerError::MissingImports {
        unit: None,
        reference: reference.to_string(),
    })?;

    let namespace = imports
        .get(alias)
        .ok_or_else(|| CompilerError::UnresolvedAlias {
            unit: None,
            alias: alias.to_string(),
            reference: reference.to_string(),
        })?;

    Ok(format!("{}.{}", namespace, remainder))
}

/// Rewrite every input backed by a system property to its fully-qualified
/// property name.
pub fn resolve_system_properties(
    inputs: &mut [Input],
    imports: Option<&Imports>,
) -> Result<(), CompilerError> {
    for input in inputs.iter_mut() {
        if let Some(property) = input.system_property.as_deref() {
            let resolved = resolve_ref_id(property, imports)?;
            input.system_property = Some(resolved);
        }
    }
    Ok(())
}

fn split_ref(s: &str) -> (&str, &str) {
    match s.find('.') {
        Some(pos) => (&s[..pos], &s[pos + 1..]),
        None => (s, ""),
    }
}
