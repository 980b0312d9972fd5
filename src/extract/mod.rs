//! Field-extractor pipeline.
//!
//! Each extractor claims a set of raw keys and the stages it runs in. The
//! registry partitions extractors into stage groups once, at construction, and
//! is read-only afterwards so it can be shared by concurrent compilations.

pub mod action;
pub mod bindings;
pub mod task;

use std::collections::HashSet;
use std::sync::OnceLock;

use tracing::trace;

use crate::error::{CompilerError, ExtractError};
use crate::model::{FieldMap, FieldValue};
use crate::parse::RawMap;

/// Pipeline stage an extractor is eligible to run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    BeforeExecutable,
    AfterExecutable,
    Action,
    BeforeTask,
    AfterTask,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::BeforeExecutable,
        Stage::AfterExecutable,
        Stage::Action,
        Stage::BeforeTask,
        Stage::AfterTask,
    ];

    fn index(self) -> usize {
        match self {
            Stage::BeforeExecutable => 0,
            Stage::AfterExecutable => 1,
            Stage::Action => 2,
            Stage::BeforeTask => 3,
            Stage::AfterTask => 4,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::BeforeExecutable => write!(f, "before-executable"),
            Stage::AfterExecutable => write!(f, "after-executable"),
            Stage::Action => write!(f, "action"),
            Stage::BeforeTask => write!(f, "before-task"),
            Stage::AfterTask => write!(f, "after-task"),
        }
    }
}

/// Turns the raw keys it claims into typed fields.
pub trait FieldExtractor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Raw keys this extractor consumes.
    fn keys(&self) -> &'static [&'static str];

    /// Stages this extractor runs in.
    fn stages(&self) -> &'static [Stage];

    /// Produce fields from `raw`. Only called when at least one of `keys()` is
    /// present in `raw`.
    fn extract(&self, raw: &RawMap) -> Result<Vec<(String, FieldValue)>, ExtractError>;
}

/// The fixed set of extractors, grouped by stage.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn FieldExtractor>>,
    groups: [Vec<usize>; 5],
}

impl ExtractorRegistry {
    /// Build a registry. Registration order is the run order within a stage,
    /// so a later extractor overwrites a same-named field of an earlier one.
    pub fn new(extractors: Vec<Box<dyn FieldExtractor>>) -> Self {
        let groups = Stage::ALL.map(|stage| {
            extractors
                .iter()
                .enumerate()
                .filter(|(_, e)| e.stages().contains(&stage))
                .map(|(i, _)| i)
                .collect::<Vec<usize>>()
        });
        ExtractorRegistry { extractors, groups }
    }

    /// Registry holding the standard DSL extractors.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(bindings::InputsExtractor),
            Box::new(bindings::OutputsExtractor),
            Box::new(bindings::ResultsExtractor),
            Box::new(bindings::DoExtractor),
            Box::new(task::ForExtractor),
            Box::new(bindings::PublishExtractor),
            Box::new(task::NavigateExtractor),
            Box::new(action::JavaActionExtractor),
            Box::new(action::PythonScriptExtractor),
        ])
    }

    /// Process-wide standard registry, built on first use.
    pub fn global() -> &'static ExtractorRegistry {
        static GLOBAL: OnceLock<ExtractorRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ExtractorRegistry::standard)
    }

    /// Extractors registered for `stage`, in registration order.
    pub fn stage(&self, stage: Stage) -> Vec<&dyn FieldExtractor> {
        self.groups[stage.index()]
            .iter()
            .map(|&i| self.extractors[i].as_ref())
            .collect()
    }

    /// Extractors registered for any of `stages`, each listed once.
    pub fn stages(&self, stages: &[Stage]) -> Vec<&dyn FieldExtractor> {
        let mut indices: Vec<usize> = stages
            .iter()
            .flat_map(|s| self.groups[s.index()].iter().copied())
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices.into_iter().map(|i| self.extractors[i].as_ref()).collect()
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.extractors.iter().map(|e| e.name()).collect();
        f.debug_struct("ExtractorRegistry").field("extractors", &names).finish()
    }
}

/// Fail if `raw` holds a key that none of `extractors` consumes and that is not
/// listed in `additional`.
pub fn validate_keys(
    unit: &str,
    raw: &RawMap,
    extractors: &[&dyn FieldExtractor],
    additional: &[&str],
) -> Result<(), CompilerError> {
    let allowed: HashSet<&str> = extractors
        .iter()
        .flat_map(|e| e.keys().iter().copied())
        .chain(additional.iter().copied())
        .collect();

    match raw.keys().find(|k| !allowed.contains(k.as_str())) {
        Some(key) => Err(CompilerError::UnknownKeyword {
            unit: unit.to_string(),
            key: key.clone(),
        }),
        None => Ok(()),
    }
}

/// Apply `extractors` to `raw` in order and merge what they produce.
pub fn run_stage(
    unit: &str,
    raw: &RawMap,
    extractors: &[&dyn FieldExtractor],
) -> Result<FieldMap, CompilerError> {
    let mut fields = FieldMap::new();

    for extractor in extractors {
        if !extractor.keys().iter().any(|k| raw.contains_key(*k)) {
            continue;
        }
        trace!(unit, extractor = extractor.name(), "running field extractor");
        let produced = extractor.extract(raw).map_err(|source| CompilerError::Extractor {
            unit: unit.to_string(),
            source,
        })?;
        fields.extend(produced);
    }

    Ok(fields)
}
