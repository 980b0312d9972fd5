//! Unified compiler error type used across all builder stages.

use thiserror::Error;

use crate::validate::ValidationError;

/// Coarse classification of a compilation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A reserved section has the wrong structural type.
    Shape,
    /// A required section is absent or empty.
    MissingData,
    /// The document carries a key nobody claims.
    UnknownKeyword,
    /// An alias could not be resolved against the import table.
    Reference,
    /// A field extractor rejected its input.
    Extractor,
    /// The compiled graph breaks a structural rule.
    Structure,
    /// The front-end source could not be split into a unit.
    Source,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Shape => write!(f, "Shape"),
            ErrorKind::MissingData => write!(f, "Missing data"),
            ErrorKind::UnknownKeyword => write!(f, "Unknown keyword"),
            ErrorKind::Reference => write!(f, "Reference"),
            ErrorKind::Extractor => write!(f, "Extractor"),
            ErrorKind::Structure => write!(f, "Structure"),
            ErrorKind::Source => write!(f, "Source"),
        }
    }
}

/// Failure raised by a single field extractor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("'{key}' must be {expected}, found {found}")]
    Shape {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("'{key}': {message}")]
    Invalid { key: String, message: String },
}

impl ExtractError {
    pub fn shape(key: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        ExtractError::Shape {
            key: key.into(),
            expected,
            found,
        }
    }

    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        ExtractError::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// A fatal compilation failure. The builder never returns a partial model.
#[derive(Debug, Clone, Error)]
pub enum CompilerError {
    #[error("Error compiling {unit}. {message}")]
    Shape {
        code: &'static str,
        unit: String,
        message: String,
    },

    #[error("Error compiling {unit}. {message}")]
    MissingData {
        code: &'static str,
        unit: String,
        message: String,
    },

    #[error("Error compiling {unit}. Unrecognized keyword: '{key}'")]
    UnknownKeyword { unit: String, key: String },

    #[error("Unresolved alias: {alias} (in reference '{reference}')")]
    UnresolvedAlias {
        /// Task or executable the reference appeared in, once known.
        unit: Option<String>,
        alias: String,
        reference: String,
    },

    #[error("No imports specified for source: {reference}")]
    MissingImports {
        unit: Option<String>,
        reference: String,
    },

    #[error("For {unit} syntax is illegal.\n{source}")]
    Extractor {
        unit: String,
        #[source]
        source: ExtractError,
    },

    #[error("Error compiling {unit}. It is not of flow or operation type")]
    UnsupportedKind { unit: String },

    #[error("Error compiling {unit}. Task name '{task}' is used more than once in the workflow")]
    DuplicateTask { unit: String, task: String },

    #[error("Error compiling {unit}. {source}")]
    Navigation {
        unit: String,
        #[source]
        source: ValidationError,
    },

    #[error("[{code}] {message}")]
    Source { code: &'static str, message: String },
}

impl CompilerError {
    pub fn shape(code: &'static str, unit: impl Into<String>, message: impl Into<String>) -> Self {
        CompilerError::Shape {
            code,
            unit: unit.into(),
            message: message.into(),
        }
    }

    pub fn missing(code: &'static str, unit: impl Into<String>, message: impl Into<String>) -> Self {
        CompilerError::MissingData {
            code,
            unit: unit.into(),
            message: message.into(),
        }
    }

    pub fn invalid_source(code: &'static str, message: impl Into<String>) -> Self {
        CompilerError::Source {
            code,
            message: message.into(),
        }
    }

    /// Attach the task or executable name to a reference failure raised by
    /// the context-free resolver. Other errors pass through unchanged.
    pub fn in_unit(mut self, name: &str) -> Self {
        if let CompilerError::UnresolvedAlias { unit, .. } | CompilerError::MissingImports { unit, .. } =
            &mut self
        {
            unit.get_or_insert_with(|| name.to_string());
        }
        self
    }

    /// Stable short code identifying the failing rule.
    pub fn code(&self) -> &'static str {
        match self {
            CompilerError::Shape { code, .. } => *code,
            CompilerError::MissingData { code, .. } => *code,
            CompilerError::UnknownKeyword { .. } => "K001",
            CompilerError::UnresolvedAlias { .. } => "R001",
            CompilerError::MissingImports { .. } => "R002",
            CompilerError::Extractor { .. } => "X001",
            CompilerError::UnsupportedKind { .. } => "A001",
            CompilerError::DuplicateTask { .. } => "W002",
            CompilerError::Navigation { source, .. } => source.code,
            CompilerError::Source { code, .. } => *code,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CompilerError::Shape { .. } => ErrorKind::Shape,
            CompilerError::MissingData { .. } => ErrorKind::MissingData,
            CompilerError::UnknownKeyword { .. } => ErrorKind::UnknownKeyword,
            CompilerError::UnresolvedAlias { .. } | CompilerError::MissingImports { .. } => {
                ErrorKind::Reference
            }
            CompilerError::Extractor { .. } => ErrorKind::Extractor,
            CompilerError::UnsupportedKind { .. }
            | CompilerError::DuplicateTask { .. }
            | CompilerError::Navigation { .. } => ErrorKind::Structure,
            CompilerError::Source { .. } => ErrorKind::Source,
        }
    }

    /// Name of the unit (executable or task) the failure was raised for, if known.
    pub fn unit(&self) -> Option<&str> {
        match self {
            CompilerError::Shape { unit, .. }
            | CompilerError::MissingData { unit, .. }
            | CompilerError::UnknownKeyword { unit, .. }
            | CompilerError::Extractor { unit, .. }
            | CompilerError::UnsupportedKind { unit }
            | CompilerError::DuplicateTask { unit, .. }
            | CompilerError::Navigation { unit, .. } => Some(unit),
            CompilerError::UnresolvedAlias { unit, .. } | CompilerError::MissingImports { unit, .. } => {
                unit.as_deref()
            }
            CompilerError::Source { .. } => None,
        }
    }
}
