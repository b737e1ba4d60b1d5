//! Errors from the field graph, evaluation protocol and manager.

use fg_core::{ApiErrorKind, FieldId};
use std::fmt;

/// Errors arising from field-graph and evaluation operations.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// A field's name clashed with an existing, non-auto-named field.
    NameAlreadyExists {
        /// The clashing name.
        name: String,
    },
    /// Installing or modifying a field would introduce a cycle in the
    /// source-field graph.
    Cycle {
        /// The field that would depend on itself transitively.
        field: FieldId,
    },
    /// A source field belongs to a different region/manager.
    ForeignRegionSource {
        /// The offending source field.
        source: FieldId,
    },
    /// Component count or value type would change while the field is
    /// referenced by a dependant.
    ChangeWhileInUse {
        /// The field that is still in use.
        field: FieldId,
    },
    /// The field's core cannot be replaced by the proposed replacement
    /// (different variant tag and the old core is still in use).
    CoreNotReplaceable {
        /// The field whose core replacement was rejected.
        field: FieldId,
    },
    /// A handle did not resolve to a live field.
    UnknownField(FieldId),
    /// A cache or field argument did not satisfy a precondition (wrong
    /// value type, out-of-range component, mismatched region, null
    /// differential operator, and similar).
    InvalidArgument {
        /// What went wrong.
        reason: String,
    },
    /// Evaluation failed; the value cache was marked invalid.
    EvaluationFailed {
        /// The field that failed to evaluate.
        field: FieldId,
    },
    /// Allocation failed while applying a structural change.
    Memory,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameAlreadyExists { name } => write!(f, "field name {name:?} already exists"),
            Self::Cycle { field } => write!(f, "{field} would depend on itself"),
            Self::ForeignRegionSource { source } => {
                write!(f, "source {source} belongs to a different region")
            }
            Self::ChangeWhileInUse { field } => {
                write!(f, "{field} cannot change component count or value type while in use")
            }
            Self::CoreNotReplaceable { field } => {
                write!(f, "{field}'s core cannot be replaced by the proposed definition")
            }
            Self::UnknownField(field) => write!(f, "{field} not found"),
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::EvaluationFailed { field } => write!(f, "evaluation of {field} failed"),
            Self::Memory => write!(f, "allocation failed"),
        }
    }
}

impl std::error::Error for FieldError {}

impl From<&FieldError> for ApiErrorKind {
    fn from(value: &FieldError) -> Self {
        match value {
            FieldError::NameAlreadyExists { .. } => ApiErrorKind::AlreadyExists,
            FieldError::Cycle { .. }
            | FieldError::ForeignRegionSource { .. }
            | FieldError::InvalidArgument { .. } => ApiErrorKind::Argument,
            FieldError::ChangeWhileInUse { .. } | FieldError::CoreNotReplaceable { .. } => {
                ApiErrorKind::InUse
            }
            FieldError::UnknownField(_) => ApiErrorKind::NotFound,
            FieldError::EvaluationFailed { .. } => ApiErrorKind::General,
            FieldError::Memory => ApiErrorKind::Memory,
        }
    }
}
