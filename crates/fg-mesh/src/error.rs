//! Error types for mesh, basis and element-template operations.

use fg_core::{ApiErrorKind, ElementIdentifier};
use std::fmt;

/// Errors arising from mesh, basis and element-template operations.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Attempted to construct a basis with zero dimensions.
    EmptyBasis,
    /// A simplex basis tag appeared on exactly one chart coordinate; simplex
    /// tags must be linked across two or more coordinates.
    UnlinkedSimplexDirection {
        /// Index of the offending chart coordinate.
        axis: usize,
    },
    /// An element template was used before a required field component was
    /// defined on it.
    UndefinedComponent {
        /// Field component index that was missing.
        component: usize,
    },
    /// `create` was called with an identifier already present in the mesh.
    DuplicateElement(ElementIdentifier),
    /// `destroy` / `define` / `merge` referenced an identifier absent from
    /// the mesh.
    UnknownElement(ElementIdentifier),
    /// A scale-factor set was referenced with a count that conflicts with
    /// its existing (write-once) count.
    ScaleFactorSetConflict {
        /// The set's identifier.
        set: u32,
        /// The count already recorded for this set.
        existing: u32,
        /// The count the caller attempted to write.
        attempted: u32,
    },
    /// The template's validated shape could not accommodate the requested
    /// element field definition (e.g. local node index out of range).
    InvalidElementField {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBasis => write!(f, "basis must have at least one chart dimension"),
            Self::UnlinkedSimplexDirection { axis } => {
                write!(f, "simplex basis on chart axis {axis} has no linked partner")
            }
            Self::UndefinedComponent { component } => {
                write!(f, "component {component} has no element field definition")
            }
            Self::DuplicateElement(id) => write!(f, "element {id} already exists"),
            Self::UnknownElement(id) => write!(f, "element {id} not found"),
            Self::ScaleFactorSetConflict { set, existing, attempted } => write!(
                f,
                "scale factor set {set} already has count {existing}, cannot change to {attempted}"
            ),
            Self::InvalidElementField { reason } => write!(f, "invalid element field: {reason}"),
        }
    }
}

impl std::error::Error for MeshError {}

impl From<&MeshError> for ApiErrorKind {
    fn from(value: &MeshError) -> Self {
        match value {
            MeshError::EmptyBasis
            | MeshError::UnlinkedSimplexDirection { .. }
            | MeshError::UndefinedComponent { .. }
            | MeshError::InvalidElementField { .. } => ApiErrorKind::Argument,
            MeshError::DuplicateElement(_) => ApiErrorKind::AlreadyExists,
            MeshError::UnknownElement(_) => ApiErrorKind::NotFound,
            MeshError::ScaleFactorSetConflict { .. } => ApiErrorKind::InUse,
        }
    }
}
