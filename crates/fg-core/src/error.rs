//! The API error-kind taxonomy and the core-level error enum.
//!
//! Every crate boundary above this one defines its own `Display + Error`
//! enum for its own failure modes, then maps each variant onto one of the
//! seven [`ApiErrorKind`] values at the point where it crosses the
//! C-style API surface.

use std::error::Error;
use std::fmt;

/// The seven error kinds returned across the external API, as integer
/// codes rather than exceptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// The operation succeeded.
    Ok,
    /// Null handle, out-of-range index, wrong value type, or mismatched
    /// region between a field and a cache.
    Argument,
    /// A field with the requested name already exists.
    AlreadyExists,
    /// Allocation failed while applying a structural change.
    Memory,
    /// No field, element, node or mesh matched the request.
    NotFound,
    /// The operation is forbidden while the target is in use.
    InUse,
    /// Any other failure not covered by the above.
    General,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::Argument => "argument",
            Self::AlreadyExists => "already_exists",
            Self::Memory => "memory",
            Self::NotFound => "not_found",
            Self::InUse => "in_use",
            Self::General => "general",
        };
        f.write_str(s)
    }
}

/// Errors shared by the leaf-level types in this crate: coordinate systems
/// and the ambient region configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// A coordinate-system focus was required (prolate/oblate spheroidal)
    /// but missing or non-positive.
    InvalidFocus {
        /// The coordinate-system type that required a positive focus.
        type_tag: &'static str,
    },
    /// A non-"not-applicable" coordinate-system type was set on a field
    /// whose value type does not admit one (string or mesh-location).
    CoordinateSystemNotApplicable {
        /// The value type that rejects a real coordinate system.
        value_type: &'static str,
    },
    /// An enum string did not match any known variant during
    /// `enum_from_string`.
    UnknownEnumTag {
        /// The enumeration family being parsed (e.g. `"coordinate_system_type"`).
        family: &'static str,
        /// The string that failed to parse.
        tag: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFocus { type_tag } => {
                write!(f, "coordinate system {type_tag} requires a positive focus")
            }
            Self::CoordinateSystemNotApplicable { value_type } => write!(
                f,
                "coordinate system must be not-applicable for {value_type} fields"
            ),
            Self::UnknownEnumTag { family, tag } => {
                write!(f, "unknown {family} tag: {tag:?}")
            }
        }
    }
}

impl Error for CoreError {}

impl From<&CoreError> for ApiErrorKind {
    fn from(value: &CoreError) -> Self {
        match value {
            CoreError::InvalidFocus { .. }
            | CoreError::CoordinateSystemNotApplicable { .. }
            | CoreError::UnknownEnumTag { .. } => ApiErrorKind::Argument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_display_as_their_wire_tag() {
        assert_eq!(ApiErrorKind::Argument.to_string(), "argument");
        assert_eq!(ApiErrorKind::AlreadyExists.to_string(), "already_exists");
        assert_eq!(ApiErrorKind::InUse.to_string(), "in_use");
    }

    #[test]
    fn core_errors_map_to_argument() {
        let e = CoreError::InvalidFocus { type_tag: "prolate_spheroidal" };
        assert_eq!(ApiErrorKind::from(&e), ApiErrorKind::Argument);
    }
}
