//! Coordinate systems and the value-type tag shared by every field.

use crate::error::CoreError;
use std::fmt;

/// The shape a field's evaluated value takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// A vector of `components` real numbers.
    Real,
    /// A single immutable string.
    String,
    /// An element reference with parametric coordinates.
    MeshLocation,
}

impl ValueType {
    /// Stable textual tag, as used in `enum_to_string`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "REAL",
            Self::String => "STRING",
            Self::MeshLocation => "MESH_LOCATION",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinate-system variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateSystemType {
    /// Rectangular Cartesian coordinates.
    RectangularCartesian,
    /// Cylindrical polar coordinates.
    CylindricalPolar,
    /// Spherical polar coordinates.
    SphericalPolar,
    /// Prolate spheroidal coordinates; carries a positive focus.
    ProlateSpheroidal,
    /// Oblate spheroidal coordinates; carries a positive focus.
    ObateSpheroidal,
    /// Fibre coordinates (anatomical fibre/sheet/normal axes).
    Fibre,
    /// No coordinate system applies.
    NotApplicable,
}

impl CoordinateSystemType {
    /// Stable textual tag, as used in `enum_to_string`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RectangularCartesian => "RECTANGULAR_CARTESIAN",
            Self::CylindricalPolar => "CYLINDRICAL_POLAR",
            Self::SphericalPolar => "SPHERICAL_POLAR",
            Self::ProlateSpheroidal => "PROLATE_SPHEROIDAL",
            Self::ObateSpheroidal => "OBLATE_SPHEROIDAL",
            Self::Fibre => "FIBRE",
            Self::NotApplicable => "NOT_APPLICABLE",
        }
    }

    /// Parse a tag produced by [`Self::as_str`].
    pub fn from_str_tag(tag: &str) -> Result<Self, CoreError> {
        Ok(match tag {
            "RECTANGULAR_CARTESIAN" => Self::RectangularCartesian,
            "CYLINDRICAL_POLAR" => Self::CylindricalPolar,
            "SPHERICAL_POLAR" => Self::SphericalPolar,
            "PROLATE_SPHEROIDAL" => Self::ProlateSpheroidal,
            "OBLATE_SPHEROIDAL" => Self::ObateSpheroidal,
            "FIBRE" => Self::Fibre,
            "NOT_APPLICABLE" => Self::NotApplicable,
            other => {
                return Err(CoreError::UnknownEnumTag {
                    family: "coordinate_system_type",
                    tag: other.to_string(),
                })
            }
        })
    }

    /// Whether this variant requires a positive focus parameter.
    pub fn requires_focus(&self) -> bool {
        matches!(self, Self::ProlateSpheroidal | Self::ObateSpheroidal)
    }
}

impl fmt::Display for CoordinateSystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors specific to constructing or assigning a [`CoordinateSystem`].
pub type CoordinateSystemError = CoreError;

/// Tagged record attached to a numeric field: a coordinate-system type plus
/// an optional focus parameter (required, and required positive, for the
/// two spheroidal variants).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSystem {
    type_tag: CoordinateSystemType,
    focus: Option<f64>,
}

impl CoordinateSystem {
    /// The canonical "no coordinate system" value, used for string and
    /// mesh-location fields.
    pub const NOT_APPLICABLE: CoordinateSystem = CoordinateSystem {
        type_tag: CoordinateSystemType::NotApplicable,
        focus: None,
    };

    /// Construct a coordinate system, validating the focus requirement.
    ///
    /// `focus` is ignored (stored as `None`) for variants that do not use
    /// it, and must be `Some(positive)` for prolate/oblate spheroidal.
    pub fn new(type_tag: CoordinateSystemType, focus: Option<f64>) -> Result<Self, CoreError> {
        if type_tag.requires_focus() {
            match focus {
                Some(f) if f > 0.0 => Ok(Self { type_tag, focus: Some(f) }),
                _ => Err(CoreError::InvalidFocus { type_tag: type_tag.as_str() }),
            }
        } else {
            Ok(Self { type_tag, focus: None })
        }
    }

    /// The coordinate-system type.
    pub fn type_tag(&self) -> CoordinateSystemType {
        self.type_tag
    }

    /// The focus parameter, if this variant carries one.
    pub fn focus(&self) -> Option<f64> {
        self.focus
    }

    /// Validate that this coordinate system may be attached to a field of
    /// the given value type: only `NOT_APPLICABLE` is valid on string and
    /// mesh-location fields.
    pub fn validate_for_value_type(&self, value_type: ValueType) -> Result<(), CoreError> {
        if self.type_tag != CoordinateSystemType::NotApplicable
            && matches!(value_type, ValueType::String | ValueType::MeshLocation)
        {
            return Err(CoreError::CoordinateSystemNotApplicable {
                value_type: if value_type == ValueType::String { "string" } else { "mesh_location" },
            });
        }
        Ok(())
    }
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self::NOT_APPLICABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_system_type_round_trips() {
        let all = [
            CoordinateSystemType::RectangularCartesian,
            CoordinateSystemType::CylindricalPolar,
            CoordinateSystemType::SphericalPolar,
            CoordinateSystemType::ProlateSpheroidal,
            CoordinateSystemType::ObateSpheroidal,
            CoordinateSystemType::Fibre,
            CoordinateSystemType::NotApplicable,
        ];
        for tag in all {
            let s = tag.as_str();
            assert_eq!(CoordinateSystemType::from_str_tag(s).unwrap(), tag);
        }
    }

    #[test]
    fn from_str_tag_rejects_unknown() {
        assert!(CoordinateSystemType::from_str_tag("NOT_A_REAL_TAG").is_err());
    }

    #[test]
    fn prolate_spheroidal_requires_positive_focus() {
        assert!(CoordinateSystem::new(CoordinateSystemType::ProlateSpheroidal, None).is_err());
        assert!(CoordinateSystem::new(CoordinateSystemType::ProlateSpheroidal, Some(-1.0)).is_err());
        assert!(CoordinateSystem::new(CoordinateSystemType::ProlateSpheroidal, Some(1.0)).is_ok());
    }

    #[test]
    fn rectangular_cartesian_ignores_focus() {
        let cs = CoordinateSystem::new(CoordinateSystemType::RectangularCartesian, Some(5.0)).unwrap();
        assert_eq!(cs.focus(), None);
    }

    #[test]
    fn non_applicable_required_on_string_fields() {
        let cs = CoordinateSystem::new(CoordinateSystemType::RectangularCartesian, None).unwrap();
        assert!(cs.validate_for_value_type(ValueType::String).is_err());
        assert!(CoordinateSystem::NOT_APPLICABLE.validate_for_value_type(ValueType::String).is_ok());
        assert!(cs.validate_for_value_type(ValueType::Real).is_ok());
    }
}
