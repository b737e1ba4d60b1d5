//! Registry of built-in field-core type tags.
//!
//! Round-trips to and from the two string forms every field variant is
//! identified by externally: a short type tag (`"ADD"`) and a class name
//! (`"FieldAdd"`).

/// One of the built-in field-core variants shipped by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTypeTag {
    /// [`crate::ConstantField`].
    Constant,
    /// [`crate::AddField`].
    Add,
    /// [`crate::CoordinatesField`].
    Coordinates,
}

impl FieldTypeTag {
    /// Every variant, for exhaustive round-trip checks.
    pub const ALL: [FieldTypeTag; 3] = [Self::Constant, Self::Add, Self::Coordinates];

    /// The short type tag (matches [`fg_field::FieldCore::type_string`]).
    pub fn type_string(self) -> &'static str {
        match self {
            Self::Constant => "CONSTANT",
            Self::Add => "ADD",
            Self::Coordinates => "COORDINATES",
        }
    }

    /// The class-name form, e.g. `"FieldAdd"`.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Constant => "FieldConstant",
            Self::Add => "FieldAdd",
            Self::Coordinates => "FieldCoordinates",
        }
    }

    /// Parse a short type tag, the inverse of [`Self::type_string`].
    pub fn from_type_string(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.type_string() == s)
    }

    /// Parse a class name, the inverse of [`Self::class_name`].
    pub fn from_class_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.class_name() == s)
    }
}
