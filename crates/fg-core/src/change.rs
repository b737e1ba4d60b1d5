//! The change-status bitmask carried by every field.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Change-status bitmask: *identifier*, *definition*,
/// *full result*, *partial result*, *dependency*.
///
/// Mirrors the hand-rolled bitset style used elsewhere in this workspace
/// for small, fixed-universe flag sets, rather than pulling in a bitflags
/// dependency for five named bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ChangeFlags(u8);

impl ChangeFlags {
    /// The field's name (or other identity) changed.
    pub const IDENTIFIER: ChangeFlags = ChangeFlags(1 << 0);
    /// The field's core, sources or coordinate system changed.
    pub const DEFINITION: ChangeFlags = ChangeFlags(1 << 1);
    /// A source (transitively) changed in a way that invalidates every
    /// evaluated result.
    pub const FULL_RESULT: ChangeFlags = ChangeFlags(1 << 2);
    /// A source changed in a way that may only invalidate some evaluated
    /// results (e.g. a sparsely-assigned stored field).
    pub const PARTIAL_RESULT: ChangeFlags = ChangeFlags(1 << 3);
    /// The field depends, directly or transitively, on a field that
    /// changed; carried even when this field's own results are unaffected.
    pub const DEPENDENCY: ChangeFlags = ChangeFlags(1 << 4);

    /// The empty flag set.
    pub const NONE: ChangeFlags = ChangeFlags(0);

    /// Whether no flags are set.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Whether `self` contains every bit of `other`.
    pub fn contains(self, other: ChangeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the given flags, returning the updated value.
    pub fn insert(&mut self, other: ChangeFlags) {
        self.0 |= other.0;
    }

    /// Clear every flag.
    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

impl BitOr for ChangeFlags {
    type Output = ChangeFlags;

    fn bitor(self, rhs: ChangeFlags) -> ChangeFlags {
        ChangeFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ChangeFlags {
    fn bitor_assign(&mut self, rhs: ChangeFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ChangeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("none");
        }
        let mut parts = Vec::new();
        if self.contains(Self::IDENTIFIER) {
            parts.push("identifier");
        }
        if self.contains(Self::DEFINITION) {
            parts.push("definition");
        }
        if self.contains(Self::FULL_RESULT) {
            parts.push("full_result");
        }
        if self.contains(Self::PARTIAL_RESULT) {
            parts.push("partial_result");
        }
        if self.contains(Self::DEPENDENCY) {
            parts.push("dependency");
        }
        write!(f, "{}", parts.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_none() {
        assert!(ChangeFlags::NONE.is_none());
        assert_eq!(ChangeFlags::NONE.to_string(), "none");
    }

    #[test]
    fn union_and_contains() {
        let a = ChangeFlags::IDENTIFIER | ChangeFlags::DEPENDENCY;
        assert!(a.contains(ChangeFlags::IDENTIFIER));
        assert!(a.contains(ChangeFlags::DEPENDENCY));
        assert!(!a.contains(ChangeFlags::FULL_RESULT));
    }

    #[test]
    fn insert_and_clear() {
        let mut a = ChangeFlags::NONE;
        a.insert(ChangeFlags::FULL_RESULT);
        assert!(a.contains(ChangeFlags::FULL_RESULT));
        a.clear();
        assert!(a.is_none());
    }

    #[test]
    fn full_result_beats_partial_in_display_order() {
        let a = ChangeFlags::FULL_RESULT | ChangeFlags::PARTIAL_RESULT;
        assert_eq!(a.to_string(), "full_result|partial_result");
    }
}
