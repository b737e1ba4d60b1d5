//! Boundary topology behavior for structured mesh backends.

/// How a structured mesh handles chart neighbours at its boundary.
///
/// This is distinct from a field's own boundary *value* handling — that is
/// a concern of individual field cores and out of scope here.
/// `EdgeBehavior` only controls mesh *topology*: which elements
/// are considered adjacent across a chart boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeBehavior {
    /// Out-of-bounds neighbour maps to the boundary element (self-loop).
    Clamp,
    /// Out-of-bounds neighbour wraps to the opposite side (periodic).
    Wrap,
    /// Out-of-bounds neighbour is omitted (fewer neighbours at the edge).
    Absorb,
}
