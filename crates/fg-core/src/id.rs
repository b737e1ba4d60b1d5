//! Opaque identifiers used throughout the field graph.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use smallvec::SmallVec;

/// Identity of a field within its owning manager.
///
/// Allocated by the manager when a field is added; stable for the lifetime
/// of the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u32);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field#{}", self.0)
    }
}

impl From<u32> for FieldId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Dense index of a field's value-cache slot inside one `Fieldcache`.
///
/// Allocated by the manager in the same order fields are added; stable
/// across the lifetime of the field, reused (via free-list) if the field is
/// destroyed and the slot reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheIndex(pub u32);

impl fmt::Display for CacheIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cache_index#{}", self.0)
    }
}

/// Identity of an element within a mesh of a given dimension.
///
/// Element identifiers are scoped to `(region, dimension)`: an identifier of
/// `5` in the 2-D mesh is unrelated to identifier `5` in the 3-D mesh of the
/// same region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementIdentifier(pub i32);

impl fmt::Display for ElementIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Identity of a node within a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdentifier(pub i32);

impl fmt::Display for NodeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Index of one perturbable parameter inside a field's parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterIndex(pub u32);

impl fmt::Display for ParameterIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parameter#{}", self.0)
    }
}

/// Monotonic counter used as a cache-validity token.
///
/// Every location mutation on a fieldcache, and every structural mutation
/// that invalidates a derivative sub-cache, advances a `Stamp`. A cached
/// value is valid only while its recorded stamp equals the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Stamp(u64);

impl Stamp {
    /// The stamp value of a freshly created, never-evaluated cache.
    pub const NEVER: Stamp = Stamp(0);

    /// Advance this stamp by one and return the new value.
    ///
    /// Saturates rather than wraps; a region would need to mutate its
    /// location `u64::MAX` times to observe the clamp.
    pub fn advance(&mut self) -> Stamp {
        self.0 = self.0.saturating_add(1);
        *self
    }

    /// The current value without advancing it.
    pub fn current(&self) -> Stamp {
        *self
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stamp({})", self.0)
    }
}

/// Globally unique instance identifier for one region.
///
/// Allocated from a process-wide atomic counter rather than derived from a
/// pointer or index, so a region torn down and another built in its place
/// never collides with a stale reference held by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionInstanceId(u64);

static REGION_INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(1);

impl RegionInstanceId {
    /// Allocate a new, globally unique region instance id.
    pub fn next() -> Self {
        Self(REGION_INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RegionInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region-instance#{}", self.0)
    }
}

/// Parametric chart coordinates (ξ) on a finite element.
///
/// Inline-stored up to 4 dimensions (line/square/cube/tetrahedron cover the
/// common cases without a heap allocation); higher-dimensional charts spill
/// to the heap transparently.
pub type Xi = SmallVec<[f64; 4]>;
