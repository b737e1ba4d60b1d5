//! Typed value-cache slots.

use crate::derivative::FieldDerivative;
use crate::fieldcache::Fieldcache;
use fg_core::{ElementIdentifier, Stamp, Xi};
use indexmap::IndexMap;
use std::sync::Arc;

/// A derivative descriptor's identity, used to key the per-derivative
/// sub-cache. Two `Arc<FieldDerivative>` values key identically only if
/// they are the same allocation — derivative descriptors are constructed
/// once per distinct order/direction chain and shared via `Arc::clone`, so
/// pointer identity is the correct (and cheapest) notion of "same
/// derivative" here.
#[derive(Clone)]
struct DerivativeKey(Arc<FieldDerivative>);

impl PartialEq for DerivativeKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for DerivativeKey {}

impl std::hash::Hash for DerivativeKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

/// One cached derivative result: its own validity stamp and the flat
/// `components * termCount` value buffer in canonical
/// `[component][lower-terms][d]` layout.
#[derive(Debug, Clone, Default)]
pub struct DerivativeCache {
    stamp: Stamp,
    values: Vec<f64>,
}

impl DerivativeCache {
    /// The values currently cached, regardless of validity.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The stamp at which `values` was computed.
    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    fn store(&mut self, stamp: Stamp, values: Vec<f64>) {
        self.stamp = stamp;
        self.values = values;
    }
}

/// Real vector cache: `N` reals plus an optional extra working fieldcache
/// (used by finite-difference derivative evaluation) and an ordered map of
/// per-derivative sub-caches.
#[derive(Debug, Default)]
pub struct RealVectorCache {
    stamp: Stamp,
    values: Vec<f64>,
    working_cache: Option<Box<Fieldcache>>,
    derivatives: IndexMap<usize, (Arc<FieldDerivative>, DerivativeCache)>,
}

impl RealVectorCache {
    /// The memoised values, valid only if [`Self::stamp`] matches the
    /// owning fieldcache's current stamp.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The stamp at which `values` was last computed.
    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    /// Store a freshly evaluated value at the given stamp.
    pub fn store(&mut self, stamp: Stamp, values: Vec<f64>) {
        self.stamp = stamp;
        self.values = values;
    }

    /// Borrow (creating if absent) the extra working fieldcache used by
    /// finite-difference derivative evaluation, owned by this value cache
    /// and reused across calls.
    pub fn working_cache_or_insert_with(
        &mut self,
        make: impl FnOnce() -> Fieldcache,
    ) -> &mut Fieldcache {
        self.working_cache.get_or_insert_with(|| Box::new(make()))
    }

    /// Look up the sub-cache for one derivative descriptor, creating an
    /// empty (invalid) entry if this is the first request for it.
    pub fn derivative_cache_mut(&mut self, derivative: &Arc<FieldDerivative>) -> &mut DerivativeCache {
        let key = DerivativeKey(Arc::clone(derivative));
        let ptr = Arc::as_ptr(derivative) as usize;
        let entry = self.derivatives.entry(ptr).or_insert_with(|| (key.0, DerivativeCache::default()));
        &mut entry.1
    }

    /// Store a freshly evaluated derivative result.
    pub fn store_derivative(&mut self, derivative: &Arc<FieldDerivative>, stamp: Stamp, values: Vec<f64>) {
        self.derivative_cache_mut(derivative).store(stamp, values);
    }

    /// Whether every derivative sub-cache is dropped (used when the field
    /// is wholesale invalidated, e.g. a structural change).
    pub fn clear_derivatives(&mut self) {
        self.derivatives.clear();
    }
}

/// Immutable single-string cache.
#[derive(Debug, Default, Clone)]
pub struct StringCache {
    stamp: Stamp,
    value: String,
}

impl StringCache {
    /// The memoised string.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The stamp at which `value` was last computed.
    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    /// Store a freshly evaluated value.
    pub fn store(&mut self, stamp: Stamp, value: String) {
        self.stamp = stamp;
        self.value = value;
    }
}

/// Mesh-location cache: one element reference plus parametric coordinates.
#[derive(Debug, Default, Clone)]
pub struct MeshLocationCache {
    stamp: Stamp,
    element: Option<ElementIdentifier>,
    xi: Xi,
}

impl MeshLocationCache {
    /// The memoised element, if any (`None` means "not defined here").
    pub fn element(&self) -> Option<ElementIdentifier> {
        self.element
    }

    /// The memoised chart coordinates.
    pub fn xi(&self) -> &Xi {
        &self.xi
    }

    /// The stamp at which this value was last computed.
    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    /// Store a freshly evaluated value.
    pub fn store(&mut self, stamp: Stamp, element: Option<ElementIdentifier>, xi: Xi) {
        self.stamp = stamp;
        self.element = element;
        self.xi = xi;
    }
}

/// One field's base value-cache slot: exactly one of the three concrete
/// shapes, matching the field's value type.
#[derive(Debug)]
pub enum ValueCache {
    /// See [`RealVectorCache`].
    Real(RealVectorCache),
    /// See [`StringCache`].
    String(StringCache),
    /// See [`MeshLocationCache`].
    MeshLocation(MeshLocationCache),
}

impl ValueCache {
    /// Construct an empty real-vector cache.
    pub fn new_real() -> Self {
        Self::Real(RealVectorCache::default())
    }

    /// Construct an empty string cache.
    pub fn new_string() -> Self {
        Self::String(StringCache::default())
    }

    /// Construct an empty mesh-location cache.
    pub fn new_mesh_location() -> Self {
        Self::MeshLocation(MeshLocationCache::default())
    }

    /// The stamp at which this slot's base value was last computed.
    pub fn stamp(&self) -> Stamp {
        match self {
            Self::Real(c) => c.stamp(),
            Self::String(c) => c.stamp(),
            Self::MeshLocation(c) => c.stamp(),
        }
    }

    /// Borrow as a real-vector cache, if that is this slot's shape.
    pub fn as_real(&self) -> Option<&RealVectorCache> {
        match self {
            Self::Real(c) => Some(c),
            _ => None,
        }
    }

    /// Mutably borrow as a real-vector cache, if that is this slot's shape.
    pub fn as_real_mut(&mut self) -> Option<&mut RealVectorCache> {
        match self {
            Self::Real(c) => Some(c),
            _ => None,
        }
    }

    /// Mutably borrow as a string cache, if that is this slot's shape.
    pub fn as_string_mut(&mut self) -> Option<&mut StringCache> {
        match self {
            Self::String(c) => Some(c),
            _ => None,
        }
    }

    /// Mutably borrow as a mesh-location cache, if that is this slot's
    /// shape.
    pub fn as_mesh_location_mut(&mut self) -> Option<&mut MeshLocationCache> {
        match self {
            Self::MeshLocation(c) => Some(c),
            _ => None,
        }
    }
}
