//! Per-client evaluation context.

use crate::cache::ValueCache;
use crate::location::Location;
use fg_core::{CacheIndex, ElementIdentifier, NodeIdentifier, RegionInstanceId, Stamp, Xi};

/// Holds the current domain location, time, and the dense array of
/// per-field value-cache slots for one client of a region.
///
/// Thread-affine: a `Fieldcache` must not be shared between threads
/// concurrently with use. Two caches over the same region are
/// independent — each has its own location, stamp and slot array.
#[derive(Debug)]
pub struct Fieldcache {
    region: RegionInstanceId,
    location: Location,
    time: f64,
    stamp: Stamp,
    slots: Vec<Option<ValueCache>>,
}

impl Fieldcache {
    /// Create a fresh fieldcache bound to `region`, with no location set and
    /// `capacity` pre-allocated value-cache slots.
    pub fn new(region: RegionInstanceId, capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { region, location: Location::None, time: 0.0, stamp: Stamp::default(), slots }
    }

    /// The region this fieldcache is bound to.
    pub fn region(&self) -> RegionInstanceId {
        self.region
    }

    /// The current location.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The current time value.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The current stamp. Value-cache slots recorded at an earlier stamp
    /// are stale.
    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    /// Set the time only, leaving the spatial location untouched, and
    /// advance the stamp.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
        self.bump();
    }

    /// Set the location to a bare node with no host element.
    pub fn set_node(&mut self, node: NodeIdentifier) {
        self.location = Location::Node { node, host_element: None };
        self.bump();
    }

    /// Set the location to a node embedded in a host element at the given
    /// chart coordinates, needed to evaluate mesh derivatives at a node.
    pub fn set_node_with_host_element(&mut self, node: NodeIdentifier, element: ElementIdentifier, xi: Xi) {
        self.location = Location::Node { node, host_element: Some((element, xi)) };
        self.bump();
    }

    /// Set the location to an element with the given chart coordinates.
    pub fn set_element_xi(&mut self, element: ElementIdentifier, xi: Xi) {
        self.location = Location::Element { element, xi };
        self.bump();
    }

    /// Clear the spatial location back to [`Location::None`].
    pub fn clear_location(&mut self) {
        self.location = Location::None;
        self.bump();
    }

    fn bump(&mut self) {
        self.stamp.advance();
        tracing::trace!(stamp = %self.stamp, "fieldcache location changed");
    }

    /// Ensure a slot exists at `index`, creating it with `make` if absent,
    /// and growing the slot array if `index` is beyond current capacity.
    pub fn ensure_slot(&mut self, index: CacheIndex, make: impl FnOnce() -> ValueCache) -> &mut ValueCache {
        let idx = index.0 as usize;
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        self.slots[idx].get_or_insert_with(make)
    }

    /// Borrow the slot at `index`, if present.
    pub fn slot(&self, index: CacheIndex) -> Option<&ValueCache> {
        self.slots.get(index.0 as usize).and_then(|s| s.as_ref())
    }

    /// Mutably borrow the slot at `index`, if present.
    pub fn slot_mut(&mut self, index: CacheIndex) -> Option<&mut ValueCache> {
        self.slots.get_mut(index.0 as usize).and_then(|s| s.as_mut())
    }

    /// Drop the slot at `index` (e.g. the owning field was destroyed and its
    /// cache index reclaimed).
    pub fn clear_slot(&mut self, index: CacheIndex) {
        if let Some(slot) = self.slots.get_mut(index.0 as usize) {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_location_advances_stamp() {
        let mut cache = Fieldcache::new(RegionInstanceId::next(), 4);
        let s0 = cache.stamp();
        cache.set_element_xi(ElementIdentifier(1), Xi::from_slice(&[0.5, 0.5]));
        assert!(cache.stamp() > s0);
    }

    #[test]
    fn ensure_slot_creates_exactly_once() {
        let mut cache = Fieldcache::new(RegionInstanceId::next(), 1);
        let mut created = 0;
        cache.ensure_slot(CacheIndex(0), || {
            created += 1;
            ValueCache::new_real()
        });
        cache.ensure_slot(CacheIndex(0), || {
            created += 1;
            ValueCache::new_real()
        });
        assert_eq!(created, 1);
    }

    #[test]
    fn ensure_slot_grows_beyond_initial_capacity() {
        let mut cache = Fieldcache::new(RegionInstanceId::next(), 0);
        cache.ensure_slot(CacheIndex(3), ValueCache::new_real);
        assert!(cache.slot(CacheIndex(3)).is_some());
    }

    #[test]
    fn node_with_host_element_resolves_element_xi() {
        let mut cache = Fieldcache::new(RegionInstanceId::next(), 0);
        cache.set_node_with_host_element(
            NodeIdentifier(1),
            ElementIdentifier(2),
            Xi::from_slice(&[0.25]),
        );
        let (element, _xi) = cache.location().resolve_element_xi().unwrap();
        assert_eq!(element, ElementIdentifier(2));
    }
}
