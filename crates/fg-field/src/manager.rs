//! Field registry: identity, naming, lifecycle and change propagation.

use crate::core_trait::FieldCore;
use crate::error::FieldError;
use crate::field::{FieldHandle, NewFieldArgs};
use fg_core::{CacheIndex, ChangeFlags, CoordinateSystem, FieldId, RegionConfig, RegionInstanceId};
use indexmap::{IndexMap, IndexSet};

/// Owns every field in one region: identity, name uniqueness, change-cache
/// brackets, and not-in-use collection.
///
/// Not `Send`/`Sync` by construction (its fields hold `Rc`s): a manager, like
/// the region it belongs to, is touched by one thread at a time.
pub struct FieldManager {
    region: RegionInstanceId,
    config: RegionConfig,
    fields: IndexMap<FieldId, FieldHandle>,
    names: std::collections::BTreeMap<String, FieldId>,
    next_field_id: u32,
    next_cache_index: u32,
    free_cache_indices: Vec<CacheIndex>,
    /// Fields that changed since the changed-object list was last drained,
    /// used both as the change-propagation work list and as the "one
    /// pending-change reference" bonus in the not-in-use sweep.
    changed: IndexSet<FieldId>,
    cache_depth: u32,
    pending_clear: Vec<FieldId>,
}

impl FieldManager {
    /// Construct an empty manager for `region`.
    pub fn new(region: RegionInstanceId, config: RegionConfig) -> Self {
        let capacity = config.initial_manager_capacity;
        Self {
            region,
            config,
            fields: IndexMap::with_capacity(capacity),
            names: std::collections::BTreeMap::new(),
            next_field_id: 1,
            next_cache_index: 0,
            free_cache_indices: Vec::new(),
            changed: IndexSet::new(),
            cache_depth: 0,
            pending_clear: Vec::new(),
        }
    }

    /// The region this manager belongs to.
    pub fn region(&self) -> RegionInstanceId {
        self.region
    }

    /// Number of fields currently owned.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the manager owns no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by name, O(log n).
    pub fn find_by_name(&self, name: &str) -> Option<FieldHandle> {
        self.names.get(name).and_then(|id| self.fields.get(id)).cloned()
    }

    /// Look up a field by identifier.
    pub fn find_by_id(&self, id: FieldId) -> Option<FieldHandle> {
        self.fields.get(&id).cloned()
    }

    /// Iterate every owned field in stable insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldHandle> {
        self.fields.values()
    }

    fn uniquify_name(&self, requested: &str) -> (String, bool) {
        if !requested.is_empty() && !self.names.contains_key(requested) {
            return (requested.to_string(), false);
        }
        let stem: &str = if requested.is_empty() { &self.config.default_name_stem } else { requested };
        let mut suffix = 1u32;
        loop {
            let candidate = format!("{stem}{}{suffix}", self.config.name_uniquify_separator);
            if !self.names.contains_key(&candidate) {
                return (candidate, true);
            }
            suffix += 1;
        }
    }

    fn alloc_cache_index(&mut self) -> CacheIndex {
        match self.free_cache_indices.pop() {
            Some(idx) => idx,
            None => {
                let idx = CacheIndex(self.next_cache_index);
                self.next_cache_index += 1;
                idx
            }
        }
    }

    /// Rename a field. An explicit clash with
    /// another field is rejected; an empty name is auto-uniquified exactly
    /// as at add-time.
    pub fn set_name(&mut self, field: &FieldHandle, name: &str) -> Result<(), FieldError> {
        if !self.fields.contains_key(&field.id()) {
            return Err(FieldError::UnknownField(field.id()));
        }
        if !name.is_empty() {
            if let Some(&existing) = self.names.get(name) {
                if existing != field.id() {
                    return Err(FieldError::NameAlreadyExists { name: name.to_string() });
                }
                return Ok(());
            }
        }
        let (stored_name, is_auto_named) = self.uniquify_name(name);
        self.names.remove(&field.name());
        self.names.insert(stored_name.clone(), field.id());
        field.set_name(stored_name, is_auto_named);
        Ok(())
    }

    /// Add a new field. `name` empty or clashing is
    /// auto-uniquified; an explicit clash with a non-auto-named field is
    /// rejected.
    #[allow(clippy::too_many_arguments)]
    pub fn add(
        &mut self,
        name: &str,
        component_count: usize,
        sources: Vec<FieldHandle>,
        source_values: Vec<f64>,
        coordinate_system: CoordinateSystem,
        core: Box<dyn FieldCore>,
    ) -> Result<FieldHandle, FieldError> {
        if !name.is_empty() && self.names.contains_key(name) {
            return Err(FieldError::NameAlreadyExists { name: name.to_string() });
        }
        for source in &sources {
            if source.region() != self.region {
                return Err(FieldError::ForeignRegionSource { source: source.id() });
            }
        }
        let (stored_name, is_auto_named) = self.uniquify_name(name);
        let id = FieldId(self.next_field_id);
        self.next_field_id += 1;
        let cache_index = self.alloc_cache_index();
        let field = FieldHandle::new(NewFieldArgs {
            id,
            name: stored_name.clone(),
            is_auto_named,
            component_count,
            sources,
            source_values,
            coordinate_system,
            core,
            cache_index,
            region: self.region,
            mesh_step: self.config.finite_difference_mesh_step,
        });
        field.field_added_to_region();
        self.names.insert(stored_name, id);
        self.fields.insert(id, field.clone());
        self.changed.insert(id);
        tracing::debug!(field = %id, "field added to region");
        Ok(field)
    }

    /// Open a change-cache bracket; notifications are coalesced until the
    /// matching (outermost) [`Self::end_cache`].
    pub fn begin_cache(&mut self) {
        if self.cache_depth == 0 {
            for id in self.pending_clear.drain(..) {
                if let Some(field) = self.fields.get(&id) {
                    field.clear_changed();
                }
            }
        }
        self.cache_depth += 1;
    }

    /// Close a change-cache bracket. On the outermost close, propagates
    /// change flags to dependants and sweeps not-in-use fields.
    pub fn end_cache(&mut self) {
        debug_assert!(self.cache_depth > 0, "end_cache called without a matching begin_cache");
        self.cache_depth = self.cache_depth.saturating_sub(1);
        if self.cache_depth == 0 {
            self.propagate_changes();
            self.sweep();
        }
    }

    /// For each field not already carrying *full result*, inherit
    /// *full result* if any source has it (in source order, stopping at the
    /// first), else merge any source's *partial result*.
    fn propagate_changes(&mut self) {
        for field in self.fields.values() {
            if field.change_flags().contains(ChangeFlags::FULL_RESULT) {
                continue;
            }
            let mut inherited = ChangeFlags::NONE;
            for source in field.sources() {
                let source_flags = source.change_flags();
                if source_flags.contains(ChangeFlags::FULL_RESULT) {
                    inherited.insert(ChangeFlags::FULL_RESULT);
                    break;
                }
                if source_flags.contains(ChangeFlags::PARTIAL_RESULT) {
                    inherited.insert(ChangeFlags::PARTIAL_RESULT);
                }
            }
            if !inherited.is_none() {
                field.mark_changed(inherited);
                self.changed.insert(field.id());
            }
        }
        self.pending_clear.extend(self.changed.drain(..));
    }

    /// Replace `target`'s core, sources, source values and coordinate
    /// system with `source`'s.
    pub fn modify_definition(&mut self, target: &FieldHandle, source: &FieldHandle) -> Result<(), FieldError> {
        if source.region() != target.region() {
            return Err(FieldError::ForeignRegionSource { source: source.id() });
        }
        if source.id() == target.id() {
            return Err(FieldError::Cycle { field: target.id() });
        }
        for s in source.sources() {
            if s.id() == target.id() || self.depends_on(&s, target.id()) {
                return Err(FieldError::Cycle { field: target.id() });
            }
        }
        let referenced = self.is_referenced_by_others(target);
        let shape_changes = target.component_count() != source.component_count()
            || target.value_type() != source.value_type();
        if shape_changes && referenced {
            return Err(FieldError::ChangeWhileInUse { field: target.id() });
        }
        if !target.core_replaceable_by(source.type_string()) && referenced {
            return Err(FieldError::CoreNotReplaceable { field: target.id() });
        }

        self.begin_cache();
        let result = target.replace_definition(source);
        if result.is_ok() {
            target.mark_changed(ChangeFlags::DEFINITION | ChangeFlags::FULL_RESULT);
            self.changed.insert(target.id());
        }
        self.end_cache();
        result
    }

    fn depends_on(&self, field: &FieldHandle, candidate: FieldId) -> bool {
        for source in field.sources() {
            if source.id() == candidate || self.depends_on(&source, candidate) {
                return true;
            }
        }
        false
    }

    fn is_referenced_by_others(&self, target: &FieldHandle) -> bool {
        self.fields
            .values()
            .any(|f| f.id() != target.id() && f.sources().iter().any(|s| s.id() == target.id()))
    }

    /// Set the *managed* flag. Transitioning from true to false sweeps
    /// not-in-use fields immediately; while
    /// managed, a field is never swept regardless of its reference count —
    /// the manager treats it as if permanently held by one extra client.
    pub fn set_managed(&mut self, field: &FieldHandle, managed: bool) {
        let was_managed = field.managed();
        field.set_managed(managed);
        if was_managed && !managed {
            self.sweep();
        }
    }

    /// Drop the caller's handle and sweep. Equivalent to letting the last
    /// external `FieldHandle` go out of scope followed by an explicit
    /// collection pass, since plain drops alone are not a sweep point.
    pub fn release(&mut self, field: FieldHandle) {
        drop(field);
        self.sweep();
    }

    /// Remove every field eligible for collection: unmanaged, with no
    /// reference beyond the manager's own (plus the changed-list bonus),
    /// and whose core reports itself not in use.
    fn sweep(&mut self) {
        let candidates: Vec<FieldId> = self.fields.keys().copied().collect();
        for id in candidates {
            let Some(field) = self.fields.get(&id) else { continue };
            if field.managed() {
                continue;
            }
            let threshold = 1 + usize::from(self.changed.contains(&id));
            if field.strong_count() <= threshold && field.not_in_use() {
                let name = field.name();
                tracing::debug!(field = %id, "destroying not-in-use field");
                self.fields.shift_remove(&id);
                self.names.remove(&name);
                self.free_cache_indices.push(field.cache_index());
                self.changed.shift_remove(&id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_trait::{EvalContext, FieldValue};
    use fg_core::ValueType;

    #[derive(Debug, Clone)]
    struct ConstCore(Vec<f64>);
    impl FieldCore for ConstCore {
        fn type_string(&self) -> &'static str {
            "CONST"
        }
        fn value_type(&self) -> ValueType {
            ValueType::Real
        }
        fn component_count(&self) -> usize {
            self.0.len()
        }
        fn evaluate(&self, _ctx: &mut dyn EvalContext) -> Result<FieldValue, FieldError> {
            Ok(FieldValue::Real(self.0.clone()))
        }
        fn compare(&self, _other: &dyn FieldCore) -> bool {
            false
        }
        fn copy(&self) -> Box<dyn FieldCore> {
            Box::new(self.clone())
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    fn manager() -> FieldManager {
        FieldManager::new(RegionInstanceId::next(), RegionConfig::default())
    }

    fn add(m: &mut FieldManager, name: &str) -> Result<FieldHandle, FieldError> {
        m.add(name, 1, vec![], vec![], CoordinateSystem::NOT_APPLICABLE, Box::new(ConstCore(vec![1.0])))
    }

    #[test]
    fn empty_name_auto_uniquifies_and_explicit_clash_is_rejected() {
        let mut m = manager();
        let a = add(&mut m, "").unwrap();
        assert_eq!(a.name(), "temp1");
        assert!(matches!(add(&mut m, "temp1"), Err(FieldError::NameAlreadyExists { .. })));
        let c = add(&mut m, "").unwrap();
        assert_eq!(c.name(), "temp2");
    }

    #[test]
    fn modify_definition_rejects_a_cycle_and_leaves_target_unchanged() {
        let mut m = manager();
        let b = add(&mut m, "b").unwrap();
        let a = m
            .add("a", 1, vec![b.clone()], vec![], CoordinateSystem::NOT_APPLICABLE, Box::new(ConstCore(vec![1.0])))
            .unwrap();
        let err = m.modify_definition(&b, &a).unwrap_err();
        assert!(matches!(err, FieldError::Cycle { .. }));
        // b is unchanged: still zero sources.
        assert!(b.sources().is_empty());
    }

    #[test]
    fn managed_flag_controls_survival_across_release() {
        let mut m = manager();
        let handle = add(&mut m, "field").unwrap();
        m.set_managed(&handle, true);
        m.release(handle);
        assert!(m.find_by_name("field").is_some(), "managed field must survive a release");

        let handle2 = m.find_by_name("field").unwrap();
        m.set_managed(&handle2, false);
        m.release(handle2);
        assert!(m.find_by_name("field").is_none(), "unmanaged field must be collected once released");
    }

    #[test]
    fn modify_definition_marks_full_result_change() {
        let mut m = manager();
        let g = add(&mut m, "g").unwrap();
        let f = m
            .add("f", 1, vec![g.clone()], vec![], CoordinateSystem::NOT_APPLICABLE, Box::new(ConstCore(vec![2.0])))
            .unwrap();
        let replacement = add(&mut m, "").unwrap();
        m.modify_definition(&g, &replacement).unwrap();
        assert!(f.change_flags().contains(ChangeFlags::FULL_RESULT));
    }

    #[test]
    fn set_name_rejects_a_clash_and_accepts_a_free_name() {
        let mut m = manager();
        let a = add(&mut m, "a").unwrap();
        let b = add(&mut m, "b").unwrap();
        assert!(matches!(m.set_name(&b, "a"), Err(FieldError::NameAlreadyExists { .. })));
        m.set_name(&b, "renamed").unwrap();
        assert_eq!(b.name(), "renamed");
        assert!(m.find_by_name("renamed").is_some());
        assert!(m.find_by_name("b").is_none());
        let _ = a;
    }

    #[test]
    fn foreign_region_source_is_rejected() {
        let mut m1 = manager();
        let m2 = manager();
        let foreign = FieldHandle::new(NewFieldArgs {
            id: FieldId(999),
            name: "foreign".to_string(),
            is_auto_named: false,
            component_count: 1,
            sources: vec![],
            source_values: vec![],
            coordinate_system: CoordinateSystem::NOT_APPLICABLE,
            core: Box::new(ConstCore(vec![1.0])),
            cache_index: CacheIndex(0),
            region: m2.region(),
            mesh_step: 1e-5,
        });
        let err = m1.add("x", 1, vec![foreign], vec![], CoordinateSystem::NOT_APPLICABLE, Box::new(ConstCore(vec![1.0])));
        assert!(matches!(err, Err(FieldError::ForeignRegionSource { .. })));
    }
}
