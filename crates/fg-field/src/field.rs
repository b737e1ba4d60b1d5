//! The field node: identity, sources, coordinate system, core.

use crate::cache::ValueCache;
use crate::core_trait::{AssignOutcome, EvalContext, FieldCore, FieldValue, NativeDiscretisation};
use crate::differential_operator::DifferentialOperator;
use crate::error::FieldError;
use crate::fieldcache::Fieldcache;
use crate::parameters::FieldParameters;
use fg_core::{CacheIndex, ChangeFlags, CoordinateSystem, FieldId, RegionInstanceId, ValueType};
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) struct FieldInner {
    id: FieldId,
    name: String,
    is_auto_named: bool,
    component_count: usize,
    sources: Vec<FieldHandle>,
    source_values: Vec<f64>,
    coordinate_system: CoordinateSystem,
    component_names: Vec<Option<String>>,
    managed: bool,
    /// Taken out of the `Option` for the duration of a core call that
    /// recurses back into this same field (evaluate / evaluate_derivative),
    /// so that call can still borrow_mut the rest of `FieldInner` (e.g. to
    /// perturb this field's own parameters) without panicking on a
    /// re-entrant `RefCell` borrow. Sound because the source-field graph is
    /// acyclic: a field's own evaluation never recurses back into itself.
    core: Option<Box<dyn FieldCore>>,
    cache_index: CacheIndex,
    change_flags: ChangeFlags,
    region: RegionInstanceId,
    parameters: Option<FieldParameters>,
    mesh_step: f64,
}

/// A reference-counted handle to one field node.
///
/// Shared between a [`crate::manager::FieldManager`] (which holds one
/// count) and any number of external holders; cloning is cheap (an `Rc`
/// bump). The *managed* flag makes the manager behave as if
/// there is always one additional external count.
#[derive(Clone)]
pub struct FieldHandle(Rc<RefCell<FieldInner>>);

impl std::fmt::Debug for FieldHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("FieldHandle")
            .field("id", &inner.id)
            .field("name", &inner.name)
            .finish()
    }
}

impl PartialEq for FieldHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for FieldHandle {}

/// The parameters the manager decides at add-time; grouped so
/// [`FieldHandle::new`] doesn't take an unreadable run of positional args.
pub(crate) struct NewFieldArgs {
    pub id: FieldId,
    pub name: String,
    pub is_auto_named: bool,
    pub component_count: usize,
    pub sources: Vec<FieldHandle>,
    pub source_values: Vec<f64>,
    pub coordinate_system: CoordinateSystem,
    pub core: Box<dyn FieldCore>,
    pub cache_index: CacheIndex,
    pub region: RegionInstanceId,
    pub mesh_step: f64,
}

impl FieldHandle {
    pub(crate) fn new(args: NewFieldArgs) -> Self {
        Self(Rc::new(RefCell::new(FieldInner {
            id: args.id,
            name: args.name,
            is_auto_named: args.is_auto_named,
            component_count: args.component_count,
            sources: args.sources,
            source_values: args.source_values,
            coordinate_system: args.coordinate_system,
            component_names: vec![None; args.component_count],
            managed: false,
            core: Some(args.core),
            cache_index: args.cache_index,
            change_flags: ChangeFlags::IDENTIFIER,
            region: args.region,
            parameters: None,
            mesh_step: args.mesh_step,
        })))
    }

    /// This field's identity within its manager.
    pub fn id(&self) -> FieldId {
        self.0.borrow().id
    }

    /// The field's current name.
    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    /// Whether the current name was auto-uniquified rather than explicitly
    /// chosen.
    pub fn is_auto_named(&self) -> bool {
        self.0.borrow().is_auto_named
    }

    /// Number of components this field produces.
    pub fn component_count(&self) -> usize {
        self.0.borrow().component_count
    }

    /// The region this field belongs to.
    pub fn region(&self) -> RegionInstanceId {
        self.0.borrow().region
    }

    /// Whether the *managed* flag is set.
    pub fn managed(&self) -> bool {
        self.0.borrow().managed
    }

    /// Set the *managed* flag.
    pub fn set_managed(&self, managed: bool) {
        self.0.borrow_mut().managed = managed;
    }

    /// The field's current coordinate system.
    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.0.borrow().coordinate_system
    }

    /// Set the field's coordinate system, validating it against the
    /// field's value type and running the core's propagation hook.
    pub fn set_coordinate_system(&self, coordinate_system: CoordinateSystem) -> Result<(), FieldError> {
        coordinate_system
            .validate_for_value_type(self.value_type())
            .map_err(|e| FieldError::InvalidArgument { reason: e.to_string() })?;
        {
            let mut inner = self.0.borrow_mut();
            inner.coordinate_system = coordinate_system;
            if let Some(core) = inner.core.as_mut() {
                core.propagate_coordinate_system(coordinate_system);
            }
        }
        self.mark_changed(ChangeFlags::DEFINITION);
        Ok(())
    }

    /// The name of one component, 1-based. Falls back to the component's
    /// number as a string if no custom name was set.
    pub fn component_name(&self, component_number: usize) -> Result<String, FieldError> {
        let inner = self.0.borrow();
        if component_number == 0 || component_number > inner.component_names.len() {
            return Err(FieldError::InvalidArgument {
                reason: format!("component {component_number} out of range for {} components", inner.component_names.len()),
            });
        }
        Ok(inner.component_names[component_number - 1].clone().unwrap_or_else(|| component_number.to_string()))
    }

    /// Set the name of one component, 1-based.
    pub fn set_component_name(&self, component_number: usize, name: String) -> Result<(), FieldError> {
        let mut inner = self.0.borrow_mut();
        if component_number == 0 || component_number > inner.component_names.len() {
            return Err(FieldError::InvalidArgument {
                reason: format!("component {component_number} out of range for {} components", inner.component_names.len()),
            });
        }
        inner.component_names[component_number - 1] = Some(name);
        drop(inner);
        self.mark_changed(ChangeFlags::DEFINITION);
        Ok(())
    }

    /// The value type this field's core produces.
    pub fn value_type(&self) -> ValueType {
        self.0.borrow().core.as_ref().expect("core present").value_type()
    }

    /// This field's core's stable type tag.
    pub fn type_string(&self) -> &'static str {
        self.0.borrow().core.as_ref().expect("core present").type_string()
    }

    /// This field's dense value-cache slot index.
    pub fn cache_index(&self) -> CacheIndex {
        self.0.borrow().cache_index
    }

    /// The field's accumulated change-status flags.
    pub fn change_flags(&self) -> ChangeFlags {
        self.0.borrow().change_flags
    }

    /// This field's source fields, in order.
    pub fn sources(&self) -> Vec<FieldHandle> {
        self.0.borrow().sources.clone()
    }

    /// One of this field's literal scalar source values.
    pub fn source_value(&self, index: usize) -> Option<f64> {
        self.0.borrow().source_values.get(index).copied()
    }

    /// Whether the core reports itself unreferenced by anything beyond the
    /// manager.
    pub fn not_in_use(&self) -> bool {
        self.0.borrow().core.as_ref().expect("core present").not_in_use()
    }

    /// Declare the number of element parameters this field has for
    /// `element`, creating its [`FieldParameters`] on first use.
    pub fn set_parameter_count(&self, element: fg_core::ElementIdentifier, count: u32) {
        let mut inner = self.0.borrow_mut();
        let delta = inner.mesh_step;
        inner.parameters.get_or_insert_with(|| FieldParameters::new(delta)).set_parameter_count(element, count);
    }

    /// Reference count of the underlying field node: one for the manager
    /// plus one for every external `FieldHandle` clone.
    pub fn strong_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub(crate) fn mark_changed(&self, flags: ChangeFlags) {
        self.0.borrow_mut().change_flags.insert(flags);
    }

    pub(crate) fn clear_changed(&self) {
        self.0.borrow_mut().change_flags = ChangeFlags::NONE;
    }

    pub(crate) fn set_name(&self, name: String, is_auto_named: bool) {
        let mut inner = self.0.borrow_mut();
        inner.name = name;
        inner.is_auto_named = is_auto_named;
        inner.change_flags.insert(ChangeFlags::IDENTIFIER);
    }

    pub(crate) fn field_added_to_region(&self) {
        let mut inner = self.0.borrow_mut();
        if let Some(core) = inner.core.as_mut() {
            core.field_added_to_region();
        }
    }

    /// Copy `source`'s core, sources, source values and coordinate system
    /// into `self`. Cycle and cross-region
    /// validation is the caller's ([`crate::manager::FieldManager`])
    /// responsibility; this only performs the mechanical copy.
    pub(crate) fn replace_definition(&self, source: &FieldHandle) -> Result<(), FieldError> {
        let (new_core, new_sources, new_values, new_cs) = {
            let src = source.0.borrow();
            (
                src.core.as_ref().expect("core present").copy(),
                src.sources.clone(),
                src.source_values.clone(),
                src.coordinate_system,
            )
        };
        let mut inner = self.0.borrow_mut();
        inner.core = Some(new_core);
        inner.sources = new_sources;
        inner.source_values = new_values;
        inner.coordinate_system = new_cs;
        inner.component_count = source.component_count();
        inner.component_names = vec![None; inner.component_count];
        inner.change_flags.insert(ChangeFlags::DEFINITION);
        Ok(())
    }

    /// Whether changing component count or value type is currently allowed:
    /// only while no other field depends on this one.
    pub(crate) fn core_replaceable_by(&self, new_core_type: &'static str) -> bool {
        let inner = self.0.borrow();
        let existing_type = inner.core.as_ref().expect("core present").type_string();
        existing_type == new_core_type || inner.core.as_ref().expect("core present").not_in_use()
    }

    /// General (value-type-polymorphic) evaluation with memoisation.
    pub fn evaluate(&self, cache: &mut Fieldcache) -> Result<FieldValue, FieldError> {
        if cache.region() != self.region() {
            return Err(FieldError::InvalidArgument {
                reason: "fieldcache belongs to a different region than this field".to_string(),
            });
        }
        let index = self.cache_index();
        let value_type = self.value_type();
        let current_stamp = cache.stamp();
        {
            let slot = cache.ensure_slot(index, || make_empty_slot(value_type));
            if slot.stamp() == current_stamp {
                return Ok(read_cached_value(slot, value_type));
            }
        }

        let core = self.0.borrow_mut().core.take().expect("core present (re-entrant evaluate?)");
        let result = {
            let mut ctx = FieldEvalContext { field: self, cache: &mut *cache };
            core.evaluate(&mut ctx)
        };
        self.0.borrow_mut().core = Some(core);

        match result {
            Ok(value) => {
                store_value(cache.slot_mut(index).expect("slot just ensured"), current_stamp, &value);
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(field = %self.id(), error = %err, "field evaluation failed");
                Err(err)
            }
        }
    }

    /// Convenience wrapper over [`Self::evaluate`] for real-valued fields.
    pub fn evaluate_real(&self, cache: &mut Fieldcache) -> Result<Vec<f64>, FieldError> {
        match self.evaluate(cache)? {
            FieldValue::Real(v) => Ok(v),
            _ => Err(FieldError::InvalidArgument { reason: "field is not real-valued".to_string() }),
        }
    }

    /// Convenience wrapper over [`Self::evaluate`] for string-valued fields.
    pub fn evaluate_string(&self, cache: &mut Fieldcache) -> Result<String, FieldError> {
        match self.evaluate(cache)? {
            FieldValue::String(s) => Ok(s),
            _ => Err(FieldError::InvalidArgument { reason: "field is not string-valued".to_string() }),
        }
    }

    /// Convenience wrapper over [`Self::evaluate`] for mesh-location fields.
    pub fn evaluate_mesh_location(
        &self,
        cache: &mut Fieldcache,
    ) -> Result<(fg_core::ElementIdentifier, fg_core::Xi), FieldError> {
        match self.evaluate(cache)? {
            FieldValue::MeshLocation { element, xi } => Ok((element, xi)),
            _ => Err(FieldError::InvalidArgument { reason: "field is not mesh-location-valued".to_string() }),
        }
    }

    /// Derivative evaluation with its own independently-stamped sub-cache.
    pub fn evaluate_derivative(
        &self,
        cache: &mut Fieldcache,
        derivative: &DifferentialOperator,
    ) -> Result<Vec<f64>, FieldError> {
        if cache.region() != self.region() {
            return Err(FieldError::InvalidArgument {
                reason: "fieldcache belongs to a different region than this field".to_string(),
            });
        }
        let index = self.cache_index();
        let value_type = self.value_type();
        if value_type != ValueType::Real {
            return Err(FieldError::InvalidArgument {
                reason: "derivatives are only defined for real-valued fields".to_string(),
            });
        }
        let current_stamp = cache.stamp();
        let derivative_arc = std::sync::Arc::clone(derivative.derivative());
        let components = self.component_count();
        let term_count = derivative_arc.term_count() as usize;
        let lower_width = match derivative_arc.lower() {
            None => 1,
            Some(l) => crate::findiff::chain_width(l),
        };

        {
            let slot = cache.ensure_slot(index, || make_empty_slot(value_type));
            let real = slot.as_real_mut().expect("real slot for real-valued field");
            let dc = real.derivative_cache_mut(&derivative_arc);
            if dc.stamp() == current_stamp {
                return Ok(slice_derivative_term(dc.values(), derivative.term(), components, lower_width, term_count));
            }
        }

        let core = self.0.borrow_mut().core.take().expect("core present (re-entrant evaluate?)");
        let result = {
            let mut ctx = FieldEvalContext { field: self, cache: &mut *cache };
            core.evaluate_derivative(&mut ctx, derivative)
        };
        self.0.borrow_mut().core = Some(core);

        match result {
            Ok(values) => {
                let slot = cache.slot_mut(index).expect("slot just ensured");
                let real = slot.as_real_mut().expect("real slot for real-valued field");
                real.store_derivative(&derivative_arc, current_stamp, values.clone());
                Ok(slice_derivative_term(&values, derivative.term(), components, lower_width, term_count))
            }
            Err(err) => {
                tracing::warn!(field = %self.id(), error = %err, "derivative evaluation failed");
                Err(err)
            }
        }
    }

    /// Attempt to assign a value at the cache's current location.
    pub fn assign_real(&self, cache: &mut Fieldcache, values: &[f64]) -> Result<AssignOutcome, FieldError> {
        if values.len() != self.component_count() {
            return Err(FieldError::InvalidArgument {
                reason: format!("expected {} components, got {}", self.component_count(), values.len()),
            });
        }
        let core = self.0.borrow_mut().core.take().expect("core present (re-entrant assign?)");
        let result = {
            let mut ctx = FieldEvalContext { field: self, cache };
            let mut core = core;
            let outcome = core.assign(&mut ctx, &FieldValue::Real(values.to_vec()));
            self.0.borrow_mut().core = Some(core);
            outcome
        };
        if matches!(result, Ok(AssignOutcome::Set | AssignOutcome::Partial)) {
            self.mark_changed(ChangeFlags::FULL_RESULT);
        }
        result
    }

    /// Whether this field is defined at the cache's current location.
    pub fn is_defined_at_location(&self, cache: &mut Fieldcache) -> bool {
        let core = self.0.borrow_mut().core.take();
        let Some(core) = core else { return false };
        let defined = {
            let mut ctx = FieldEvalContext { field: self, cache };
            core.is_defined_at_location(&mut ctx)
        };
        self.0.borrow_mut().core = Some(core);
        defined
    }

    /// This field's native image/grid discretisation, if it or one of its
    /// sources (recursively, depth-first) has one.
    pub fn native_discretisation(&self, cache: &mut Fieldcache) -> Option<NativeDiscretisation> {
        let core = self.0.borrow_mut().core.take();
        let core = core?;
        let result = {
            let mut ctx = FieldEvalContext { field: self, cache };
            core.native_discretisation(&mut ctx)
        };
        self.0.borrow_mut().core = Some(core);
        result
    }
}

fn make_empty_slot(value_type: ValueType) -> ValueCache {
    match value_type {
        ValueType::Real => ValueCache::new_real(),
        ValueType::String => ValueCache::new_string(),
        ValueType::MeshLocation => ValueCache::new_mesh_location(),
    }
}

/// Read one term out of a full derivative tensor in canonical
/// `[component][lower-terms][d]` layout, `d` innermost. `term == None`
/// (all terms) returns the full tensor unchanged; `term == Some(k)` returns
/// the `components * lower_width`-long slice at `d == k`.
fn slice_derivative_term(
    values: &[f64],
    term: Option<u32>,
    components: usize,
    lower_width: usize,
    term_count: usize,
) -> Vec<f64> {
    match term {
        None => values.to_vec(),
        Some(k) => {
            let k = k as usize;
            (0..components * lower_width).map(|block| values[block * term_count + k]).collect()
        }
    }
}

fn read_cached_value(slot: &ValueCache, value_type: ValueType) -> FieldValue {
    match value_type {
        ValueType::Real => FieldValue::Real(slot.as_real().expect("real slot").values().to_vec()),
        ValueType::String => {
            // Safe: constructed with the matching shape in `make_empty_slot`.
            match slot {
                ValueCache::String(s) => FieldValue::String(s.value().to_string()),
                _ => unreachable!("value cache shape mismatch"),
            }
        }
        ValueType::MeshLocation => match slot {
            ValueCache::MeshLocation(m) => FieldValue::MeshLocation {
                element: m.element().expect("mesh location defined"),
                xi: m.xi().clone(),
            },
            _ => unreachable!("value cache shape mismatch"),
        },
    }
}

fn store_value(slot: &mut ValueCache, stamp: fg_core::Stamp, value: &FieldValue) {
    match (slot, value) {
        (ValueCache::Real(c), FieldValue::Real(v)) => c.store(stamp, v.clone()),
        (ValueCache::String(c), FieldValue::String(s)) => c.store(stamp, s.clone()),
        (ValueCache::MeshLocation(c), FieldValue::MeshLocation { element, xi }) => {
            c.store(stamp, Some(*element), xi.clone())
        }
        _ => unreachable!("core produced a value shape mismatched with its declared value type"),
    }
}

struct FieldEvalContext<'a> {
    field: &'a FieldHandle,
    cache: &'a mut Fieldcache,
}

impl EvalContext for FieldEvalContext<'_> {
    fn cache(&mut self) -> &mut Fieldcache {
        self.cache
    }

    fn source_count(&self) -> usize {
        self.field.0.borrow().sources.len()
    }

    fn evaluate_source(&mut self, index: usize) -> Result<FieldValue, FieldError> {
        let source = self
            .field
            .0
            .borrow()
            .sources
            .get(index)
            .cloned()
            .ok_or_else(|| FieldError::InvalidArgument { reason: format!("no source at index {index}") })?;
        source.evaluate(self.cache)
    }

    fn evaluate_source_derivative(
        &mut self,
        index: usize,
        derivative: &DifferentialOperator,
    ) -> Result<Vec<f64>, FieldError> {
        let source = self
            .field
            .0
            .borrow()
            .sources
            .get(index)
            .cloned()
            .ok_or_else(|| FieldError::InvalidArgument { reason: format!("no source at index {index}") })?;
        source.evaluate_derivative(self.cache, derivative)
    }

    fn source_scalar(&self, index: usize) -> f64 {
        self.field.0.borrow().source_values.get(index).copied().unwrap_or(0.0)
    }

    fn field_id(&self) -> FieldId {
        self.field.0.borrow().id
    }

    fn mesh_step(&self) -> f64 {
        self.field.0.borrow().mesh_step
    }

    fn parameter_perturbation_delta(&self) -> Result<f64, FieldError> {
        self.field
            .0
            .borrow()
            .parameters
            .as_ref()
            .map(FieldParameters::perturbation_delta)
            .ok_or_else(|| FieldError::InvalidArgument { reason: "field has no parameter set".to_string() })
    }

    fn begin_parameter_perturbation(
        &mut self,
        element: fg_core::ElementIdentifier,
        index: fg_core::ParameterIndex,
        delta: f64,
    ) -> Result<(), FieldError> {
        let mut inner = self.field.0.borrow_mut();
        let params = inner
            .parameters
            .as_mut()
            .ok_or_else(|| FieldError::InvalidArgument { reason: "field has no parameter set".to_string() })?;
        params.begin_perturb(element, index, delta);
        Ok(())
    }

    fn end_parameter_perturbation(&mut self) {
        if let Some(params) = self.field.0.borrow_mut().parameters.as_mut() {
            params.end_perturb();
        }
    }

    fn source_native_discretisation(&mut self, index: usize) -> Option<NativeDiscretisation> {
        let source = self.field.0.borrow().sources.get(index).cloned()?;
        source.native_discretisation(self.cache)
    }
}
