//! The field core contract every field variant implements.

use crate::differential_operator::DifferentialOperator;
use crate::error::FieldError;
use crate::fieldcache::Fieldcache;
use fg_core::{ChangeFlags, CoordinateSystem, ElementIdentifier, FieldId, ParameterIndex, ValueType, Xi};
use std::any::Any;

/// Resolution of a field's native image/grid discretisation, if it has
/// one — inherited by a composite field from the first source that
/// supplies one (e.g. an image-grid-aware variant's own sampled
/// resolution).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeDiscretisation {
    /// Element count along each chart direction.
    pub element_resolution: smallvec::SmallVec<[u32; 4]>,
}

/// Outcome of a value-assignment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// Every component was assigned.
    Set,
    /// Only some components could be assigned.
    Partial,
    /// Assignment is not supported by this core, or failed validation.
    Fail,
}

/// The value a core evaluation produces, tagged by [`fg_core::ValueType`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A real vector of the field's component count.
    Real(Vec<f64>),
    /// A single string.
    String(String),
    /// An element reference with parametric coordinates.
    MeshLocation {
        /// The element.
        element: ElementIdentifier,
        /// Chart coordinates within the element.
        xi: Xi,
    },
}

impl FieldValue {
    /// Borrow as a real vector, if that is this value's shape.
    pub fn as_real(&self) -> Option<&[f64]> {
        match self {
            Self::Real(v) => Some(v),
            _ => None,
        }
    }
}

/// Context a core evaluates within: the active fieldcache, and access to its
/// own source fields' (recursively memoised) values.
///
/// Implemented by [`crate::field::FieldHandle`] when it recurses into one of its
/// sources on behalf of its core, so a core never depends on the field graph
/// directly — only on this narrow interface.
pub trait EvalContext {
    /// The fieldcache this evaluation is running against.
    fn cache(&mut self) -> &mut Fieldcache;

    /// Number of source fields.
    fn source_count(&self) -> usize;

    /// Evaluate source field `index` at the current location.
    fn evaluate_source(&mut self, index: usize) -> Result<FieldValue, FieldError>;

    /// Evaluate a derivative of source field `index`.
    fn evaluate_source_derivative(
        &mut self,
        index: usize,
        derivative: &DifferentialOperator,
    ) -> Result<Vec<f64>, FieldError>;

    /// One of the field's literal (non-field) scalar source values.
    fn source_scalar(&self, index: usize) -> f64;

    /// Identity of the field being evaluated, used for diagnostics.
    fn field_id(&self) -> FieldId;

    /// Step size for the mesh-chart finite-difference derivative (the
    /// owning region's [`fg_core::RegionConfig::finite_difference_mesh_step`]).
    fn mesh_step(&self) -> f64;

    /// The perturbation delta of the field-parameters object owned by the
    /// field being differentiated, if it has one.
    fn parameter_perturbation_delta(&self) -> Result<f64, FieldError>;

    /// Begin perturbing one indexed parameter of the field being
    /// differentiated, if it owns a [`crate::parameters::FieldParameters`].
    /// Must be paired with [`Self::end_parameter_perturbation`].
    fn begin_parameter_perturbation(
        &mut self,
        element: ElementIdentifier,
        index: ParameterIndex,
        delta: f64,
    ) -> Result<(), FieldError>;

    /// End the perturbation started by [`Self::begin_parameter_perturbation`].
    fn end_parameter_perturbation(&mut self);

    /// Native discretisation reported by source field `index`, if any.
    fn source_native_discretisation(&mut self, index: usize) -> Option<NativeDiscretisation>;
}

/// The per-variant behaviour of a field.
///
/// Implementors are boxed and held by [`crate::field::FieldHandle`]; the engine
/// only downcasts through [`Self::as_any`], and only for [`Self::compare`].
pub trait FieldCore: Any + std::fmt::Debug {
    /// Stable textual tag identifying this variant (e.g. `"ADD"`).
    fn type_string(&self) -> &'static str;

    /// The shape of this core's evaluated value.
    fn value_type(&self) -> ValueType;

    /// Number of components this core produces (ignored for string and
    /// mesh-location cores).
    fn component_count(&self) -> usize;

    /// Produce this field's value at the context's current location.
    fn evaluate(&self, ctx: &mut dyn EvalContext) -> Result<FieldValue, FieldError>;

    /// Produce a derivative of this field. The default falls back to
    /// central-difference finite differences; variants with a
    /// cheap analytic derivative should override this.
    fn evaluate_derivative(
        &self,
        ctx: &mut dyn EvalContext,
        derivative: &DifferentialOperator,
    ) -> Result<Vec<f64>, FieldError> {
        crate::findiff::evaluate_derivative_by_finite_difference(self, ctx, derivative)
    }

    /// Attempt to assign a value at the context's current location.
    fn assign(
        &mut self,
        _ctx: &mut dyn EvalContext,
        _value: &FieldValue,
    ) -> Result<AssignOutcome, FieldError> {
        Ok(AssignOutcome::Fail)
    }

    /// Whether this field is defined at the context's current location.
    /// The default is AND over sources; a core with no
    /// location-dependent restriction of its own need not override this.
    fn is_defined_at_location(&self, ctx: &mut dyn EvalContext) -> bool {
        for i in 0..ctx.source_count() {
            if ctx.evaluate_source(i).is_err() {
                return false;
            }
        }
        true
    }

    /// Upper bound on the order of this core's own contribution to a
    /// derivative tree, used to skip differentiation known to be zero (e.g.
    /// a constant's derivative of any positive order). `u32::MAX` means "no
    /// known bound".
    fn derivative_tree_order(&self, _derivative: &DifferentialOperator) -> u32 {
        u32::MAX
    }

    /// Structural equality of this core's own parameters (not its sources).
    fn compare(&self, other: &dyn FieldCore) -> bool;

    /// Deep copy of this core's own parameters (not its source field links).
    fn copy(&self) -> Box<dyn FieldCore>;

    /// Whether this core reports itself unreferenced by anything beyond the
    /// manager (e.g. a stored FE field with no elements referencing it).
    fn not_in_use(&self) -> bool {
        true
    }

    /// Hook: the field's coordinate system changed.
    fn propagate_coordinate_system(&mut self, _coordinate_system: CoordinateSystem) {}

    /// Hook: a hierarchical (sub-region) change occurred.
    fn propagate_hierarchical_field_changes(&mut self, _changes: ChangeFlags) {}

    /// Hook: the field's region lost a sub-region.
    fn subregion_removed(&mut self) {}

    /// Hook: the field was just added to its region's manager.
    fn field_added_to_region(&mut self) {}

    /// Narrow, explicit downcast support for [`Self::compare`].
    fn as_any(&self) -> &dyn Any;

    /// This core's own native image/grid discretisation, if it has one.
    /// A composite core need not override this: the default inherits the
    /// first source that supplies one.
    fn native_discretisation(&self, ctx: &mut dyn EvalContext) -> Option<NativeDiscretisation> {
        for i in 0..ctx.source_count() {
            if let Some(d) = ctx.source_native_discretisation(i) {
                return Some(d);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct ConstCore {
        values: Vec<f64>,
    }

    impl FieldCore for ConstCore {
        fn type_string(&self) -> &'static str {
            "CONST"
        }
        fn value_type(&self) -> ValueType {
            ValueType::Real
        }
        fn component_count(&self) -> usize {
            self.values.len()
        }
        fn evaluate(&self, _ctx: &mut dyn EvalContext) -> Result<FieldValue, FieldError> {
            Ok(FieldValue::Real(self.values.clone()))
        }
        fn derivative_tree_order(&self, _derivative: &DifferentialOperator) -> u32 {
            0
        }
        fn compare(&self, other: &dyn FieldCore) -> bool {
            other.as_any().downcast_ref::<Self>().is_some_and(|o| o == self)
        }
        fn copy(&self) -> Box<dyn FieldCore> {
            Box::new(self.clone())
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct NoSources;
    impl EvalContext for NoSources {
        fn cache(&mut self) -> &mut Fieldcache {
            unimplemented!("not needed for this test")
        }
        fn source_count(&self) -> usize {
            0
        }
        fn evaluate_source(&mut self, _index: usize) -> Result<FieldValue, FieldError> {
            unreachable!()
        }
        fn evaluate_source_derivative(
            &mut self,
            _index: usize,
            _derivative: &DifferentialOperator,
        ) -> Result<Vec<f64>, FieldError> {
            unreachable!()
        }
        fn source_scalar(&self, _index: usize) -> f64 {
            unreachable!()
        }
        fn field_id(&self) -> fg_core::FieldId {
            fg_core::FieldId(0)
        }
        fn mesh_step(&self) -> f64 {
            1e-5
        }
        fn parameter_perturbation_delta(&self) -> Result<f64, FieldError> {
            unreachable!()
        }
        fn begin_parameter_perturbation(
            &mut self,
            _element: fg_core::ElementIdentifier,
            _index: fg_core::ParameterIndex,
            _delta: f64,
        ) -> Result<(), FieldError> {
            unreachable!()
        }
        fn end_parameter_perturbation(&mut self) {
            unreachable!()
        }
        fn source_native_discretisation(&mut self, _index: usize) -> Option<NativeDiscretisation> {
            unreachable!()
        }
    }

    #[test]
    fn constant_core_evaluates_its_stored_value() {
        let core = ConstCore { values: vec![1.0, 2.0] };
        let mut ctx = NoSources;
        assert_eq!(core.evaluate(&mut ctx).unwrap(), FieldValue::Real(vec![1.0, 2.0]));
    }

    #[test]
    fn compare_is_structural_and_type_checked() {
        let a = ConstCore { values: vec![1.0] };
        let b = ConstCore { values: vec![1.0] };
        let c = ConstCore { values: vec![2.0] };
        assert!(a.compare(&b));
        assert!(!a.compare(&c));
    }

    #[test]
    fn default_is_defined_at_location_is_vacuously_true_with_no_sources() {
        let core = ConstCore { values: vec![1.0] };
        let mut ctx = NoSources;
        assert!(core.is_defined_at_location(&mut ctx));
    }

    struct OneSource(Option<NativeDiscretisation>);
    impl EvalContext for OneSource {
        fn cache(&mut self) -> &mut Fieldcache {
            unimplemented!("not needed for this test")
        }
        fn source_count(&self) -> usize {
            1
        }
        fn evaluate_source(&mut self, _index: usize) -> Result<FieldValue, FieldError> {
            unreachable!()
        }
        fn evaluate_source_derivative(
            &mut self,
            _index: usize,
            _derivative: &DifferentialOperator,
        ) -> Result<Vec<f64>, FieldError> {
            unreachable!()
        }
        fn source_scalar(&self, _index: usize) -> f64 {
            unreachable!()
        }
        fn field_id(&self) -> fg_core::FieldId {
            fg_core::FieldId(0)
        }
        fn mesh_step(&self) -> f64 {
            1e-5
        }
        fn parameter_perturbation_delta(&self) -> Result<f64, FieldError> {
            unreachable!()
        }
        fn begin_parameter_perturbation(
            &mut self,
            _element: fg_core::ElementIdentifier,
            _index: fg_core::ParameterIndex,
            _delta: f64,
        ) -> Result<(), FieldError> {
            unreachable!()
        }
        fn end_parameter_perturbation(&mut self) {
            unreachable!()
        }
        fn source_native_discretisation(&mut self, _index: usize) -> Option<NativeDiscretisation> {
            self.0.clone()
        }
    }

    #[test]
    fn default_native_discretisation_inherits_from_source() {
        let core = ConstCore { values: vec![1.0] };
        let resolution = NativeDiscretisation { element_resolution: smallvec::smallvec![4, 4] };
        let mut ctx = OneSource(Some(resolution.clone()));
        assert_eq!(core.native_discretisation(&mut ctx), Some(resolution));
    }

    #[test]
    fn default_native_discretisation_is_none_when_no_source_has_one() {
        let core = ConstCore { values: vec![1.0] };
        let mut ctx = OneSource(None);
        assert_eq!(core.native_discretisation(&mut ctx), None);
    }
}
