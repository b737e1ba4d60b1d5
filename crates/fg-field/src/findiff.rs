//! The default finite-difference derivative.
//!
//! Evaluates a derivative descriptor of any order by recursing on its lower
//! derivative and central-differencing across the outermost direction's
//! terms — a mesh chart axis or a field-parameters index.

use crate::core_trait::{EvalContext, FieldCore};
use crate::derivative::{DerivativeDirection, FieldDerivative};
use crate::differential_operator::DifferentialOperator;
use crate::error::FieldError;
use crate::write_guard::DerivativeWriteGuard;
use fg_core::ParameterIndex;
use std::sync::Arc;

/// Product of term counts along a derivative chain — the width (per
/// component) of its canonical output buffer.
pub(crate) fn chain_width(d: &Arc<FieldDerivative>) -> usize {
    let mut w = 1usize;
    let mut cur = Some(d);
    while let Some(c) = cur {
        w *= c.term_count().max(1) as usize;
        cur = c.lower();
    }
    w
}

fn evaluate_lower(
    core: &dyn FieldCore,
    ctx: &mut dyn EvalContext,
    lower: &Option<Arc<FieldDerivative>>,
) -> Result<Vec<f64>, FieldError> {
    match lower {
        Some(l) => core.evaluate_derivative(ctx, &DifferentialOperator::all_terms(Arc::clone(l))),
        None => {
            let value = core.evaluate(ctx)?;
            value.as_real().map(|v| v.to_vec()).ok_or_else(|| FieldError::InvalidArgument {
                reason: "finite-difference derivative requires a real-valued field".to_string(),
            })
        }
    }
}

/// Central-difference derivative of `core`, evaluated through `ctx`, for
/// `derivative`'s outermost direction; recurses for any lower order.
///
/// This is the default [`FieldCore::evaluate_derivative`] fallback: any
/// variant without a cheaper analytic derivative inherits it.
pub fn evaluate_derivative_by_finite_difference(
    core: &dyn FieldCore,
    ctx: &mut dyn EvalContext,
    derivative: &DifferentialOperator,
) -> Result<Vec<f64>, FieldError> {
    let components = core.component_count();
    let full = Arc::clone(derivative.derivative());
    let term_count = full.term_count() as usize;
    if term_count == 0 {
        return Err(FieldError::InvalidArgument {
            reason: "derivative direction has zero terms".to_string(),
        });
    }
    let lower = full.lower().cloned();
    let lower_width = match &lower {
        None => 1,
        Some(l) => chain_width(l),
    };

    let mut out = vec![0.0; components * lower_width * term_count];
    let field_id = ctx.field_id();
    {
        let mut guard = DerivativeWriteGuard::new(&mut out, field_id);

        for d in 0..term_count as u32 {
            let (plus, minus, h) = match full.direction() {
                DerivativeDirection::MeshChart { .. } => {
                    let h = ctx.mesh_step();
                    let plus = perturb_mesh_and_evaluate(core, ctx, &lower, d, h)?;
                    let minus = perturb_mesh_and_evaluate(core, ctx, &lower, d, -h)?;
                    (plus, minus, h)
                }
                DerivativeDirection::FieldParameters { .. } => {
                    let h = ctx.parameter_perturbation_delta()?;
                    let plus = perturb_parameter_and_evaluate(core, ctx, &lower, d, h)?;
                    let minus = perturb_parameter_and_evaluate(core, ctx, &lower, d, -h)?;
                    (plus, minus, h)
                }
            };

            if plus.len() != components * lower_width || minus.len() != components * lower_width {
                return Err(FieldError::InvalidArgument {
                    reason: "lower derivative returned an unexpected length".to_string(),
                });
            }

            for c in 0..components {
                for t in 0..lower_width {
                    let block = c * lower_width + t;
                    let value = (plus[block] - minus[block]) / (2.0 * h);
                    // Canonical layout: component outermost, lower-derivative
                    // terms next, this direction's term d innermost.
                    let out_idx = block * term_count + d as usize;
                    guard.write_at(out_idx, value);
                }
            }
        }
    }
    Ok(out)
}

fn perturb_mesh_and_evaluate(
    core: &dyn FieldCore,
    ctx: &mut dyn EvalContext,
    lower: &Option<Arc<FieldDerivative>>,
    axis: u32,
    delta: f64,
) -> Result<Vec<f64>, FieldError> {
    let (element, mut xi) = ctx
        .cache()
        .location()
        .resolve_element_xi()
        .map(|(e, xi)| (e, xi.clone()))
        .ok_or_else(|| FieldError::InvalidArgument {
            reason: "no element+xi location to perturb for a mesh derivative".to_string(),
        })?;
    let original = xi.clone();
    let axis = axis as usize;
    if axis >= xi.len() {
        return Err(FieldError::InvalidArgument { reason: format!("chart axis {axis} out of range") });
    }
    xi[axis] += delta;
    ctx.cache().set_element_xi(element, xi);
    let result = evaluate_lower(core, ctx, lower);
    // Undo the perturbation before returning, success or failure: a failed
    // evaluation must not leave the location perturbed.
    ctx.cache().set_element_xi(element, original);
    result
}

fn perturb_parameter_and_evaluate(
    core: &dyn FieldCore,
    ctx: &mut dyn EvalContext,
    lower: &Option<Arc<FieldDerivative>>,
    index: u32,
    delta: f64,
) -> Result<Vec<f64>, FieldError> {
    let (element, _) = ctx
        .cache()
        .location()
        .resolve_element_xi()
        .map(|(e, xi)| (e, xi.clone()))
        .ok_or_else(|| FieldError::InvalidArgument {
            reason: "no element location to perturb a field parameter at".to_string(),
        })?;
    ctx.begin_parameter_perturbation(element, ParameterIndex(index), delta)?;
    let result = evaluate_lower(core, ctx, lower);
    ctx.end_parameter_perturbation();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_trait::FieldValue;
    use crate::fieldcache::Fieldcache;
    use fg_core::{ElementIdentifier, RegionInstanceId};
    use smallvec::smallvec;

    #[derive(Debug)]
    struct QuadraticXField;

    impl FieldCore for QuadraticXField {
        fn type_string(&self) -> &'static str {
            "TEST_QUADRATIC"
        }
        fn value_type(&self) -> fg_core::ValueType {
            fg_core::ValueType::Real
        }
        fn component_count(&self) -> usize {
            2
        }
        fn evaluate(&self, ctx: &mut dyn EvalContext) -> Result<FieldValue, FieldError> {
            let (_, xi) = ctx.cache().location().resolve_element_xi().unwrap();
            let x0 = xi[0];
            let x1 = xi[1];
            Ok(FieldValue::Real(vec![x0 * x0 + 2.0 * x1, x0]))
        }
        fn compare(&self, _other: &dyn FieldCore) -> bool {
            false
        }
        fn copy(&self) -> Box<dyn FieldCore> {
            Box::new(QuadraticXField)
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    struct SimpleCtx {
        cache: Fieldcache,
        field_id: fg_core::FieldId,
    }
    impl EvalContext for SimpleCtx {
        fn cache(&mut self) -> &mut Fieldcache {
            &mut self.cache
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
            self.field_id
        }
        fn mesh_step(&self) -> f64 {
            1e-5
        }
        fn parameter_perturbation_delta(&self) -> Result<f64, FieldError> {
            Err(FieldError::InvalidArgument { reason: "no parameter set in this test".into() })
        }
        fn begin_parameter_perturbation(
            &mut self,
            _element: fg_core::ElementIdentifier,
            _index: ParameterIndex,
            _delta: f64,
        ) -> Result<(), FieldError> {
            Err(FieldError::InvalidArgument { reason: "no parameter set in this test".into() })
        }
        fn end_parameter_perturbation(&mut self) {}
        fn source_native_discretisation(&mut self, _index: usize) -> Option<crate::core_trait::NativeDiscretisation> {
            unreachable!()
        }
    }

    #[test]
    fn central_difference_matches_analytic_gradient() {
        let region = RegionInstanceId::next();
        let mut cache = Fieldcache::new(region, 1);
        cache.set_element_xi(ElementIdentifier(1), smallvec![0.5, 0.5]);
        let mut ctx = SimpleCtx { cache, field_id: fg_core::FieldId(1) };
        let core = QuadraticXField;
        let derivative = Arc::new(FieldDerivative::first_mesh_derivative(2, region));
        let op = DifferentialOperator::all_terms(derivative);
        let result = evaluate_derivative_by_finite_difference(&core, &mut ctx, &op).unwrap();
        // layout [component][d], d innermost, 2 components x 2 terms.
        assert!((result[0] - 1.0).abs() < 1e-6); // d/dx0 of component 0 = 2*x0 = 1.0
        assert!((result[1] - 2.0).abs() < 1e-6); // d/dx1 of component 0 = 2.0
        assert!((result[2] - 1.0).abs() < 1e-6); // d/dx0 of component 1 = 1.0
        assert!((result[3] - 0.0).abs() < 1e-6); // d/dx1 of component 1 = 0.0
    }

    #[derive(Debug)]
    struct ThreeComponentQuadraticField;

    impl FieldCore for ThreeComponentQuadraticField {
        fn type_string(&self) -> &'static str {
            "TEST_THREE_COMPONENT_QUADRATIC"
        }
        fn value_type(&self) -> fg_core::ValueType {
            fg_core::ValueType::Real
        }
        fn component_count(&self) -> usize {
            3
        }
        fn evaluate(&self, ctx: &mut dyn EvalContext) -> Result<FieldValue, FieldError> {
            let (_, xi) = ctx.cache().location().resolve_element_xi().unwrap();
            let x0 = xi[0];
            let x1 = xi[1];
            Ok(FieldValue::Real(vec![x0 * x0, x1 * x1, x0 * x1]))
        }
        fn compare(&self, _other: &dyn FieldCore) -> bool {
            false
        }
        fn copy(&self) -> Box<dyn FieldCore> {
            Box::new(ThreeComponentQuadraticField)
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[test]
    fn second_mesh_derivative_of_three_components_on_a_2d_mesh_fills_a_12_wide_buffer() {
        let region = RegionInstanceId::next();
        let mut cache = Fieldcache::new(region, 1);
        cache.set_element_xi(ElementIdentifier(1), smallvec![0.5, 0.5]);
        let mut ctx = SimpleCtx { cache, field_id: fg_core::FieldId(1) };
        let core = ThreeComponentQuadraticField;
        let first = Arc::new(FieldDerivative::first_mesh_derivative(2, region));
        let second = Arc::new(first.next_mesh_derivative(2));
        let op = DifferentialOperator::all_terms(second);
        let result = evaluate_derivative_by_finite_difference(&core, &mut ctx, &op).unwrap();

        // [component][first-direction t][second-direction d], d innermost:
        // component 0 = x0^2, component 1 = x1^2, component 2 = x0*x1.
        let expected = [
            2.0, 0.0, // c=0, t=0 (d/dx0): d/dx0 = 2, d/dx1 = 0
            0.0, 0.0, // c=0, t=1 (d/dx1): d/dx0 = 0, d/dx1 = 0
            0.0, 0.0, // c=1, t=0 (d/dx0): d/dx0 = 0, d/dx1 = 0
            0.0, 2.0, // c=1, t=1 (d/dx1): d/dx0 = 0, d/dx1 = 2
            0.0, 1.0, // c=2, t=0 (d/dx0 = x1): d/dx0 = 0, d/dx1 = 1
            1.0, 0.0, // c=2, t=1 (d/dx1 = x0): d/dx0 = 1, d/dx1 = 0
        ];
        assert_eq!(result.len(), 12);
        for (i, (got, want)) in result.iter().zip(expected.iter()).enumerate() {
            assert!((got - want).abs() < 1e-6, "index {i}: got {got}, want {want}");
        }
    }

    #[test]
    fn perturbation_is_restored_after_evaluation() {
        let region = RegionInstanceId::next();
        let mut cache = Fieldcache::new(region, 1);
        cache.set_element_xi(ElementIdentifier(1), smallvec![0.5, 0.5]);
        let mut ctx = SimpleCtx { cache, field_id: fg_core::FieldId(1) };
        let core = QuadraticXField;
        let derivative = Arc::new(FieldDerivative::first_mesh_derivative(2, region));
        let op = DifferentialOperator::all_terms(derivative);
        evaluate_derivative_by_finite_difference(&core, &mut ctx, &op).unwrap();
        let (_, xi) = ctx.cache().location().resolve_element_xi().unwrap();
        assert_eq!(xi.as_slice(), &[0.5, 0.5]);
    }
}
