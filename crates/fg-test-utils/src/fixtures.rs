//! Reusable field-core fixtures for cross-crate tests.
//!
//! - [`AnalyticQuadraticField`] — `F(x) = x0^2 + 2*x1`, with an analytic
//!   first mesh derivative, for comparing against the default
//!   finite-difference derivative.

use fg_core::ValueType;
use fg_field::core_trait::{EvalContext, FieldCore, FieldValue};
use fg_field::derivative::DerivativeDirection;
use fg_field::differential_operator::DifferentialOperator;
use fg_field::error::FieldError;

/// `F(x) = x0^2 + 2*x1`, evaluated from the context's element+xi location.
///
/// Overrides the first-order mesh derivative with its closed form
/// `[2*x0, 2.0]`; any other derivative request falls back to the default
/// finite difference, so comparing the two checks the finite-difference
/// fallback against a known-correct analytic result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticQuadraticField;

impl FieldCore for AnalyticQuadraticField {
    fn type_string(&self) -> &'static str {
        "TEST_ANALYTIC_QUADRATIC"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Real
    }

    fn component_count(&self) -> usize {
        1
    }

    fn evaluate(&self, ctx: &mut dyn EvalContext) -> Result<FieldValue, FieldError> {
        let (_, xi) = ctx.cache().location().resolve_element_xi().ok_or_else(|| {
            FieldError::InvalidArgument { reason: "no element+xi location to evaluate at".into() }
        })?;
        let x0 = xi[0];
        let x1 = xi[1];
        Ok(FieldValue::Real(vec![x0 * x0 + 2.0 * x1]))
    }

    fn evaluate_derivative(
        &self,
        ctx: &mut dyn EvalContext,
        derivative: &DifferentialOperator,
    ) -> Result<Vec<f64>, FieldError> {
        let full = derivative.derivative();
        let is_first_order_mesh =
            full.lower().is_none() && matches!(full.direction(), DerivativeDirection::MeshChart { .. });
        if !is_first_order_mesh {
            return fg_field::findiff::evaluate_derivative_by_finite_difference(self, ctx, derivative);
        }
        let (_, xi) = ctx.cache().location().resolve_element_xi().ok_or_else(|| {
            FieldError::InvalidArgument { reason: "no element+xi location to differentiate at".into() }
        })?;
        Ok(vec![2.0 * xi[0], 2.0])
    }

    fn compare(&self, other: &dyn FieldCore) -> bool {
        other.as_any().downcast_ref::<Self>().is_some()
    }

    fn copy(&self) -> Box<dyn FieldCore> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
