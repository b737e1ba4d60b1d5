//! The coordinates/identity field: reads chart ξ straight off the current
//! location.

use fg_core::ValueType;
use fg_field::core_trait::{EvalContext, FieldCore, FieldValue};
use fg_field::derivative::DerivativeDirection;
use fg_field::differential_operator::DifferentialOperator;
use fg_field::error::FieldError;

/// A field of `dimension` components whose value at an element+xi location
/// is ξ itself.
///
/// Its first mesh derivative is the identity matrix; every higher mesh
/// derivative and every parameter derivative is zero, since ξ is linear in
/// itself and does not depend on any field parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatesField {
    dimension: usize,
}

impl CoordinatesField {
    /// Build a coordinates field over a mesh of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl FieldCore for CoordinatesField {
    fn type_string(&self) -> &'static str {
        "COORDINATES"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Real
    }

    fn component_count(&self) -> usize {
        self.dimension
    }

    fn evaluate(&self, ctx: &mut dyn EvalContext) -> Result<FieldValue, FieldError> {
        let (_, xi) = ctx.cache().location().resolve_element_xi().ok_or_else(|| {
            FieldError::InvalidArgument {
                reason: "coordinates field requires an element+xi location".to_string(),
            }
        })?;
        if xi.len() != self.dimension {
            return Err(FieldError::InvalidArgument {
                reason: format!("location has {} chart coordinates, expected {}", xi.len(), self.dimension),
            });
        }
        Ok(FieldValue::Real(xi.to_vec()))
    }

    fn evaluate_derivative(
        &self,
        ctx: &mut dyn EvalContext,
        derivative: &DifferentialOperator,
    ) -> Result<Vec<f64>, FieldError> {
        let full = derivative.derivative();
        let is_first_order_mesh_of_this_dimension = full.lower().is_none()
            && matches!(
                full.direction(),
                DerivativeDirection::MeshChart { mesh_dimension } if *mesh_dimension as usize == self.dimension
            );
        if !is_first_order_mesh_of_this_dimension {
            return fg_field::findiff::evaluate_derivative_by_finite_difference(self, ctx, derivative);
        }
        let mut out = vec![0.0; self.dimension * self.dimension];
        for c in 0..self.dimension {
            out[c * self.dimension + c] = 1.0;
        }
        Ok(out)
    }

    fn compare(&self, other: &dyn FieldCore) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|o| o == self)
    }

    fn copy(&self) -> Box<dyn FieldCore> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fg_core::{ElementIdentifier, RegionInstanceId};
    use fg_field::derivative::FieldDerivative;
    use fg_test_utils::NoSourcesCtx;
    use smallvec::smallvec;
    use std::sync::Arc;

    #[test]
    fn evaluates_to_xi_itself() {
        let mut ctx = NoSourcesCtx::new(1e-5);
        ctx.cache_mut().set_element_xi(ElementIdentifier(1), smallvec![0.25, 0.75]);
        let core = CoordinatesField::new(2);
        assert_eq!(core.evaluate(&mut ctx).unwrap(), FieldValue::Real(vec![0.25, 0.75]));
    }

    #[test]
    fn first_mesh_derivative_is_the_identity_matrix() {
        let region = RegionInstanceId::next();
        let mut ctx = NoSourcesCtx::new(1e-5);
        ctx.cache_mut().set_element_xi(ElementIdentifier(1), smallvec![0.25, 0.75]);
        let core = CoordinatesField::new(2);
        let d = Arc::new(FieldDerivative::first_mesh_derivative(2, region));
        let op = DifferentialOperator::all_terms(d);
        let result = core.evaluate_derivative(&mut ctx, &op).unwrap();
        assert_eq!(result, vec![1.0, 0.0, 0.0, 1.0]);
    }
}
