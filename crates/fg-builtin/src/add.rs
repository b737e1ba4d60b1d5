//! Componentwise sum of any number of same-shaped real sources.

use fg_core::ValueType;
use fg_field::core_trait::{EvalContext, FieldCore, FieldValue};
use fg_field::differential_operator::DifferentialOperator;
use fg_field::error::FieldError;

/// A field whose value is the componentwise sum of its sources.
///
/// Linear, so its derivative is the sum of its sources' derivatives; this
/// is implemented directly rather than inherited from the default
/// finite-difference fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddField {
    component_count: usize,
}

impl AddField {
    /// Build an add field over sources with `component_count` components
    /// each.
    pub fn new(component_count: usize) -> Self {
        Self { component_count }
    }
}

impl FieldCore for AddField {
    fn type_string(&self) -> &'static str {
        "ADD"
    }

    fn value_type(&self) -> ValueType {
        ValueType::Real
    }

    fn component_count(&self) -> usize {
        self.component_count
    }

    fn evaluate(&self, ctx: &mut dyn EvalContext) -> Result<FieldValue, FieldError> {
        let mut sum = vec![0.0; self.component_count];
        for i in 0..ctx.source_count() {
            let value = ctx.evaluate_source(i)?;
            let real = value.as_real().ok_or_else(|| FieldError::InvalidArgument {
                reason: format!("source {i} of an ADD field is not real-valued"),
            })?;
            if real.len() != self.component_count {
                return Err(FieldError::InvalidArgument {
                    reason: format!(
                        "source {i} has {} components, expected {}",
                        real.len(),
                        self.component_count
                    ),
                });
            }
            for (s, v) in sum.iter_mut().zip(real) {
                *s += v;
            }
        }
        Ok(FieldValue::Real(sum))
    }

    fn evaluate_derivative(
        &self,
        ctx: &mut dyn EvalContext,
        derivative: &DifferentialOperator,
    ) -> Result<Vec<f64>, FieldError> {
        let mut sum: Option<Vec<f64>> = None;
        for i in 0..ctx.source_count() {
            let d = ctx.evaluate_source_derivative(i, derivative)?;
            match &mut sum {
                None => sum = Some(d),
                Some(acc) => {
                    if acc.len() != d.len() {
                        return Err(FieldError::InvalidArgument {
                            reason: "source derivatives of an ADD field have mismatched lengths"
                                .to_string(),
                        });
                    }
                    for (a, v) in acc.iter_mut().zip(d) {
                        *a += v;
                    }
                }
            }
        }
        Ok(sum.unwrap_or_default())
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
    use fg_test_utils::FixedSourcesCtx;

    #[test]
    fn sums_every_source_componentwise() {
        let core = AddField::new(2);
        let mut ctx = FixedSourcesCtx::new(
            1e-5,
            vec![FieldValue::Real(vec![1.0, 2.0]), FieldValue::Real(vec![10.0, 20.0])],
        );
        assert_eq!(core.evaluate(&mut ctx).unwrap(), FieldValue::Real(vec![11.0, 22.0]));
    }

    #[test]
    fn rejects_a_mismatched_source_shape() {
        let core = AddField::new(2);
        let mut ctx = FixedSourcesCtx::new(1e-5, vec![FieldValue::Real(vec![1.0])]);
        assert!(core.evaluate(&mut ctx).is_err());
    }

    #[test]
    fn derivative_is_the_sum_of_source_derivatives() {
        let core = AddField::new(1);
        let mut ctx = FixedSourcesCtx::new(
            1e-5,
            vec![FieldValue::Real(vec![1.0]), FieldValue::Real(vec![2.0])],
        );
        ctx.set_source_derivative(0, vec![1.0, 0.0]);
        ctx.set_source_derivative(1, vec![0.0, 1.0]);
        let region = fg_core::RegionInstanceId::next();
        let d = std::sync::Arc::new(fg_field::derivative::FieldDerivative::first_mesh_derivative(2, region));
        let op = DifferentialOperator::all_terms(d);
        let result = core.evaluate_derivative(&mut ctx, &op).unwrap();
        assert_eq!(result, vec![1.0, 1.0]);
    }
}
