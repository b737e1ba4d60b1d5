//! The constant field: a fixed real vector, independent of location.

use fg_field::core_trait::{AssignOutcome, EvalContext, FieldCore, FieldValue};
use fg_field::differential_operator::DifferentialOperator;
use fg_field::error::FieldError;
use fg_core::ValueType;
use std::sync::Arc;

fn chain_width(derivative: &Arc<fg_field::derivative::FieldDerivative>) -> usize {
    let mut width = 1usize;
    let mut cur = Some(derivative);
    while let Some(d) = cur {
        width *= d.term_count().max(1) as usize;
        cur = d.lower();
    }
    width
}

/// A field whose value is a fixed real vector, the same everywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantField {
    values: Vec<f64>,
}

impl ConstantField {
    /// Build a constant field with the given component values.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl FieldCore for ConstantField {
    fn type_string(&self) -> &'static str {
        "CONSTANT"
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

    fn evaluate_derivative(
        &self,
        _ctx: &mut dyn EvalContext,
        derivative: &DifferentialOperator,
    ) -> Result<Vec<f64>, FieldError> {
        let width = chain_width(derivative.derivative());
        Ok(vec![0.0; self.component_count() * width])
    }

    fn assign(
        &mut self,
        _ctx: &mut dyn EvalContext,
        value: &FieldValue,
    ) -> Result<AssignOutcome, FieldError> {
        match value {
            FieldValue::Real(v) if v.len() == self.values.len() => {
                self.values.copy_from_slice(v);
                Ok(AssignOutcome::Set)
            }
            FieldValue::Real(_) => Ok(AssignOutcome::Fail),
            _ => Ok(AssignOutcome::Fail),
        }
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

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fg_core::RegionInstanceId;
    use fg_field::derivative::FieldDerivative;
    use fg_test_utils::NoSourcesCtx;

    #[test]
    fn evaluates_to_its_stored_values_everywhere() {
        let core = ConstantField::new(vec![1.0, 2.0, 3.0]);
        let mut ctx = NoSourcesCtx::new(1e-5);
        assert_eq!(core.evaluate(&mut ctx).unwrap(), FieldValue::Real(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn derivative_is_zero_of_the_canonical_length() {
        let core = ConstantField::new(vec![1.0, 2.0]);
        let mut ctx = NoSourcesCtx::new(1e-5);
        let d = Arc::new(FieldDerivative::first_mesh_derivative(3, RegionInstanceId::next()));
        let op = DifferentialOperator::all_terms(d);
        let result = core.evaluate_derivative(&mut ctx, &op).unwrap();
        assert_eq!(result, vec![0.0; 6]);
    }

    #[test]
    fn assign_replaces_a_matching_length_value() {
        let mut core = ConstantField::new(vec![1.0, 2.0]);
        let mut ctx = NoSourcesCtx::new(1e-5);
        let outcome = core.assign(&mut ctx, &FieldValue::Real(vec![9.0, 9.0])).unwrap();
        assert_eq!(outcome, AssignOutcome::Set);
        assert_eq!(core.evaluate(&mut ctx).unwrap(), FieldValue::Real(vec![9.0, 9.0]));
    }
}
