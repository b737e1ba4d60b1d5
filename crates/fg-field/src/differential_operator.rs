//! The differential operator abstraction.
//!
//! A pair of (field derivative, term), immutable once created, whose
//! element dimension is derived from the derivative rather than stored
//! separately.

use crate::derivative::FieldDerivative;
use crate::error::FieldError;
use std::sync::Arc;

/// A (field-derivative, term) pair used to request a single scalar
/// derivative direction, or every term of the outermost direction.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialOperator {
    derivative: Arc<FieldDerivative>,
    /// `None` encodes "all terms" (the sentinel negative term of the
    /// original API).
    term: Option<u32>,
}

impl DifferentialOperator {
    /// Construct a differential operator selecting a single term.
    ///
    /// Validates `term` against the derivative's term count when the
    /// derivative's outermost direction is a mesh-chart direction; a term
    /// out of `[0, meshTermCount)` is rejected.
    pub fn single_term(derivative: Arc<FieldDerivative>, term: u32) -> Result<Self, FieldError> {
        if derivative.mesh_dimension().is_some() && term >= derivative.term_count() {
            return Err(FieldError::InvalidArgument {
                reason: format!(
                    "term {term} out of range for derivative with {} mesh terms",
                    derivative.term_count()
                ),
            });
        }
        Ok(Self { derivative, term: Some(term) })
    }

    /// Construct a differential operator over every term of the
    /// derivative's outermost direction.
    pub fn all_terms(derivative: Arc<FieldDerivative>) -> Self {
        Self { derivative, term: None }
    }

    /// The underlying field derivative.
    pub fn derivative(&self) -> &Arc<FieldDerivative> {
        &self.derivative
    }

    /// `Some(term)` for a single-term operator, `None` for "all terms".
    pub fn term(&self) -> Option<u32> {
        self.term
    }

    /// The mesh dimension of the underlying derivative when mesh-valued,
    /// else zero.
    pub fn element_dimension(&self) -> u32 {
        self.derivative.mesh_dimension().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fg_core::RegionInstanceId;

    fn mesh_derivative(dim: u32) -> Arc<FieldDerivative> {
        Arc::new(FieldDerivative::first_mesh_derivative(dim, RegionInstanceId::next()))
    }

    #[test]
    fn single_term_in_range_is_accepted() {
        let d = mesh_derivative(2);
        assert!(DifferentialOperator::single_term(d, 1).is_ok());
    }

    #[test]
    fn single_term_out_of_range_is_rejected() {
        let d = mesh_derivative(2);
        assert!(DifferentialOperator::single_term(d, 2).is_err());
    }

    #[test]
    fn all_terms_has_no_term_index() {
        let d = mesh_derivative(2);
        let op = DifferentialOperator::all_terms(d);
        assert_eq!(op.term(), None);
    }

    #[test]
    fn element_dimension_matches_mesh_dimension() {
        let d = mesh_derivative(3);
        let op = DifferentialOperator::all_terms(d);
        assert_eq!(op.element_dimension(), 3);
    }

    #[test]
    fn element_dimension_is_zero_for_parameter_derivative() {
        let d = Arc::new(FieldDerivative::first_parameter_derivative(4, RegionInstanceId::next()));
        let op = DifferentialOperator::all_terms(d);
        assert_eq!(op.element_dimension(), 0);
    }
}
