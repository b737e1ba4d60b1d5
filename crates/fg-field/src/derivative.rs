//! Field derivative descriptors.

use fg_core::RegionInstanceId;
use std::sync::Arc;

/// What the outermost differentiation direction of one [`FieldDerivative`]
/// link is taken with respect to.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivativeDirection {
    /// Element chart coordinates of a mesh of the given dimension; term
    /// count equals the mesh dimension.
    MeshChart {
        /// Dimension of the mesh this derivative differentiates against.
        mesh_dimension: u32,
    },
    /// Parameters of a specific field-parameters object; term count equals
    /// the number of element parameters for the current element.
    FieldParameters {
        /// Number of parameters for the element currently being evaluated.
        parameter_count: u32,
    },
}

impl DerivativeDirection {
    /// Term count of this direction: mesh dimension, or parameter count.
    pub fn term_count(&self) -> u32 {
        match self {
            Self::MeshChart { mesh_dimension } => *mesh_dimension,
            Self::FieldParameters { parameter_count } => *parameter_count,
        }
    }

    /// The mesh dimension, if this direction is a mesh-chart direction.
    pub fn mesh_dimension(&self) -> Option<u32> {
        match self {
            Self::MeshChart { mesh_dimension } => Some(*mesh_dimension),
            Self::FieldParameters { .. } => None,
        }
    }
}

/// A derivative descriptor δ of order *n*: a chain of
/// [`DerivativeDirection`] links, each pointing to the next-lower
/// derivative, terminated by `None` (order 0, i.e. plain value evaluation).
///
/// Owns a reference to the region it was created in; a derivative created
/// in one region must not be used to evaluate a field in another.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDerivative {
    direction: DerivativeDirection,
    lower: Option<Arc<FieldDerivative>>,
    region: RegionInstanceId,
}

impl FieldDerivative {
    /// Build the first-order derivative of a field w.r.t. a mesh of the
    /// given dimension, within `region`.
    pub fn first_mesh_derivative(mesh_dimension: u32, region: RegionInstanceId) -> Self {
        Self { direction: DerivativeDirection::MeshChart { mesh_dimension }, lower: None, region }
    }

    /// Build the first-order derivative of a field w.r.t. a
    /// field-parameters object with `parameter_count` parameters, within
    /// `region`.
    pub fn first_parameter_derivative(parameter_count: u32, region: RegionInstanceId) -> Self {
        Self {
            direction: DerivativeDirection::FieldParameters { parameter_count },
            lower: None,
            region,
        }
    }

    /// Build the next-higher mesh derivative on top of `self`.
    pub fn next_mesh_derivative(self: &Arc<Self>, mesh_dimension: u32) -> FieldDerivative {
        FieldDerivative {
            direction: DerivativeDirection::MeshChart { mesh_dimension },
            lower: Some(Arc::clone(self)),
            region: self.region,
        }
    }

    /// Build the next-higher parameter derivative on top of `self`.
    pub fn next_parameter_derivative(self: &Arc<Self>, parameter_count: u32) -> FieldDerivative {
        FieldDerivative {
            direction: DerivativeDirection::FieldParameters { parameter_count },
            lower: Some(Arc::clone(self)),
            region: self.region,
        }
    }

    /// This derivative's outermost direction.
    pub fn direction(&self) -> &DerivativeDirection {
        &self.direction
    }

    /// The next-lower derivative along this chain, or `None` if this is a
    /// first-order derivative.
    pub fn lower(&self) -> Option<&Arc<FieldDerivative>> {
        self.lower.as_ref()
    }

    /// The order of this derivative: 1 plus the order of its lower
    /// derivative.
    pub fn order(&self) -> u32 {
        1 + self.lower.as_ref().map_or(0, |l| l.order())
    }

    /// The owning region.
    pub fn region(&self) -> RegionInstanceId {
        self.region
    }

    /// Term count of the outermost direction.
    pub fn term_count(&self) -> u32 {
        self.direction.term_count()
    }

    /// Mesh dimension of the outermost direction, if it has one. Used by
    /// [`DifferentialOperator::element_dimension`](crate::DifferentialOperator::element_dimension).
    pub fn mesh_dimension(&self) -> Option<u32> {
        self.direction.mesh_dimension()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_order_has_order_one_and_no_lower() {
        let d = FieldDerivative::first_mesh_derivative(2, RegionInstanceId::next());
        assert_eq!(d.order(), 1);
        assert!(d.lower().is_none());
        assert_eq!(d.term_count(), 2);
    }

    #[test]
    fn chained_derivative_has_order_two() {
        let region = RegionInstanceId::next();
        let first = Arc::new(FieldDerivative::first_mesh_derivative(2, region));
        let second = first.next_mesh_derivative(2);
        assert_eq!(second.order(), 2);
        assert_eq!(second.lower().unwrap().order(), 1);
    }

    #[test]
    fn mesh_dimension_is_none_for_parameter_direction() {
        let d = FieldDerivative::first_parameter_derivative(6, RegionInstanceId::next());
        assert_eq!(d.mesh_dimension(), None);
    }
}
