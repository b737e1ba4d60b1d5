//! "Find element+xi for given values": the generic inverse-search fallback
//! used by a field core with no cheaper analytic inversion.
//!
//! A bounded sampling search over a mesh's elements: a coarse grid of
//! candidate ξ per element is evaluated and the closest sample (by
//! Euclidean distance in value space) is refined by one Newton step using
//! the finite-difference Jacobian. This is a worst-case, deterministic,
//! terminating fallback, not a claim of global invertibility.

use crate::derivative::FieldDerivative;
use crate::differential_operator::DifferentialOperator;
use crate::field::FieldHandle;
use crate::fieldcache::Fieldcache;
use fg_core::{ElementIdentifier, Xi};
use fg_mesh::Mesh;
use smallvec::smallvec;
use std::sync::Arc;

/// Tuning for [`find_element_xi_by_sampling`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseSearchConfig {
    /// Number of coarse samples per chart direction, per element.
    pub samples_per_direction: u32,
    /// Maximum Euclidean distance in value space accepted as a match.
    pub tolerance: f64,
}

impl Default for InverseSearchConfig {
    fn default() -> Self {
        Self { samples_per_direction: 4, tolerance: 1e-6 }
    }
}

/// Search every element of `mesh` for the chart location whose real value
/// is closest to `target`, refine it with one Newton step, and return it if
/// the refined residual is within `config.tolerance`.
///
/// Leaves `cache`'s location at the best candidate found, whether or not a
/// match within tolerance was reached.
pub fn find_element_xi_by_sampling(
    field: &FieldHandle,
    cache: &mut Fieldcache,
    mesh: &dyn Mesh,
    target: &[f64],
    config: InverseSearchConfig,
) -> Option<(ElementIdentifier, Xi)> {
    let dimension = mesh.dimension() as usize;
    let mut best: Option<(f64, ElementIdentifier, Xi)> = None;

    for element in mesh.create_iterator() {
        for candidate in coarse_grid(dimension, config.samples_per_direction) {
            cache.set_element_xi(element, candidate.clone());
            let Ok(value) = field.evaluate_real(cache) else { continue };
            let distance = euclidean_distance(&value, target);
            if best.as_ref().is_none_or(|(d, _, _)| distance < *d) {
                best = Some((distance, element, candidate));
            }
        }
    }

    let (_, element, xi) = best?;
    let refined = newton_refine(field, cache, element, xi.clone(), target).unwrap_or(xi);
    cache.set_element_xi(element, refined.clone());
    let value = field.evaluate_real(cache).ok()?;
    (euclidean_distance(&value, target) <= config.tolerance).then_some((element, refined))
}

fn coarse_grid(dimension: usize, samples_per_direction: u32) -> Vec<Xi> {
    let n = samples_per_direction.max(1) as usize;
    let mut points: Vec<Xi> = vec![smallvec![]];
    for _axis in 0..dimension {
        let mut next = Vec::with_capacity(points.len() * n);
        for point in &points {
            for i in 0..n {
                let value = if n == 1 { 0.5 } else { i as f64 / (n - 1) as f64 };
                let mut extended = point.clone();
                extended.push(value);
                next.push(extended);
            }
        }
        points = next;
    }
    points
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

/// One Newton step: evaluate the field and its mesh-chart Jacobian at
/// `xi`, solve for the chart delta that zeroes the first `dimension`
/// residual components, and clamp the result into `[0, 1]`.
fn newton_refine(
    field: &FieldHandle,
    cache: &mut Fieldcache,
    element: ElementIdentifier,
    xi: Xi,
    target: &[f64],
) -> Option<Xi> {
    let dimension = xi.len();
    cache.set_element_xi(element, xi.clone());
    let value = field.evaluate_real(cache).ok()?;
    if value.len() < dimension {
        return None;
    }

    let region = field.region();
    let derivative = Arc::new(FieldDerivative::first_mesh_derivative(dimension as u32, region));
    let jacobian = field.evaluate_derivative(cache, &DifferentialOperator::all_terms(derivative)).ok()?;

    let mut a = vec![vec![0.0; dimension]; dimension];
    let mut residual = vec![0.0; dimension];
    for c in 0..dimension {
        residual[c] = target[c] - value[c];
        for d in 0..dimension {
            a[c][d] = jacobian[c * dimension + d];
        }
    }

    let delta = solve_linear(&mut a, &mut residual)?;
    let mut refined = xi;
    for (i, d) in delta.iter().enumerate() {
        refined[i] = (refined[i] + d).clamp(0.0, 1.0);
    }
    Some(refined)
}

/// Gaussian elimination with partial pivoting; `None` on a singular system.
fn solve_linear(a: &mut [Vec<f64>], b: &mut [f64]) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n).max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))?;
        if a[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);
        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for k in (row + 1)..n {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_trait::{EvalContext, FieldCore, FieldValue};
    use crate::error::FieldError;
    use crate::field::NewFieldArgs;
    use fg_core::{CacheIndex, CoordinateSystem, FieldId, RegionInstanceId, ValueType};
    use fg_mesh::square_mesh::SquareMesh;

    #[derive(Debug, Clone)]
    struct IdentityCoordinates;
    impl FieldCore for IdentityCoordinates {
        fn type_string(&self) -> &'static str {
            "TEST_IDENTITY"
        }
        fn value_type(&self) -> ValueType {
            ValueType::Real
        }
        fn component_count(&self) -> usize {
            2
        }
        fn evaluate(&self, ctx: &mut dyn EvalContext) -> Result<FieldValue, FieldError> {
            let (_, xi) = ctx.cache().location().resolve_element_xi().ok_or_else(|| FieldError::InvalidArgument {
                reason: "no element location".to_string(),
            })?;
            Ok(FieldValue::Real(xi.to_vec()))
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

    #[test]
    fn coarse_grid_covers_corners_and_is_cartesian_product() {
        let grid = coarse_grid(2, 2);
        assert_eq!(grid.len(), 4);
        assert!(grid.iter().any(|p| p.as_slice() == [0.0, 0.0]));
        assert!(grid.iter().any(|p| p.as_slice() == [1.0, 1.0]));
    }

    #[test]
    fn sampling_search_finds_the_location_for_an_identity_field() {
        let region = RegionInstanceId::next();
        let mesh = SquareMesh::single_bilinear_element().unwrap();
        let field = FieldHandle::new(NewFieldArgs {
            id: FieldId(1),
            name: "identity".to_string(),
            is_auto_named: false,
            component_count: 2,
            sources: vec![],
            source_values: vec![],
            coordinate_system: CoordinateSystem::NOT_APPLICABLE,
            core: Box::new(IdentityCoordinates),
            cache_index: CacheIndex(1),
            region,
            mesh_step: 1e-5,
        });
        let mut cache = Fieldcache::new(region, 4);
        let target = [0.25, 0.75];
        let config = InverseSearchConfig { samples_per_direction: 5, tolerance: 1e-6 };
        let (element, xi) = find_element_xi_by_sampling(&field, &mut cache, &*mesh, &target, config).unwrap();
        assert_eq!(element, ElementIdentifier(1));
        assert!((xi[0] - 0.25).abs() < 1e-6);
        assert!((xi[1] - 0.75).abs() < 1e-6);
    }
}
