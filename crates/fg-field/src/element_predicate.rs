//! Adapter from a real-valued field to [`fg_mesh::ElementPredicate`].
//!
//! Lets mesh-group conditional operations ("select every element where
//! `is_exterior` is true") be driven by an ordinary field rather than a
//! bespoke predicate type, decoupling `fg-mesh` from the field graph: the
//! mesh layer only ever sees the narrow [`fg_mesh::ElementPredicate`] trait.

use crate::field::FieldHandle;
use crate::fieldcache::Fieldcache;
use fg_core::{ElementIdentifier, RegionInstanceId, Xi};
use fg_mesh::ElementPredicate;
use std::cell::RefCell;

/// Evaluates a field's first component at an element's chart centre
/// (ξ = 0.5 in every direction) and thresholds it.
///
/// A value greater than the threshold counts as "true" — the conventional
/// reading of a boolean-capable real field.
pub struct FieldElementPredicate {
    field: FieldHandle,
    cache: RefCell<Fieldcache>,
    dimension: usize,
    threshold: f64,
}

impl FieldElementPredicate {
    /// Build a predicate over `field`, evaluated in `region`'s charts of
    /// `dimension`, thresholding the field's first component at `threshold`.
    pub fn new(field: FieldHandle, region: RegionInstanceId, dimension: usize, threshold: f64) -> Self {
        Self { field, cache: RefCell::new(Fieldcache::new(region, 1)), dimension, threshold }
    }

    /// Construct with the conventional threshold of zero (positive means
    /// true).
    pub fn with_default_threshold(field: FieldHandle, region: RegionInstanceId, dimension: usize) -> Self {
        Self::new(field, region, dimension, 0.0)
    }
}

impl ElementPredicate for FieldElementPredicate {
    fn test(&self, element: ElementIdentifier) -> bool {
        let centre: Xi = std::iter::repeat(0.5).take(self.dimension).collect();
        let mut cache = self.cache.borrow_mut();
        cache.set_element_xi(element, centre);
        match self.field.evaluate_real(&mut cache) {
            Ok(values) => values.first().is_some_and(|&v| v > self.threshold),
            Err(err) => {
                tracing::debug!(%element, error = %err, "element predicate field evaluation failed, treating as false");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_trait::{EvalContext, FieldCore, FieldValue};
    use crate::error::FieldError;
    use crate::field::NewFieldArgs;
    use fg_core::{CacheIndex, CoordinateSystem, FieldId, ValueType};

    #[derive(Debug, Clone)]
    struct CentreXField;
    impl FieldCore for CentreXField {
        fn type_string(&self) -> &'static str {
            "TEST_CENTRE_X"
        }
        fn value_type(&self) -> ValueType {
            ValueType::Real
        }
        fn component_count(&self) -> usize {
            1
        }
        fn evaluate(&self, ctx: &mut dyn EvalContext) -> Result<FieldValue, FieldError> {
            let (_, xi) = ctx.cache().location().resolve_element_xi().unwrap();
            Ok(FieldValue::Real(vec![xi[0] - 0.5]))
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
    fn predicate_thresholds_the_first_component_at_the_chart_centre() {
        let region = RegionInstanceId::next();
        let field = FieldHandle::new(NewFieldArgs {
            id: FieldId(1),
            name: "centre_x".to_string(),
            is_auto_named: false,
            component_count: 1,
            sources: vec![],
            source_values: vec![],
            coordinate_system: CoordinateSystem::NOT_APPLICABLE,
            core: Box::new(CentreXField),
            cache_index: CacheIndex(0),
            region,
            mesh_step: 1e-5,
        });
        // At the chart centre, xi[0] - 0.5 == 0.0, which is not > 0.0.
        let predicate = FieldElementPredicate::with_default_threshold(field, region, 1);
        assert!(!predicate.test(ElementIdentifier(1)));
    }
}
