//! Test utilities and mock types for fieldgraph development.
//!
//! Provides mock [`EvalContext`] implementations ([`NoSourcesCtx`],
//! [`FixedSourcesCtx`]) for exercising a [`FieldCore`] in isolation, without
//! building a full field graph and manager.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::AnalyticQuadraticField;

use fg_core::{ElementIdentifier, FieldId, ParameterIndex, RegionInstanceId};
use fg_field::core_trait::{EvalContext, FieldValue};
use fg_field::differential_operator::DifferentialOperator;
use fg_field::error::FieldError;
use fg_field::fieldcache::Fieldcache;

/// An evaluation context for a [`FieldCore`](fg_field::FieldCore) with no
/// sources and no field parameters.
///
/// Useful for testing leaf cores (constants, coordinates) whose `evaluate`
/// only reads the cache's current location.
pub struct NoSourcesCtx {
    cache: Fieldcache,
    field_id: FieldId,
    mesh_step: f64,
}

impl NoSourcesCtx {
    /// Build a context over a fresh region, with the given finite-difference
    /// mesh step.
    pub fn new(mesh_step: f64) -> Self {
        let region = RegionInstanceId::next();
        Self { cache: Fieldcache::new(region, 1), field_id: FieldId(1), mesh_step }
    }

    /// Mutable access to the underlying fieldcache, to set a location before
    /// evaluating.
    pub fn cache_mut(&mut self) -> &mut Fieldcache {
        &mut self.cache
    }
}

impl EvalContext for NoSourcesCtx {
    fn cache(&mut self) -> &mut Fieldcache {
        &mut self.cache
    }

    fn source_count(&self) -> usize {
        0
    }

    fn evaluate_source(&mut self, _index: usize) -> Result<FieldValue, FieldError> {
        unreachable!("NoSourcesCtx has no sources")
    }

    fn evaluate_source_derivative(
        &mut self,
        _index: usize,
        _derivative: &DifferentialOperator,
    ) -> Result<Vec<f64>, FieldError> {
        unreachable!("NoSourcesCtx has no sources")
    }

    fn source_scalar(&self, _index: usize) -> f64 {
        unreachable!("NoSourcesCtx has no sources")
    }

    fn field_id(&self) -> FieldId {
        self.field_id
    }

    fn mesh_step(&self) -> f64 {
        self.mesh_step
    }

    fn parameter_perturbation_delta(&self) -> Result<f64, FieldError> {
        Err(FieldError::InvalidArgument { reason: "NoSourcesCtx owns no field parameters".into() })
    }

    fn begin_parameter_perturbation(
        &mut self,
        _element: ElementIdentifier,
        _index: ParameterIndex,
        _delta: f64,
    ) -> Result<(), FieldError> {
        Err(FieldError::InvalidArgument { reason: "NoSourcesCtx owns no field parameters".into() })
    }

    fn end_parameter_perturbation(&mut self) {}

    fn source_native_discretisation(&mut self, _index: usize) -> Option<fg_field::core_trait::NativeDiscretisation> {
        unreachable!("NoSourcesCtx has no sources")
    }
}

/// An evaluation context backed by a fixed, pre-populated list of source
/// values and (optionally) source derivatives.
///
/// Useful for testing cores that combine sources (e.g. componentwise add)
/// without constructing real source fields.
pub struct FixedSourcesCtx {
    cache: Fieldcache,
    field_id: FieldId,
    mesh_step: f64,
    sources: Vec<FieldValue>,
    source_derivatives: Vec<Option<Vec<f64>>>,
}

impl FixedSourcesCtx {
    /// Build a context whose sources evaluate to the given values, in order.
    pub fn new(mesh_step: f64, sources: Vec<FieldValue>) -> Self {
        let region = RegionInstanceId::next();
        let source_derivatives = sources.iter().map(|_| None).collect();
        Self {
            cache: Fieldcache::new(region, 1),
            field_id: FieldId(1),
            mesh_step,
            sources,
            source_derivatives,
        }
    }

    /// Pre-populate the derivative a source returns, regardless of the
    /// differential operator requested.
    pub fn set_source_derivative(&mut self, index: usize, derivative: Vec<f64>) {
        self.source_derivatives[index] = Some(derivative);
    }

    /// Mutable access to the underlying fieldcache.
    pub fn cache_mut(&mut self) -> &mut Fieldcache {
        &mut self.cache
    }
}

impl EvalContext for FixedSourcesCtx {
    fn cache(&mut self) -> &mut Fieldcache {
        &mut self.cache
    }

    fn source_count(&self) -> usize {
        self.sources.len()
    }

    fn evaluate_source(&mut self, index: usize) -> Result<FieldValue, FieldError> {
        self.sources.get(index).cloned().ok_or(FieldError::InvalidArgument {
            reason: format!("no source at index {index}"),
        })
    }

    fn evaluate_source_derivative(
        &mut self,
        index: usize,
        _derivative: &DifferentialOperator,
    ) -> Result<Vec<f64>, FieldError> {
        self.source_derivatives
            .get(index)
            .and_then(|d| d.clone())
            .ok_or_else(|| FieldError::InvalidArgument {
                reason: format!("no derivative pre-populated for source {index}"),
            })
    }

    fn source_scalar(&self, _index: usize) -> f64 {
        unreachable!("FixedSourcesCtx has no literal scalar sources")
    }

    fn field_id(&self) -> FieldId {
        self.field_id
    }

    fn mesh_step(&self) -> f64 {
        self.mesh_step
    }

    fn parameter_perturbation_delta(&self) -> Result<f64, FieldError> {
        Err(FieldError::InvalidArgument { reason: "FixedSourcesCtx owns no field parameters".into() })
    }

    fn begin_parameter_perturbation(
        &mut self,
        _element: ElementIdentifier,
        _index: ParameterIndex,
        _delta: f64,
    ) -> Result<(), FieldError> {
        Err(FieldError::InvalidArgument { reason: "FixedSourcesCtx owns no field parameters".into() })
    }

    fn end_parameter_perturbation(&mut self) {}

    fn source_native_discretisation(&mut self, _index: usize) -> Option<fg_field::core_trait::NativeDiscretisation> {
        None
    }
}
