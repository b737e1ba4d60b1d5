//! Per-field perturbable parameter set.

use fg_core::{ElementIdentifier, ParameterIndex};
use std::collections::HashMap;

/// The perturbable parameter set owned by at most one field.
///
/// Tracks the number of element parameters per element and supports
/// scoped perturbation: adding a signed delta to one indexed parameter,
/// guaranteed to be removed on every exit path (including a panic
/// unwinding through an evaluation) by returning an RAII guard rather than
/// a bare acquire/release pair.
#[derive(Debug, Default)]
pub struct FieldParameters {
    parameter_counts: HashMap<ElementIdentifier, u32>,
    /// The step used for parameter-derivative central differences,
    /// distinct from the fixed mesh-chart step.
    perturbation_delta: f64,
    active: Option<(ElementIdentifier, ParameterIndex, f64)>,
}

impl FieldParameters {
    /// Construct an empty parameter set with the given perturbation delta.
    pub fn new(perturbation_delta: f64) -> Self {
        Self { parameter_counts: HashMap::new(), perturbation_delta, active: None }
    }

    /// Record the number of element parameters for `element`.
    pub fn set_parameter_count(&mut self, element: ElementIdentifier, count: u32) {
        self.parameter_counts.insert(element, count);
    }

    /// The number of element parameters for `element`, or zero if
    /// undeclared.
    pub fn parameter_count(&self, element: ElementIdentifier) -> u32 {
        self.parameter_counts.get(&element).copied().unwrap_or(0)
    }

    /// The delta used for parameter-derivative central differences.
    pub fn perturbation_delta(&self) -> f64 {
        self.perturbation_delta
    }

    /// Acquire a perturbation of `delta` on parameter `index` of `element`.
    ///
    /// Only one perturbation may be active at a time; the returned guard
    /// restores the unperturbed state when dropped, on every exit path.
    pub fn perturb(
        &mut self,
        element: ElementIdentifier,
        index: ParameterIndex,
        delta: f64,
    ) -> PerturbationGuard<'_> {
        debug_assert!(self.active.is_none(), "nested perturbation on one FieldParameters");
        self.active = Some((element, index, delta));
        PerturbationGuard { params: self }
    }

    /// The currently active perturbation, if any.
    pub fn active_perturbation(&self) -> Option<(ElementIdentifier, ParameterIndex, f64)> {
        self.active
    }

    /// Non-guard form of [`Self::perturb`], for callers (such as the
    /// finite-difference engine) that cannot hold a borrow-tied guard across
    /// an intervening recursive evaluation and instead pair this with an
    /// explicit [`Self::end_perturb`].
    pub fn begin_perturb(&mut self, element: ElementIdentifier, index: ParameterIndex, delta: f64) {
        debug_assert!(self.active.is_none(), "nested perturbation on one FieldParameters");
        self.active = Some((element, index, delta));
    }

    /// Pair of [`Self::begin_perturb`].
    pub fn end_perturb(&mut self) {
        self.active = None;
    }
}

/// RAII guard returned by [`FieldParameters::perturb`]. Dropping it removes
/// the perturbation unconditionally.
pub struct PerturbationGuard<'a> {
    params: &'a mut FieldParameters,
}

impl Drop for PerturbationGuard<'_> {
    fn drop(&mut self) {
        self.params.active = None;
    }
}
