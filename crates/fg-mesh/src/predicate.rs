//! Decouples "destroy by conditional field" and group conditional
//! add/remove from the field-graph crate.

use fg_core::ElementIdentifier;

/// A boolean-capable test over one element, used by
/// [`Mesh::destroy_by_conditional`](crate::Mesh::destroy_by_conditional) and
/// the group conditional add/remove operations.
///
/// `fg-mesh` has no dependency on the field-graph crate; `fg-field` supplies
/// the adapter that evaluates a real field at a synthetic element-chart
/// location and thresholds its first component, so the mesh layer stays
/// ignorant of what a "field" is.
pub trait ElementPredicate {
    /// Evaluate the predicate for one element.
    fn test(&self, element: ElementIdentifier) -> bool;
}

impl<F: Fn(ElementIdentifier) -> bool> ElementPredicate for F {
    fn test(&self, element: ElementIdentifier) -> bool {
        self(element)
    }
}
