//! The domain-location tagged union a fieldcache currently points at.

use fg_core::{ElementIdentifier, NodeIdentifier, Xi};

/// Current domain location of a [`Fieldcache`](crate::Fieldcache).
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// No spatial location set; only time-only fields are defined.
    None,
    /// A bare time value, with no spatial component.
    Time,
    /// A node, optionally embedded in a host element at given chart
    /// coordinates (needed to evaluate mesh derivatives at a node).
    Node {
        /// The node's identifier.
        node: NodeIdentifier,
        /// The element and ξ this node is embedded in, if any.
        host_element: Option<(ElementIdentifier, Xi)>,
    },
    /// An element with parametric (chart) coordinates.
    Element {
        /// The element's identifier.
        element: ElementIdentifier,
        /// Chart coordinates within the element.
        xi: Xi,
    },
}

impl Location {
    /// Resolve this location to an `(element, xi)` pair, as required by
    /// mesh-derivative evaluation.
    ///
    /// A bare node location without a host element has no such pair and is
    /// rejected for mesh derivatives.
    pub fn resolve_element_xi(&self) -> Option<(ElementIdentifier, &Xi)> {
        match self {
            Location::Element { element, xi } => Some((*element, xi)),
            Location::Node { host_element: Some((element, xi)), .. } => Some((*element, xi)),
            _ => None,
        }
    }

    /// Whether this location carries spatial information (element or
    /// node), as opposed to [`Location::None`] or [`Location::Time`].
    pub fn is_spatial(&self) -> bool {
        matches!(self, Location::Element { .. } | Location::Node { .. })
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn bare_node_has_no_element_xi() {
        let loc = Location::Node { node: NodeIdentifier(1), host_element: None };
        assert_eq!(loc.resolve_element_xi(), None);
    }

    #[test]
    fn embedded_node_resolves_through_host_element() {
        let xi: Xi = smallvec![0.25, 0.75];
        let loc = Location::Node {
            node: NodeIdentifier(1),
            host_element: Some((ElementIdentifier(9), xi.clone())),
        };
        let (element, resolved_xi) = loc.resolve_element_xi().unwrap();
        assert_eq!(element, ElementIdentifier(9));
        assert_eq!(resolved_xi, &xi);
    }

    #[test]
    fn element_location_is_spatial() {
        let loc = Location::Element { element: ElementIdentifier(1), xi: smallvec![0.5] };
        assert!(loc.is_spatial());
        assert!(!Location::Time.is_spatial());
    }
}
