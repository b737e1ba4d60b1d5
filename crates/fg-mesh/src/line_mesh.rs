//! A 1-D element mesh with convenience constructors for common fixtures.

use crate::error::MeshError;
use crate::mesh::{ElementMesh, Mesh};
use crate::shape::ElementShape;
use crate::template::ElementTemplate;
use fg_core::ElementIdentifier;
use std::ops::{Deref, DerefMut};

/// A mesh of 1-D line elements.
#[derive(Debug, Default)]
pub struct LineMesh(ElementMesh);

impl LineMesh {
    /// An empty line mesh.
    pub fn new() -> Self {
        Self(ElementMesh::new(1))
    }

    /// Create `count` linear-Lagrange line elements with consecutive
    /// identifiers `1..=count`, sharing no nodes (a disconnected chain is
    /// sufficient for evaluation-engine tests, which never need assembled
    /// global node numbering).
    pub fn linear_chain(count: u32) -> Result<Self, MeshError> {
        let mut mesh = Self::new();
        for i in 1..=count {
            let mut template = ElementTemplate::new(ElementShape::Line, 2);
            template.validate()?;
            mesh.create_element(ElementIdentifier(i as i32), template)?;
        }
        Ok(mesh)
    }
}

impl Deref for LineMesh {
    type Target = ElementMesh;

    fn deref(&self) -> &ElementMesh {
        &self.0
    }
}

impl DerefMut for LineMesh {
    fn deref_mut(&mut self) -> &mut ElementMesh {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_chain_creates_requested_elements() {
        let mesh = LineMesh::linear_chain(3).unwrap();
        assert_eq!(mesh.len(), 3);
        assert_eq!(mesh.dimension(), 1);
        assert!(mesh.contains(ElementIdentifier(1)));
        assert!(mesh.contains(ElementIdentifier(3)));
    }
}
