//! A 2-D element mesh with convenience constructors for common fixtures.

use crate::error::MeshError;
use crate::mesh::{ElementMesh, Mesh};
use crate::shape::ElementShape;
use crate::template::ElementTemplate;
use fg_core::ElementIdentifier;
use std::ops::{Deref, DerefMut};

/// A mesh of 2-D quadrilateral (or triangular) elements.
#[derive(Debug, Default)]
pub struct SquareMesh(ElementMesh);

impl SquareMesh {
    /// An empty square mesh.
    pub fn new() -> Self {
        Self(ElementMesh::new(2))
    }

    /// A mesh with a single bilinear-Lagrange square element at
    /// identifier 1, a convenient fixture for central-difference and
    /// derivative-layout tests.
    pub fn single_bilinear_element() -> Result<Self, MeshError> {
        let mut mesh = Self::new();
        let mut template = ElementTemplate::new(ElementShape::Square, 4);
        template.validate()?;
        mesh.create_element(ElementIdentifier(1), template)?;
        Ok(mesh)
    }
}

impl Deref for SquareMesh {
    type Target = ElementMesh;

    fn deref(&self) -> &ElementMesh {
        &self.0
    }
}

impl DerefMut for SquareMesh {
    fn deref_mut(&mut self) -> &mut ElementMesh {
        &mut self.0
    }
}
