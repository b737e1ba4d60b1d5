//! Element, basis, element-template and mesh-group abstractions used by
//! the field evaluation core.
//!
//! This crate knows nothing about fields: the evaluation engine lives in
//! `fg-field` and depends on this crate, not the other way around. Where
//! the mesh layer needs a field-graph concept (a boolean-capable field used
//! to filter elements), it is expressed as a narrow local trait
//! ([`ElementPredicate`]) that `fg-field` implements, keeping the
//! dependency edge one-directional.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod basis;
pub mod edge;
pub mod element;
pub mod error;
pub mod line_mesh;
pub mod mesh;
pub mod predicate;
pub mod shape;
pub mod square_mesh;
pub mod template;

pub use basis::{BasisFunctionType, BasisSignature, ElementBasis};
pub use edge::EdgeBehavior;
pub use element::Element;
pub use error::MeshError;
pub use line_mesh::LineMesh;
pub use mesh::{Mesh, MeshGroup};
pub use predicate::ElementPredicate;
pub use shape::ElementShape;
pub use square_mesh::SquareMesh;
pub use template::{ElementFieldComponent, ElementTemplate, NodalValueDescriptor, ScaleFactorSetId};
