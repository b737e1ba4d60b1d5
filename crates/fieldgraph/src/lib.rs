//! fieldgraph: a computed-field evaluation engine for finite-element
//! modelling.
//!
//! This is the top-level facade crate that re-exports the public API from
//! every fieldgraph sub-crate. For most users, adding `fieldgraph` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use fieldgraph::prelude::*;
//!
//! let region = RegionInstanceId::next();
//! let mut manager = FieldManager::new(region, RegionConfig::default());
//!
//! let coordinates = manager
//!     .add("coordinates", 2, vec![], vec![], CoordinateSystem::NOT_APPLICABLE,
//!          Box::new(CoordinatesField::new(2)))
//!     .unwrap();
//! let offset = manager
//!     .add("offset", 2, vec![], vec![], CoordinateSystem::NOT_APPLICABLE,
//!          Box::new(ConstantField::new(vec![10.0, 20.0])))
//!     .unwrap();
//! let shifted = manager
//!     .add("shifted", 2, vec![coordinates, offset], vec![], CoordinateSystem::NOT_APPLICABLE,
//!          Box::new(AddField::new(2)))
//!     .unwrap();
//!
//! let mut cache = Fieldcache::new(region, manager.len());
//! cache.set_element_xi(ElementIdentifier(1), Xi::from_slice(&[0.25, 0.75]));
//! let value = shifted.evaluate_real(&mut cache).unwrap();
//! assert_eq!(value, vec![10.25, 20.75]);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`core`] | `fg-core` | Identifiers, error kinds, value types, region config |
//! | [`mesh`] | `fg-mesh` | Element, basis, element-template and mesh-group abstractions |
//! | [`field`] | `fg-field` | Field graph, manager, fieldcache, derivatives |
//! | [`builtin`] | `fg-builtin` | Built-in field-core variants |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Identifiers, error kinds, value types and the one ambient configuration
/// record (`fg-core`).
pub use fg_core as core;

/// Element, basis, element-template and mesh-group abstractions (`fg-mesh`).
pub use fg_mesh as mesh;

/// The field graph, its manager, the evaluation protocol and the
/// finite-difference derivative engine (`fg-field`).
pub use fg_field as field;

/// Built-in field-core variants: constant, componentwise add, coordinates
/// (`fg-builtin`).
pub use fg_builtin as builtin;

/// Common imports for typical fieldgraph usage.
///
/// ```rust
/// use fieldgraph::prelude::*;
/// ```
pub mod prelude {
    // Core identifiers, value types, configuration.
    pub use fg_core::{
        ChangeFlags, CoordinateSystem, CoordinateSystemType, ElementIdentifier, FieldId,
        RegionConfig, RegionInstanceId, Stamp, ValueType, Xi,
    };

    // Field graph.
    pub use fg_field::{
        DifferentialOperator, FieldCore, FieldDerivative, FieldError, FieldHandle, FieldManager,
        Fieldcache, Location,
    };

    // Mesh.
    pub use fg_mesh::{EdgeBehavior, Element, ElementPredicate, Mesh, MeshGroup};

    // Built-in field-core variants.
    pub use fg_builtin::{AddField, ConstantField, CoordinatesField, FieldTypeTag};
}
