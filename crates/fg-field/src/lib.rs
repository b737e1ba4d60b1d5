//! Field graph, evaluation protocol and finite-difference derivative engine.
//!
//! This is the heart of the computed-field evaluation engine: the field
//! node ([`field`]), its manager ([`manager`]), the per-client evaluation
//! context ([`fieldcache`]), value memoisation ([`cache`]), derivative
//! descriptors and differential operators ([`derivative`],
//! [`differential_operator`]), perturbable field parameters
//! ([`parameters`]), the default finite-difference derivative ([`findiff`]),
//! and the generic bounded-sampling inverse search ([`inverse`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod core_trait;
pub mod derivative;
pub mod differential_operator;
pub mod element_predicate;
pub mod error;
pub mod field;
pub mod fieldcache;
pub mod findiff;
pub mod inverse;
pub mod location;
pub mod manager;
pub mod parameters;
pub mod write_guard;

pub use cache::{MeshLocationCache, RealVectorCache, StringCache, ValueCache};
pub use core_trait::{AssignOutcome, FieldCore, NativeDiscretisation};
pub use derivative::FieldDerivative;
pub use differential_operator::DifferentialOperator;
pub use element_predicate::FieldElementPredicate;
pub use error::FieldError;
pub use field::FieldHandle;
pub use fieldcache::Fieldcache;
pub use inverse::{find_element_xi_by_sampling, InverseSearchConfig};
pub use location::Location;
pub use manager::FieldManager;
pub use parameters::FieldParameters;
