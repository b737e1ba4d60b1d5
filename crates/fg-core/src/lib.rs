//! Core identifiers, error kinds and value types for the fieldgraph
//! computed-field evaluation engine.
//!
//! This is the leaf crate with zero internal fieldgraph dependencies. It
//! defines the fundamental abstractions shared by every other crate in the
//! workspace: opaque identifiers, the API error-kind taxonomy, coordinate
//! systems, change-status flags, and the one ambient configuration record.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod change;
pub mod config;
pub mod error;
pub mod id;
pub mod value;

pub use change::ChangeFlags;
pub use config::RegionConfig;
pub use error::{ApiErrorKind, CoreError};
pub use id::{
    CacheIndex, ElementIdentifier, FieldId, NodeIdentifier, ParameterIndex, RegionInstanceId,
    Stamp, Xi,
};
pub use value::{CoordinateSystem, CoordinateSystemError, CoordinateSystemType, ValueType};
