//! Built-in field-core variants.
//!
//! A small set of concrete, testable [`fg_field::FieldCore`] implementations:
//! a constant, componentwise add of any number of sources, and the
//! coordinates/identity field that reads chart coordinates straight off a
//! fieldcache's location.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod add;
pub mod constant;
pub mod coordinates;
pub mod type_tag;

pub use add::AddField;
pub use constant::ConstantField;
pub use coordinates::CoordinatesField;
pub use type_tag::FieldTypeTag;
