//! Runtime domain metamodel.
//!
//! Types in `model` describe what exists: managed types, their attributes,
//! and the domain types attribute values are drawn from. Everything here is
//! assembled by `registry::MetamodelBuilder` and frozen into a `Metamodel`.
//!
//! In general:
//! - `model` defines *what exists*
//! - `query` defines *how it is navigated*

pub mod attribute;
pub mod classification;
pub mod managed;
pub mod plural;
pub mod registry;
pub mod types;

mod validate;
