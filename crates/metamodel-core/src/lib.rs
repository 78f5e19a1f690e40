//! Core runtime for the metamodel: managed types, attribute descriptors,
//! path sources, navigable paths and query path nodes.
//!
//! The metamodel is assembled once through `model::registry::MetamodelBuilder`
//! and is immutable afterwards. Query code borrows it through a
//! `query::node::NodeBuilder`.
#![warn(unreachable_pub)]

#[macro_use]
mod macros;

// public exports are one module level down
pub mod error;
pub mod model;
pub mod obs;
pub mod query;

// test
#[cfg(test)]
pub(crate) mod test_support;

pub use metamodel_config as config;

///
/// CONSTANTS
///

/// Positional index type used by list and array attributes without an explicit key type.
pub const LIST_INDEX_KIND: model::types::BasicKind = model::types::BasicKind::Int32;

/// Path name of the implicit index of list and array attributes.
pub const LIST_INDEX_PATH_NAME: &str = "index";

/// Path name of the key of map attributes.
pub const MAP_KEY_PATH_NAME: &str = "key";

/// Sub-path name of the key column of an `any` mapping.
pub const ANY_KEY_PATH_NAME: &str = "id";

/// Sub-path name of the discriminator column of an `any` mapping.
pub const ANY_DISCRIMINATOR_PATH_NAME: &str = "class";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{
            attribute::{PersistentAttribute, SingularAttribute},
            classification::{
                BindableType, CollectionClassification, CollectionType, PersistentAttributeType,
            },
            managed::{ManagedKind, ManagedType, ManagedTypeId},
            plural::PluralAttribute,
            registry::Metamodel,
            types::{BasicKind, ElementKind, SimpleDomainType, TypeDescriptor},
        },
        query::{
            node::{NodeBuilder, QueryCreationState, SqmCreationState},
            path::NavigablePath,
            source::PathSource,
            sqm::SqmPath,
        },
    };
}
