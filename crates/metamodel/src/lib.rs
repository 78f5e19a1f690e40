//! ## Crate layout
//! - `config`: TOML configuration for bootstrap validation and path limits.
//! - `core`: managed types, attribute descriptors, path sources, query paths,
//!   and observability.
//! - `error`: the public error type.
//!
//! The `prelude` module covers what application code needs to declare a
//! metamodel and navigate it.

pub use metamodel_config as config;
pub use metamodel_core as core;

pub mod error;

use crate::core::{
    model::registry::{Metamodel, MetamodelBuilder},
    query::{node::QueryCreationState, sqm::SqmPath},
};
use std::path::Path;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::Error;

/// Load a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<config::Config, Error> {
    config::Config::from_path(path).map_err(Error::from)
}

/// Freeze a metamodel, mapping bootstrap failures onto the public error.
pub fn bootstrap(builder: MetamodelBuilder) -> Result<Metamodel, Error> {
    builder.build().map_err(Error::from)
}

/// Resolve a dotted path (`Customer.orders.total`) against a metamodel.
pub fn resolve<'m>(metamodel: &'m Metamodel, dotted: &str) -> Result<SqmPath<'m>, Error> {
    let state = QueryCreationState::new(metamodel);

    crate::core::query::resolve::resolve_path(&state, dotted).map_err(Error::from)
}

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        model::{
            attribute::{Member, PersistentAttribute, SingularAttribute, SingularAttributeBuilder},
            classification::{
                BindableType, CollectionClassification, CollectionType, PersistentAttributeType,
            },
            managed::{ManagedKind, ManagedType, ManagedTypeId},
            plural::{PluralAttribute, PluralAttributeBuilder},
            registry::{Metamodel, MetamodelBuilder},
            types::{
                AnyMappingDomainType, BasicDomainType, BasicKind, DomainTypeRef, ElementKind,
                SimpleDomainType, TypeDescriptor,
            },
        },
        query::{
            node::{NodeBuilder, QueryCreationState, SqmCreationState as _},
            path::NavigablePath,
            source::PathSource as _,
            sqm::SqmPath,
        },
    };
    pub use crate::{Error, config::Config};
}
