//! Node factory and the creation context handed to path sources.

use crate::{
    model::{plural::PluralAttribute, registry::Metamodel},
    obs::sink::{MetricsEvent, record},
    query::{
        path::NavigablePath,
        resolve::PathResolutionError,
        source::PathSource,
        sqm::{SqmPath, SqmPluralValuedSimplePath, SqmRoot, SqmSimplePath},
    },
};
use std::{fmt, sync::Arc};

///
/// NodeBuilder
///
/// Factory for query path nodes. Borrows the frozen metamodel; copying it
/// is free, and every node it creates carries a copy.
///

#[derive(Clone, Copy)]
pub struct NodeBuilder<'m> {
    metamodel: &'m Metamodel,
}

impl<'m> NodeBuilder<'m> {
    #[must_use]
    pub const fn new(metamodel: &'m Metamodel) -> Self {
        Self { metamodel }
    }

    #[must_use]
    pub const fn metamodel(self) -> &'m Metamodel {
        self.metamodel
    }

    /// Root path over an entity, optionally aliased.
    pub fn root(
        self,
        entity_name: &str,
        alias: Option<&str>,
    ) -> Result<SqmPath<'m>, PathResolutionError> {
        let entity = self.metamodel.entity(entity_name).ok_or_else(|| {
            PathResolutionError::UnknownEntity {
                name: entity_name.to_string(),
            }
        })?;

        let navigable_path = match alias {
            Some(alias) => NavigablePath::root_aliased(entity.name(), alias),
            None => NavigablePath::root(entity.name()),
        };

        Ok(SqmPath::Root(SqmRoot {
            navigable_path,
            entity,
            node_builder: self,
        }))
    }

    /// Collection-valued path for a plural attribute under `lhs`.
    #[must_use]
    pub fn plural_path(
        self,
        navigable_path: NavigablePath,
        attribute: &'m PluralAttribute,
        lhs: SqmPath<'m>,
    ) -> SqmPath<'m> {
        tracing::trace!(path = %navigable_path, "plural path created");
        record(MetricsEvent::PathCreated { plural: true });

        SqmPath::Plural(SqmPluralValuedSimplePath {
            navigable_path,
            attribute,
            lhs: Arc::new(lhs),
            node_builder: self,
        })
    }

    /// Single-valued path for any other path source under `lhs`.
    #[must_use]
    pub fn simple_path(
        self,
        navigable_path: NavigablePath,
        source: &'m dyn PathSource,
        lhs: SqmPath<'m>,
    ) -> SqmPath<'m> {
        tracing::trace!(path = %navigable_path, "simple path created");
        record(MetricsEvent::PathCreated { plural: false });

        SqmPath::Simple(SqmSimplePath {
            navigable_path,
            source,
            lhs: Arc::new(lhs),
            node_builder: self,
        })
    }
}

impl fmt::Debug for NodeBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeBuilder")
            .field("managed_types", &self.metamodel.managed_types().count())
            .finish()
    }
}

///
/// SqmCreationContext
///
/// Per-query creation context: the node factory plus the limits that
/// apply while paths are being created.
///

#[derive(Clone, Copy, Debug)]
pub struct SqmCreationContext<'m> {
    node_builder: NodeBuilder<'m>,
    max_path_depth: usize,
}

impl<'m> SqmCreationContext<'m> {
    #[must_use]
    pub const fn new(node_builder: NodeBuilder<'m>, max_path_depth: usize) -> Self {
        Self {
            node_builder,
            max_path_depth,
        }
    }

    #[must_use]
    pub const fn node_builder(&self) -> NodeBuilder<'m> {
        self.node_builder
    }

    /// Maximum number of segments a navigable path may have.
    #[must_use]
    pub const fn max_path_depth(&self) -> usize {
        self.max_path_depth
    }
}

///
/// SqmCreationState
///

pub trait SqmCreationState<'m> {
    fn creation_context(&self) -> &SqmCreationContext<'m>;
}

///
/// QueryCreationState
///
/// Creation state for building paths directly against a metamodel, with
/// the limits taken from the metamodel's configuration.
///

#[derive(Clone, Copy, Debug)]
pub struct QueryCreationState<'m> {
    context: SqmCreationContext<'m>,
}

impl<'m> QueryCreationState<'m> {
    #[must_use]
    pub const fn new(metamodel: &'m Metamodel) -> Self {
        Self {
            context: SqmCreationContext::new(
                NodeBuilder::new(metamodel),
                metamodel.config().paths.max_depth,
            ),
        }
    }

    #[must_use]
    pub const fn with_max_path_depth(mut self, max_path_depth: usize) -> Self {
        self.context.max_path_depth = max_path_depth;
        self
    }

    #[must_use]
    pub const fn node_builder(&self) -> NodeBuilder<'m> {
        self.context.node_builder
    }
}

impl<'m> SqmCreationState<'m> for QueryCreationState<'m> {
    fn creation_context(&self) -> &SqmCreationContext<'m> {
        &self.context
    }
}
