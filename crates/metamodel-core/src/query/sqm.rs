//! Query path nodes.
//!
//! Nodes borrow the metamodel they were created against (`'m`). A node owns
//! its navigable path and shares its left-hand side, so cloning is cheap.

use crate::{
    model::{
        attribute::PersistentAttribute, managed::ManagedType, plural::PluralAttribute,
        types::SimpleDomainType,
    },
    query::{
        node::{NodeBuilder, SqmCreationState},
        path::NavigablePath,
        resolve::PathResolutionError,
        source::PathSource,
    },
};
use std::{fmt, sync::Arc};

///
/// SqmPath
///

#[derive(Clone, Debug)]
pub enum SqmPath<'m> {
    Root(SqmRoot<'m>),
    Simple(SqmSimplePath<'m>),
    Plural(SqmPluralValuedSimplePath<'m>),
}

impl<'m> SqmPath<'m> {
    #[must_use]
    pub const fn navigable_path(&self) -> &NavigablePath {
        match self {
            Self::Root(root) => &root.navigable_path,
            Self::Simple(path) => &path.navigable_path,
            Self::Plural(path) => &path.navigable_path,
        }
    }

    /// Left-hand side this path was created under; `None` for roots.
    #[must_use]
    pub fn lhs(&self) -> Option<&Self> {
        match self {
            Self::Root(_) => None,
            Self::Simple(path) => Some(path.lhs.as_ref()),
            Self::Plural(path) => Some(path.lhs.as_ref()),
        }
    }

    #[must_use]
    pub const fn node_builder(&self) -> NodeBuilder<'m> {
        match self {
            Self::Root(root) => root.node_builder,
            Self::Simple(path) => path.node_builder,
            Self::Plural(path) => path.node_builder,
        }
    }

    /// Path source this node was created from; `None` for roots.
    #[must_use]
    pub fn path_source(&self) -> Option<&'m dyn PathSource> {
        match self {
            Self::Root(_) => None,
            Self::Simple(path) => Some(path.source),
            Self::Plural(path) => Some(path.attribute),
        }
    }

    /// Value type reached by this path; `None` for roots.
    #[must_use]
    pub fn path_type(&self) -> Option<&'m SimpleDomainType> {
        self.path_source().map(|source| source.path_type())
    }

    #[must_use]
    pub const fn is_plural(&self) -> bool {
        matches!(self, Self::Plural(_))
    }

    /// Path source for `name` one step below this node.
    #[must_use]
    pub fn find_sub_path_source(&self, name: &str) -> Option<&'m dyn PathSource> {
        let metamodel = self.node_builder().metamodel();

        match self {
            Self::Root(root) => metamodel
                .find_attribute(root.entity.id(), name)
                .map(PersistentAttribute::as_path_source),
            Self::Simple(path) => path.source.find_sub_path_source(name, metamodel),
            Self::Plural(path) => path.attribute.find_sub_path_source(name, metamodel),
        }
    }

    /// Create the node for `name` one step below this one.
    pub fn resolve_path_part(
        &self,
        name: &str,
        state: &dyn SqmCreationState<'m>,
    ) -> Result<Self, PathResolutionError> {
        let path = self.navigable_path();

        if name.is_empty() {
            return Err(PathResolutionError::EmptySegment {
                path: format!("{path}."),
            });
        }

        check_depth(path, name, state)?;

        let source =
            self.find_sub_path_source(name)
                .ok_or_else(|| PathResolutionError::UnknownPathPart {
                    path: path.full_path().to_string(),
                    name: name.to_string(),
                })?;

        Ok(source.create_sqm_path(self, state))
    }
}

// Refuse to extend `path` by one more segment once it reaches the limit.
fn check_depth(
    path: &NavigablePath,
    name: &str,
    state: &dyn SqmCreationState<'_>,
) -> Result<(), PathResolutionError> {
    let max_depth = state.creation_context().max_path_depth();
    if path.depth() >= max_depth {
        return Err(PathResolutionError::TooDeep {
            path: format!("{path}.{name}"),
            max_depth,
        });
    }

    Ok(())
}

impl fmt::Display for SqmPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.navigable_path(), f)
    }
}

///
/// SqmRoot
///

#[derive(Clone, Debug)]
pub struct SqmRoot<'m> {
    pub(crate) navigable_path: NavigablePath,
    pub(crate) entity: &'m ManagedType,
    pub(crate) node_builder: NodeBuilder<'m>,
}

impl<'m> SqmRoot<'m> {
    #[must_use]
    pub const fn entity(&self) -> &'m ManagedType {
        self.entity
    }
}

///
/// SqmSimplePath
/// Single-valued step: a singular attribute, an element, an index or a key.
///

#[derive(Clone, Debug)]
pub struct SqmSimplePath<'m> {
    pub(crate) navigable_path: NavigablePath,
    pub(crate) source: &'m dyn PathSource,
    pub(crate) lhs: Arc<SqmPath<'m>>,
    pub(crate) node_builder: NodeBuilder<'m>,
}

impl<'m> SqmSimplePath<'m> {
    #[must_use]
    pub const fn source(&self) -> &'m dyn PathSource {
        self.source
    }
}

///
/// SqmPluralValuedSimplePath
/// Collection-valued step over a plural attribute.
///

#[derive(Clone, Debug)]
pub struct SqmPluralValuedSimplePath<'m> {
    pub(crate) navigable_path: NavigablePath,
    pub(crate) attribute: &'m PluralAttribute,
    pub(crate) lhs: Arc<SqmPath<'m>>,
    pub(crate) node_builder: NodeBuilder<'m>,
}

impl<'m> SqmPluralValuedSimplePath<'m> {
    #[must_use]
    pub const fn attribute(&self) -> &'m PluralAttribute {
        self.attribute
    }

    /// Path to the list index or map key of this collection, if it has one.
    /// Subject to the same depth limit as `SqmPath::resolve_path_part`.
    pub fn index_path(
        &self,
        state: &dyn SqmCreationState<'m>,
    ) -> Result<Option<SqmPath<'m>>, PathResolutionError> {
        let Some(source) = self.attribute.index_path_source() else {
            return Ok(None);
        };
        check_depth(&self.navigable_path, source.path_name(), state)?;

        let lhs = SqmPath::Plural(self.clone());

        Ok(Some(source.create_sqm_path(&lhs, state)))
    }
}
