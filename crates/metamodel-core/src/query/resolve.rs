//! Dotted path resolution: `Entity.attribute.subAttribute...`.
//!
//! The first segment names a root entity (optionally `Entity(alias)`); every
//! further segment is resolved against the path built so far through
//! `find_sub_path_source` and created through `create_sqm_path`.

use crate::query::{node::SqmCreationState, sqm::SqmPath};
use thiserror::Error as ThisError;

///
/// PathResolutionError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PathResolutionError {
    #[error("path is empty")]
    EmptyPath,

    #[error("empty segment in path '{path}'")]
    EmptySegment { path: String },

    #[error("unknown entity '{name}'")]
    UnknownEntity { name: String },

    #[error("'{name}' cannot be resolved below '{path}'")]
    UnknownPathPart { path: String, name: String },

    #[error("path '{path}' exceeds the maximum depth of {max_depth}")]
    TooDeep { path: String, max_depth: usize },
}

/// Resolve a dotted path into a query path node.
pub fn resolve_path<'m>(
    state: &dyn SqmCreationState<'m>,
    dotted: &str,
) -> Result<SqmPath<'m>, PathResolutionError> {
    let dotted = dotted.trim();
    if dotted.is_empty() {
        return Err(PathResolutionError::EmptyPath);
    }

    let mut segments = dotted.split('.');
    let head = segments.next().unwrap_or_default();
    if head.is_empty() {
        return Err(PathResolutionError::EmptySegment {
            path: dotted.to_string(),
        });
    }

    let (entity, alias) = split_alias(head);
    if entity.is_empty() || alias.is_some_and(str::is_empty) {
        return Err(PathResolutionError::EmptySegment {
            path: dotted.to_string(),
        });
    }
    let mut path = state
        .creation_context()
        .node_builder()
        .root(entity, alias)?;

    for segment in segments {
        if segment.is_empty() {
            return Err(PathResolutionError::EmptySegment {
                path: dotted.to_string(),
            });
        }
        path = path.resolve_path_part(segment, state)?;
    }

    tracing::debug!(path = %path, "path resolved");

    Ok(path)
}

// "Customer(c)" -> ("Customer", Some("c"))
fn split_alias(head: &str) -> (&str, Option<&str>) {
    head.strip_suffix(')')
        .and_then(|rest| rest.split_once('('))
        .map_or((head, None), |(entity, alias)| (entity, Some(alias)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{
            attribute::SingularAttributeBuilder, classification::BindableType,
            types::{BasicKind, ElementKind, SimpleDomainType},
        },
        query::node::QueryCreationState,
        test_support::{customer_builder, customer_metamodel},
    };

    #[test]
    fn split_alias_handles_plain_and_aliased_heads() {
        assert_eq!(split_alias("Customer"), ("Customer", None));
        assert_eq!(split_alias("Customer(c)"), ("Customer", Some("c")));
        assert_eq!(split_alias("Customer(c"), ("Customer(c", None));
    }

    #[test]
    fn resolves_through_entity_collection() {
        let (metamodel, _) = customer_metamodel();
        let state = QueryCreationState::new(&metamodel);

        let path = resolve_path(&state, "Customer.orders.total").expect("resolve");

        assert_eq!(path.navigable_path().full_path(), "Customer.orders.total");
        assert_eq!(
            path.path_type(),
            Some(&SimpleDomainType::basic(BasicKind::Decimal))
        );

        let orders = path.lhs().expect("orders path");
        assert!(orders.is_plural());
        assert_eq!(
            orders.path_type().map(SimpleDomainType::element_kind),
            Some(ElementKind::Entity)
        );
        assert!(orders.lhs().is_some_and(|root| root.lhs().is_none()));
    }

    #[test]
    fn resolves_through_embedded_collection() {
        let (metamodel, _) = customer_metamodel();
        let state = QueryCreationState::new(&metamodel);

        let path = resolve_path(&state, "Customer(c).addresses.city").expect("resolve");

        assert_eq!(path.to_string(), "Customer(c).addresses.city");
        let source = path.path_source().expect("city source");
        assert_eq!(source.bindable_type(), BindableType::SingularAttribute);
    }

    #[test]
    fn resolves_inherited_attributes_and_any_columns() {
        let (metamodel, _) = customer_metamodel();
        let state = QueryCreationState::new(&metamodel);

        let created = resolve_path(&state, "Customer.created_at").expect("inherited");
        assert!(!created.is_plural());

        let class = resolve_path(&state, "Customer.payments.class").expect("any discriminator");
        assert_eq!(
            class.path_type(),
            Some(&SimpleDomainType::basic(BasicKind::Text))
        );
    }

    #[test]
    fn basic_elements_cannot_be_dereferenced() {
        let (metamodel, _) = customer_metamodel();
        let state = QueryCreationState::new(&metamodel);

        let err = resolve_path(&state, "Customer.tags.x").expect_err("basic element");

        assert_eq!(
            err,
            PathResolutionError::UnknownPathPart {
                path: "Customer.tags".to_string(),
                name: "x".to_string(),
            }
        );
    }

    #[test]
    fn unknown_roots_and_malformed_paths_fail() {
        let (metamodel, _) = customer_metamodel();
        let state = QueryCreationState::new(&metamodel);

        assert_eq!(
            resolve_path(&state, "Ghost.name").expect_err("unknown entity"),
            PathResolutionError::UnknownEntity {
                name: "Ghost".to_string()
            }
        );
        assert_eq!(
            resolve_path(&state, "Address.city").expect_err("embeddable root"),
            PathResolutionError::UnknownEntity {
                name: "Address".to_string()
            }
        );
        assert_eq!(
            resolve_path(&state, "  ").expect_err("empty"),
            PathResolutionError::EmptyPath
        );
        assert!(matches!(
            resolve_path(&state, "Customer..name"),
            Err(PathResolutionError::EmptySegment { .. })
        ));
        assert!(matches!(
            resolve_path(&state, ".name"),
            Err(PathResolutionError::EmptySegment { .. })
        ));
    }

    #[test]
    fn empty_alias_or_entity_in_head_is_rejected() {
        let (metamodel, _) = customer_metamodel();
        let state = QueryCreationState::new(&metamodel);

        assert_eq!(
            resolve_path(&state, "Customer().orders").expect_err("empty alias"),
            PathResolutionError::EmptySegment {
                path: "Customer().orders".to_string(),
            }
        );
        assert!(matches!(
            resolve_path(&state, "(c).orders"),
            Err(PathResolutionError::EmptySegment { .. })
        ));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let (mut builder, ids) = customer_builder();
        builder.add_attribute(SingularAttributeBuilder::new(ids.order, "owner", ids.customer));
        let metamodel = builder.build().expect("bootstrap");

        let state = QueryCreationState::new(&metamodel).with_max_path_depth(3);
        assert!(resolve_path(&state, "Customer.orders.owner").is_ok());

        let err = resolve_path(&state, "Customer.orders.owner.name").expect_err("too deep");
        assert_eq!(
            err,
            PathResolutionError::TooDeep {
                path: "Customer.orders.owner.name".to_string(),
                max_depth: 3,
            }
        );
    }

    #[test]
    fn plural_paths_expose_index_and_key_paths() {
        let (metamodel, _) = customer_metamodel();
        let state = QueryCreationState::new(&metamodel);

        let SqmPath::Plural(notes) = resolve_path(&state, "Customer.notes").expect("notes") else {
            panic!("notes should be a plural path");
        };
        let key = notes
            .index_path(&state)
            .expect("within depth")
            .expect("map key path");
        assert_eq!(key.navigable_path().full_path(), "Customer.notes.key");

        let SqmPath::Plural(addresses) =
            resolve_path(&state, "Customer.addresses").expect("addresses")
        else {
            panic!("addresses should be a plural path");
        };
        let index = addresses
            .index_path(&state)
            .expect("within depth")
            .expect("list index path");
        assert_eq!(index.navigable_path().full_path(), "Customer.addresses.index");

        let SqmPath::Plural(tags) = resolve_path(&state, "Customer.tags").expect("tags") else {
            panic!("tags should be a plural path");
        };
        assert!(tags.index_path(&state).expect("within depth").is_none());
    }

    #[test]
    fn index_paths_respect_the_depth_limit() {
        let (metamodel, _) = customer_metamodel();
        let state = QueryCreationState::new(&metamodel).with_max_path_depth(2);

        let SqmPath::Plural(notes) = resolve_path(&state, "Customer.notes").expect("notes") else {
            panic!("notes should be a plural path");
        };

        assert_eq!(
            notes.index_path(&state).expect_err("too deep"),
            PathResolutionError::TooDeep {
                path: "Customer.notes.key".to_string(),
                max_depth: 2,
            }
        );
    }
}
