//! Path sources: the metamodel side of every navigable step.
//!
//! A path source knows its name, its bindable type and its value type, can
//! look up the path source one step below it, and can create the query path
//! node for itself under a left-hand-side path.

use crate::{
    ANY_DISCRIMINATOR_PATH_NAME, ANY_KEY_PATH_NAME,
    model::{
        attribute::PersistentAttribute,
        classification::BindableType,
        registry::Metamodel,
        types::{ElementKind, SimpleDomainType},
    },
    query::{node::SqmCreationState, sqm::SqmPath},
};
use serde::Serialize;
use std::fmt::Debug;

///
/// PathSource
///

pub trait PathSource: Debug + Send + Sync {
    /// Name this source contributes to a navigable path.
    fn path_name(&self) -> &str;

    fn bindable_type(&self) -> BindableType;

    /// Type of the values reached through this source.
    fn path_type(&self) -> &SimpleDomainType;

    /// Path source for `name` one step below this one, if any.
    fn find_sub_path_source<'m>(
        &'m self,
        name: &str,
        model: &'m Metamodel,
    ) -> Option<&'m dyn PathSource>;

    /// Create the path node for this source under `lhs`.
    fn create_sqm_path<'m>(
        &'m self,
        lhs: &SqmPath<'m>,
        state: &dyn SqmCreationState<'m>,
    ) -> SqmPath<'m>;
}

///
/// DomainPathSource
///
/// Path source derived from a value type alone: the element source of a
/// plural attribute, a list index, a map key, or the columns of an `any`
/// mapping. Sub-paths of managed types are looked up in the metamodel.
///

#[derive(Clone, Debug, Serialize)]
pub struct DomainPathSource {
    path_name: String,
    bindable_type: BindableType,
    path_type: SimpleDomainType,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    sub_sources: Vec<Self>,
}

impl DomainPathSource {
    #[must_use]
    pub fn element_kind(&self) -> ElementKind {
        self.path_type.element_kind()
    }

    /// Fixed sub-sources (the key and discriminator of an `any` mapping).
    #[must_use]
    pub fn sub_sources(&self) -> &[Self] {
        &self.sub_sources
    }
}

impl PathSource for DomainPathSource {
    fn path_name(&self) -> &str {
        &self.path_name
    }

    fn bindable_type(&self) -> BindableType {
        self.bindable_type
    }

    fn path_type(&self) -> &SimpleDomainType {
        &self.path_type
    }

    fn find_sub_path_source<'m>(
        &'m self,
        name: &str,
        model: &'m Metamodel,
    ) -> Option<&'m dyn PathSource> {
        match &self.path_type {
            SimpleDomainType::Basic(_) => None,
            SimpleDomainType::Any(_) => self
                .sub_sources
                .iter()
                .find(|source| source.path_name == name)
                .map(|source| source as &dyn PathSource),
            SimpleDomainType::Embeddable(managed) | SimpleDomainType::Entity(managed) => model
                .find_attribute(managed.id, name)
                .map(PersistentAttribute::as_path_source),
        }
    }

    fn create_sqm_path<'m>(
        &'m self,
        lhs: &SqmPath<'m>,
        state: &dyn SqmCreationState<'m>,
    ) -> SqmPath<'m> {
        let navigable_path = lhs.navigable_path().append(&self.path_name);

        state
            .creation_context()
            .node_builder()
            .simple_path(navigable_path, self, lhs.clone())
    }
}

/// Build the path source for values of `value_type`, classified as `kind`.
///
/// Basic values have no sub-paths. An `any` mapping exposes its key and
/// discriminator. Embeddables and entities resolve sub-paths through the
/// metamodel, so their attributes (inherited ones included) are reachable.
#[must_use]
pub fn resolve_path_source(
    kind: ElementKind,
    name: &str,
    value_type: &SimpleDomainType,
    bindable_type: BindableType,
) -> DomainPathSource {
    debug_assert_eq!(kind, value_type.element_kind());

    let sub_sources = match (kind, value_type) {
        (ElementKind::Any, SimpleDomainType::Any(any)) => vec![
            DomainPathSource {
                path_name: ANY_KEY_PATH_NAME.to_string(),
                bindable_type: BindableType::SingularAttribute,
                path_type: SimpleDomainType::Basic(any.key.clone()),
                sub_sources: Vec::new(),
            },
            DomainPathSource {
                path_name: ANY_DISCRIMINATOR_PATH_NAME.to_string(),
                bindable_type: BindableType::SingularAttribute,
                path_type: SimpleDomainType::Basic(any.discriminator.clone()),
                sub_sources: Vec::new(),
            },
        ],
        _ => Vec::new(),
    };

    DomainPathSource {
        path_name: name.to_string(),
        bindable_type,
        path_type: value_type.clone(),
        sub_sources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{AnyMappingDomainType, BasicDomainType, BasicKind, TypeDescriptor};

    fn payment() -> SimpleDomainType {
        SimpleDomainType::Any(AnyMappingDomainType::new(
            "Payment",
            TypeDescriptor::new("app::Payment"),
            BasicDomainType::new(BasicKind::Text),
            BasicDomainType::new(BasicKind::Int64),
        ))
    }

    #[test]
    fn basic_sources_have_no_fixed_sub_sources() {
        let ty = SimpleDomainType::basic(BasicKind::Text);
        let source = resolve_path_source(
            ElementKind::Basic,
            "tags",
            &ty,
            BindableType::PluralAttribute,
        );

        assert_eq!(source.path_name(), "tags");
        assert_eq!(source.bindable_type(), BindableType::PluralAttribute);
        assert_eq!(source.element_kind(), ElementKind::Basic);
        assert!(source.sub_sources().is_empty());
    }

    #[test]
    fn any_sources_expose_key_and_discriminator() {
        let ty = payment();
        let source = resolve_path_source(
            ElementKind::Any,
            "payments",
            &ty,
            BindableType::PluralAttribute,
        );

        let names: Vec<&str> = source.sub_sources().iter().map(|s| s.path_name()).collect();
        assert_eq!(names, [ANY_KEY_PATH_NAME, ANY_DISCRIMINATOR_PATH_NAME]);

        let key = &source.sub_sources()[0];
        assert_eq!(key.path_type(), &SimpleDomainType::basic(BasicKind::Int64));
        assert_eq!(key.bindable_type(), BindableType::SingularAttribute);
    }
}
