//! Plural (collection-valued) attribute descriptors.
//!
//! A `PluralAttribute` classifies its element type, owns the path source used
//! to navigate into elements, and creates collection-valued path nodes.
//! Everything is computed once at bootstrap; the descriptor is immutable after.

use crate::{
    LIST_INDEX_KIND, LIST_INDEX_PATH_NAME, MAP_KEY_PATH_NAME,
    model::{
        attribute::{Attribute, Member, attribute_type_fits, default_attribute_type},
        classification::{
            BindableType, CollectionClassification, CollectionType, PersistentAttributeType,
        },
        managed::ManagedTypeId,
        registry::{Metamodel, MetamodelBuilder, MetamodelError},
        types::{DomainTypeRef, ElementKind, SimpleDomainType, TypeDescriptor},
    },
    query::{
        node::SqmCreationState,
        source::{DomainPathSource, PathSource, resolve_path_source},
        sqm::SqmPath,
    },
};
use serde::Serialize;

///
/// PluralAttribute
///

#[derive(Clone, Debug, Serialize)]
pub struct PluralAttribute {
    attribute: Attribute,
    classification: CollectionClassification,
    element_type: SimpleDomainType,
    element_path_source: DomainPathSource,

    /// List index or map key; `None` for sets and bags.
    #[serde(skip_serializing_if = "Option::is_none")]
    index_path_source: Option<DomainPathSource>,
}

impl PluralAttribute {
    /// Start building a plural attribute declared on `declaring_type`.
    #[must_use]
    pub fn builder(
        declaring_type: ManagedTypeId,
        name: impl Into<String>,
        element_type: impl Into<DomainTypeRef>,
        collection_type: TypeDescriptor,
        classification: CollectionClassification,
    ) -> PluralAttributeBuilder {
        PluralAttributeBuilder::new(
            declaring_type,
            name,
            element_type,
            collection_type,
            classification,
        )
    }

    #[must_use]
    pub const fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.attribute.name()
    }

    #[must_use]
    pub const fn declaring_type(&self) -> ManagedTypeId {
        self.attribute.declaring_type()
    }

    #[must_use]
    pub const fn attribute_type(&self) -> PersistentAttributeType {
        self.attribute.attribute_type()
    }

    #[must_use]
    pub const fn member(&self) -> &Member {
        self.attribute.member()
    }

    /// Runtime type of the collection container.
    #[must_use]
    pub const fn collection_type_descriptor(&self) -> &TypeDescriptor {
        self.attribute.type_descriptor()
    }

    #[must_use]
    pub const fn collection_classification(&self) -> CollectionClassification {
        self.classification
    }

    #[must_use]
    pub const fn collection_type(&self) -> CollectionType {
        self.classification.to_collection_type()
    }

    #[must_use]
    pub const fn element_type(&self) -> &SimpleDomainType {
        &self.element_type
    }

    #[must_use]
    pub const fn element_kind(&self) -> ElementKind {
        self.element_type.element_kind()
    }

    /// Runtime type of a single element.
    #[must_use]
    pub const fn element_type_descriptor(&self) -> &TypeDescriptor {
        self.element_type.type_descriptor()
    }

    /// Runtime type bound when the attribute is used in a query.
    #[must_use]
    pub const fn bindable_type_descriptor(&self) -> &TypeDescriptor {
        self.element_type.type_descriptor()
    }

    #[must_use]
    pub const fn element_path_source(&self) -> &DomainPathSource {
        &self.element_path_source
    }

    /// Positional index (lists, arrays) or key (maps) path source.
    #[must_use]
    pub const fn index_path_source(&self) -> Option<&DomainPathSource> {
        self.index_path_source.as_ref()
    }

    /// Map key type; `None` for every non-map classification.
    #[must_use]
    pub fn key_graph_type(&self) -> Option<&SimpleDomainType> {
        if !self.classification.is_map() {
            return None;
        }

        self.index_path_source
            .as_ref()
            .map(|source| source.path_type())
    }

    /// True for one-to-many and many-to-many collections.
    #[must_use]
    pub const fn is_association(&self) -> bool {
        matches!(
            self.attribute.attribute_type(),
            PersistentAttributeType::OneToMany | PersistentAttributeType::ManyToMany
        )
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        true
    }
}

impl PathSource for PluralAttribute {
    fn path_name(&self) -> &str {
        self.attribute.name()
    }

    fn bindable_type(&self) -> BindableType {
        BindableType::PluralAttribute
    }

    fn path_type(&self) -> &SimpleDomainType {
        &self.element_type
    }

    fn find_sub_path_source<'m>(
        &'m self,
        name: &str,
        model: &'m Metamodel,
    ) -> Option<&'m dyn PathSource> {
        self.element_path_source.find_sub_path_source(name, model)
    }

    fn create_sqm_path<'m>(
        &'m self,
        lhs: &SqmPath<'m>,
        state: &dyn SqmCreationState<'m>,
    ) -> SqmPath<'m> {
        let navigable_path = lhs.navigable_path().append(self.path_name());

        state
            .creation_context()
            .node_builder()
            .plural_path(navigable_path, self, lhs.clone())
    }
}

///
/// PluralAttributeBuilder
///
/// Carries everything a plural attribute needs before its element type can
/// be resolved against the managed types of the metamodel being built.
///

#[derive(Clone, Debug)]
pub struct PluralAttributeBuilder {
    declaring_type: ManagedTypeId,
    name: String,
    element_type: DomainTypeRef,
    collection_type: TypeDescriptor,
    classification: CollectionClassification,
    key_type: Option<DomainTypeRef>,
    attribute_type: Option<PersistentAttributeType>,
    member: Option<Member>,
}

impl PluralAttributeBuilder {
    #[must_use]
    pub fn new(
        declaring_type: ManagedTypeId,
        name: impl Into<String>,
        element_type: impl Into<DomainTypeRef>,
        collection_type: TypeDescriptor,
        classification: CollectionClassification,
    ) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            element_type: element_type.into(),
            collection_type,
            classification,
            key_type: None,
            attribute_type: None,
            member: None,
        }
    }

    /// Map key type, or an explicit list index type.
    #[must_use]
    pub fn key_type(mut self, key_type: impl Into<DomainTypeRef>) -> Self {
        self.key_type = Some(key_type.into());
        self
    }

    #[must_use]
    pub const fn attribute_type(mut self, attribute_type: PersistentAttributeType) -> Self {
        self.attribute_type = Some(attribute_type);
        self
    }

    #[must_use]
    pub fn member(mut self, member: Member) -> Self {
        self.member = Some(member);
        self
    }

    #[must_use]
    pub const fn declaring_type(&self) -> ManagedTypeId {
        self.declaring_type
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve element and key types, classify the element, and produce the
    /// attribute. Fails when the element type is not one of the four value
    /// kinds or the key shape does not match the classification.
    pub fn build(self, registry: &MetamodelBuilder) -> Result<PluralAttribute, MetamodelError> {
        let qualified = registry.qualified_name(self.declaring_type, &self.name)?;
        let element_type = registry.resolve_value_type(self.element_type, &qualified)?;
        let kind = element_type.element_kind();

        let attribute_type = match self.attribute_type {
            Some(attribute_type) if !attribute_type_fits(attribute_type, kind, true) => {
                return Err(MetamodelError::AttributeTypeMismatch {
                    attribute: qualified,
                    attribute_type,
                    kind,
                });
            }
            Some(attribute_type) => attribute_type,
            None => default_attribute_type(kind, true),
        };

        let index_path_source = match (self.key_type, self.classification) {
            (Some(key), classification) if classification.has_index_or_key() => {
                let key_type = registry.resolve_value_type(key, &qualified)?;
                Some(index_source(classification, &key_type))
            }
            (Some(_), classification) => {
                return Err(MetamodelError::UnexpectedKeyType {
                    attribute: qualified,
                    classification,
                });
            }
            (None, classification) if classification.is_map() => {
                return Err(MetamodelError::MissingMapKey {
                    attribute: qualified,
                    classification,
                });
            }
            (None, classification) if classification.is_indexed() => Some(index_source(
                classification,
                &SimpleDomainType::basic(LIST_INDEX_KIND),
            )),
            (None, _) => None,
        };

        let element_path_source = resolve_path_source(
            kind,
            &self.name,
            &element_type,
            BindableType::PluralAttribute,
        );
        let member = self.member.unwrap_or_else(|| Member::field(&self.name));

        tracing::debug!(
            attribute = %qualified,
            kind = %kind,
            classification = %self.classification,
            attribute_type = %attribute_type,
            "plural attribute built"
        );

        Ok(PluralAttribute {
            attribute: Attribute {
                declaring_type: self.declaring_type,
                name: self.name,
                type_descriptor: self.collection_type,
                attribute_type,
                member,
            },
            classification: self.classification,
            element_type,
            element_path_source,
            index_path_source,
        })
    }
}

// Path source for a list index or map key.
fn index_source(
    classification: CollectionClassification,
    key_type: &SimpleDomainType,
) -> DomainPathSource {
    let name = if classification.is_map() {
        MAP_KEY_PATH_NAME
    } else {
        LIST_INDEX_PATH_NAME
    };

    resolve_path_source(
        key_type.element_kind(),
        name,
        key_type,
        BindableType::SingularAttribute,
    )
}
