use crate::{
    model::{
        classification::{BindableType, PersistentAttributeType},
        managed::ManagedTypeId,
        plural::PluralAttribute,
        registry::{Metamodel, MetamodelBuilder, MetamodelError},
        types::{DomainTypeRef, ElementKind, SimpleDomainType, TypeDescriptor},
    },
    query::{
        node::SqmCreationState,
        source::{DomainPathSource, PathSource, resolve_path_source},
        sqm::SqmPath,
    },
};
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// MemberAccess
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum MemberAccess {
    #[default]
    Field,
    Method,
}

///
/// Member
/// The struct member (field or accessor method) backing an attribute.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Member {
    pub name: String,
    pub access: MemberAccess,
}

impl Member {
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access: MemberAccess::Field,
        }
    }

    #[must_use]
    pub fn method(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access: MemberAccess::Method,
        }
    }
}

///
/// Attribute
///
/// Fields shared by every persistent attribute. Composed into
/// `SingularAttribute` and `PluralAttribute`.
///

#[derive(Clone, Debug, Serialize)]
pub struct Attribute {
    pub(crate) declaring_type: ManagedTypeId,
    pub(crate) name: String,
    pub(crate) type_descriptor: TypeDescriptor,
    pub(crate) attribute_type: PersistentAttributeType,
    pub(crate) member: Member,
}

impl Attribute {
    /// Handle of the managed type that declares this attribute.
    #[must_use]
    pub const fn declaring_type(&self) -> ManagedTypeId {
        self.declaring_type
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runtime type of the attribute as a whole (the container for plurals).
    #[must_use]
    pub const fn type_descriptor(&self) -> &TypeDescriptor {
        &self.type_descriptor
    }

    #[must_use]
    pub const fn attribute_type(&self) -> PersistentAttributeType {
        self.attribute_type
    }

    #[must_use]
    pub const fn member(&self) -> &Member {
        &self.member
    }
}

// Pick the attribute type when the mapping does not name one.
pub(crate) const fn default_attribute_type(kind: ElementKind, plural: bool) -> PersistentAttributeType {
    match (kind, plural) {
        (ElementKind::Basic, false) => PersistentAttributeType::Basic,
        (ElementKind::Embedded, false) => PersistentAttributeType::Embedded,
        (ElementKind::Any | ElementKind::Entity, false) => PersistentAttributeType::ManyToOne,
        (ElementKind::Basic | ElementKind::Any | ElementKind::Embedded, true) => {
            PersistentAttributeType::ElementCollection
        }
        (ElementKind::Entity, true) => PersistentAttributeType::OneToMany,
    }
}

// Whether an explicit attribute type fits the value kind and arity.
pub(crate) const fn attribute_type_fits(
    attribute_type: PersistentAttributeType,
    kind: ElementKind,
    plural: bool,
) -> bool {
    use PersistentAttributeType as T;

    match (kind, plural) {
        (ElementKind::Entity, false) => matches!(attribute_type, T::ManyToOne | T::OneToOne),
        (ElementKind::Entity, true) => matches!(attribute_type, T::OneToMany | T::ManyToMany),
        (ElementKind::Any, true) => matches!(attribute_type, T::ElementCollection | T::ManyToMany),
        _ => {
            let expected = default_attribute_type(kind, plural);
            attribute_type as u8 == expected as u8
        }
    }
}

///
/// SingularAttribute
///

#[derive(Clone, Debug, Serialize)]
pub struct SingularAttribute {
    pub(crate) attribute: Attribute,
    pub(crate) value_type: SimpleDomainType,
    pub(crate) path_source: DomainPathSource,
    pub(crate) id: bool,
    pub(crate) optional: bool,
}

impl SingularAttribute {
    #[must_use]
    pub const fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.attribute.name()
    }

    #[must_use]
    pub const fn value_type(&self) -> &SimpleDomainType {
        &self.value_type
    }

    #[must_use]
    pub const fn value_kind(&self) -> ElementKind {
        self.value_type.element_kind()
    }

    #[must_use]
    pub const fn is_id(&self) -> bool {
        self.id
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    #[must_use]
    pub const fn is_association(&self) -> bool {
        matches!(
            self.attribute.attribute_type,
            PersistentAttributeType::ManyToOne | PersistentAttributeType::OneToOne
        )
    }

    #[must_use]
    pub const fn path_source(&self) -> &DomainPathSource {
        &self.path_source
    }
}

impl PathSource for SingularAttribute {
    fn path_name(&self) -> &str {
        self.attribute.name()
    }

    fn bindable_type(&self) -> BindableType {
        BindableType::SingularAttribute
    }

    fn path_type(&self) -> &SimpleDomainType {
        &self.value_type
    }

    fn find_sub_path_source<'m>(
        &'m self,
        name: &str,
        model: &'m Metamodel,
    ) -> Option<&'m dyn PathSource> {
        self.path_source.find_sub_path_source(name, model)
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
            .simple_path(navigable_path, self, lhs.clone())
    }
}

///
/// SingularAttributeBuilder
///

#[derive(Clone, Debug)]
pub struct SingularAttributeBuilder {
    declaring_type: ManagedTypeId,
    name: String,
    value_type: DomainTypeRef,
    attribute_type: Option<PersistentAttributeType>,
    member: Option<Member>,
    id: bool,
    optional: bool,
}

impl SingularAttributeBuilder {
    #[must_use]
    pub fn new(
        declaring_type: ManagedTypeId,
        name: impl Into<String>,
        value_type: impl Into<DomainTypeRef>,
    ) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            value_type: value_type.into(),
            attribute_type: None,
            member: None,
            id: false,
            optional: true,
        }
    }

    /// Mark as the identifier attribute (implies non-optional).
    #[must_use]
    pub const fn id(mut self) -> Self {
        self.id = true;
        self.optional = false;
        self
    }

    #[must_use]
    pub const fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
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

    /// Resolve the value type and produce the attribute.
    pub fn build(self, registry: &MetamodelBuilder) -> Result<SingularAttribute, MetamodelError> {
        let qualified = registry.qualified_name(self.declaring_type, &self.name)?;
        let value_type = registry.resolve_value_type(self.value_type, &qualified)?;
        let kind = value_type.element_kind();

        let attribute_type = match self.attribute_type {
            Some(attribute_type) if !attribute_type_fits(attribute_type, kind, false) => {
                return Err(MetamodelError::AttributeTypeMismatch {
                    attribute: qualified,
                    attribute_type,
                    kind,
                });
            }
            Some(attribute_type) => attribute_type,
            None => default_attribute_type(kind, false),
        };

        let path_source = resolve_path_source(
            kind,
            &self.name,
            &value_type,
            BindableType::SingularAttribute,
        );
        let member = self.member.unwrap_or_else(|| Member::field(&self.name));

        tracing::debug!(
            attribute = %qualified,
            kind = %kind,
            attribute_type = %attribute_type,
            id = self.id,
            "singular attribute built"
        );

        Ok(SingularAttribute {
            attribute: Attribute {
                declaring_type: self.declaring_type,
                name: self.name,
                type_descriptor: value_type.type_descriptor().clone(),
                attribute_type,
                member,
            },
            value_type,
            path_source,
            id: self.id,
            optional: self.optional,
        })
    }
}

///
/// PersistentAttribute
///

#[derive(Clone, Debug, Serialize)]
pub enum PersistentAttribute {
    Singular(SingularAttribute),
    Plural(PluralAttribute),
}

impl PersistentAttribute {
    #[must_use]
    pub const fn attribute(&self) -> &Attribute {
        match self {
            Self::Singular(attr) => &attr.attribute,
            Self::Plural(attr) => attr.attribute(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.attribute().name()
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Plural(_))
    }

    /// Kind of the attribute's value (the element kind for plurals).
    #[must_use]
    pub const fn value_kind(&self) -> ElementKind {
        match self {
            Self::Singular(attr) => attr.value_kind(),
            Self::Plural(attr) => attr.element_kind(),
        }
    }

    #[must_use]
    pub const fn is_id(&self) -> bool {
        match self {
            Self::Singular(attr) => attr.id,
            Self::Plural(_) => false,
        }
    }

    #[must_use]
    pub const fn as_singular(&self) -> Option<&SingularAttribute> {
        match self {
            Self::Singular(attr) => Some(attr),
            Self::Plural(_) => None,
        }
    }

    #[must_use]
    pub const fn as_plural(&self) -> Option<&PluralAttribute> {
        match self {
            Self::Plural(attr) => Some(attr),
            Self::Singular(_) => None,
        }
    }

    /// View this attribute as a path source for query navigation.
    #[must_use]
    pub fn as_path_source(&self) -> &dyn PathSource {
        match self {
            Self::Singular(attr) => attr,
            Self::Plural(attr) => attr,
        }
    }
}
