use crate::model::{
    attribute::PersistentAttribute,
    types::{ManagedTypeRef, TypeDescriptor},
};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// ManagedTypeId
///
/// Handle into the metamodel's managed-type arena. Only meaningful for the
/// metamodel (or builder) that issued it.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct ManagedTypeId(u32);

impl ManagedTypeId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ManagedTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

///
/// ManagedKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ManagedKind {
    Entity { super_type: Option<ManagedTypeId> },
    Embeddable,
    MappedSuperclass { super_type: Option<ManagedTypeId> },
}

impl ManagedKind {
    #[must_use]
    pub const fn super_type(self) -> Option<ManagedTypeId> {
        match self {
            Self::Entity { super_type } | Self::MappedSuperclass { super_type } => super_type,
            Self::Embeddable => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Entity { .. } => "entity",
            Self::Embeddable => "embeddable",
            Self::MappedSuperclass { .. } => "mapped superclass",
        }
    }
}

///
/// ManagedType
///
/// Entity, embeddable, or mapped superclass together with its declared
/// attributes (in declaration order). Inherited attributes live on the
/// super type and are reached through `Metamodel::find_attribute`.
///

#[derive(Clone, Debug, Serialize)]
pub struct ManagedType {
    pub(crate) id: ManagedTypeId,
    pub(crate) name: String,
    pub(crate) descriptor: TypeDescriptor,
    pub(crate) kind: ManagedKind,
    pub(crate) attributes: Vec<PersistentAttribute>,
}

impl ManagedType {
    #[must_use]
    pub const fn id(&self) -> ManagedTypeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub const fn kind(&self) -> ManagedKind {
        self.kind
    }

    #[must_use]
    pub const fn super_type(&self) -> Option<ManagedTypeId> {
        self.kind.super_type()
    }

    #[must_use]
    pub const fn is_entity(&self) -> bool {
        matches!(self.kind, ManagedKind::Entity { .. })
    }

    #[must_use]
    pub const fn is_embeddable(&self) -> bool {
        matches!(self.kind, ManagedKind::Embeddable)
    }

    /// Attributes declared directly on this type.
    #[must_use]
    pub fn declared_attributes(&self) -> &[PersistentAttribute] {
        &self.attributes
    }

    /// Look up an attribute declared directly on this type.
    #[must_use]
    pub fn declared_attribute(&self, name: &str) -> Option<&PersistentAttribute> {
        self.attributes.iter().find(|attr| attr.name() == name)
    }

    /// Non-owning reference used by attribute value types.
    #[must_use]
    pub fn to_ref(&self) -> ManagedTypeRef {
        ManagedTypeRef {
            id: self.id,
            name: self.name.clone(),
            descriptor: self.descriptor.clone(),
        }
    }
}
