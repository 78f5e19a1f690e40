use crate::model::managed::ManagedTypeId;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// TypeDescriptor
///
/// Fully-qualified Rust type path of a runtime value (for dispatch and
/// diagnostics). Carries no behaviour of its own.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct TypeDescriptor {
    path: String,
}

impl TypeDescriptor {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl From<&str> for TypeDescriptor {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for TypeDescriptor {
    fn from(path: String) -> Self {
        Self { path }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

///
/// BasicKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum BasicKind {
    Blob,
    Bool,
    Date,
    Decimal,
    Float32,
    Float64,
    Int16,
    Int32,
    Int64,
    Text,
    Timestamp,
    Uint32,
    Uint64,
    Ulid,
}

impl BasicKind {
    /// Default Rust type path used when no explicit descriptor is supplied.
    #[must_use]
    pub const fn rust_type(self) -> &'static str {
        match self {
            Self::Blob => "Vec<u8>",
            Self::Bool => "bool",
            Self::Date => "time::Date",
            Self::Decimal => "rust_decimal::Decimal",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::Text => "String",
            Self::Timestamp => "time::OffsetDateTime",
            Self::Uint32 => "u32",
            Self::Uint64 => "u64",
            Self::Ulid => "ulid::Ulid",
        }
    }
}

///
/// BasicDomainType
/// Scalar value type; never has sub-paths.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct BasicDomainType {
    pub kind: BasicKind,
    pub descriptor: TypeDescriptor,
}

impl BasicDomainType {
    #[must_use]
    pub fn new(kind: BasicKind) -> Self {
        Self {
            kind,
            descriptor: TypeDescriptor::new(kind.rust_type()),
        }
    }

    /// Basic type backed by a custom Rust type (newtypes, enums stored as text, ...).
    #[must_use]
    pub const fn with_descriptor(kind: BasicKind, descriptor: TypeDescriptor) -> Self {
        Self { kind, descriptor }
    }
}

///
/// AnyMappingDomainType
///
/// Polymorphic reference: a discriminator column selects the target entity,
/// a key column holds its identifier.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct AnyMappingDomainType {
    pub name: String,
    pub descriptor: TypeDescriptor,
    pub discriminator: BasicDomainType,
    pub key: BasicDomainType,
}

impl AnyMappingDomainType {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        descriptor: TypeDescriptor,
        discriminator: BasicDomainType,
        key: BasicDomainType,
    ) -> Self {
        Self {
            name: name.into(),
            descriptor,
            discriminator,
            key,
        }
    }
}

///
/// ManagedTypeRef
///
/// Resolved, non-owning reference to an entity or embeddable.
/// The handle is authoritative; name and descriptor are copied for accessors.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ManagedTypeRef {
    pub id: ManagedTypeId,
    pub name: String,
    pub descriptor: TypeDescriptor,
}

///
/// ElementKind
///
/// Value classification of an attribute's (element) type.
/// Declaration order is the classification precedence.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ElementKind {
    Basic,
    Any,
    Embedded,
    Entity,
}

impl ElementKind {
    /// Classify a domain type. Total: every `SimpleDomainType` has exactly one kind.
    #[must_use]
    pub const fn of(ty: &SimpleDomainType) -> Self {
        match ty {
            SimpleDomainType::Basic(_) => Self::Basic,
            SimpleDomainType::Any(_) => Self::Any,
            SimpleDomainType::Embeddable(_) => Self::Embedded,
            SimpleDomainType::Entity(_) => Self::Entity,
        }
    }

    /// Whether values of this kind can be dereferenced by attribute name.
    #[must_use]
    pub const fn is_navigable(self) -> bool {
        !matches!(self, Self::Basic)
    }
}

///
/// SimpleDomainType
///
/// Closed set of types an attribute value (or collection element) may have.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SimpleDomainType {
    Basic(BasicDomainType),
    Any(AnyMappingDomainType),
    Embeddable(ManagedTypeRef),
    Entity(ManagedTypeRef),
}

impl SimpleDomainType {
    #[must_use]
    pub fn basic(kind: BasicKind) -> Self {
        Self::Basic(BasicDomainType::new(kind))
    }

    #[must_use]
    pub const fn element_kind(&self) -> ElementKind {
        ElementKind::of(self)
    }

    /// Name used in diagnostics and path rendering.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Basic(basic) => basic.descriptor.path(),
            Self::Any(any) => &any.name,
            Self::Embeddable(managed) | Self::Entity(managed) => &managed.name,
        }
    }

    /// Runtime type descriptor of values of this type.
    #[must_use]
    pub const fn type_descriptor(&self) -> &TypeDescriptor {
        match self {
            Self::Basic(basic) => &basic.descriptor,
            Self::Any(any) => &any.descriptor,
            Self::Embeddable(managed) | Self::Entity(managed) => &managed.descriptor,
        }
    }

    #[must_use]
    pub const fn managed_type_id(&self) -> Option<ManagedTypeId> {
        match self {
            Self::Embeddable(managed) | Self::Entity(managed) => Some(managed.id),
            Self::Basic(_) | Self::Any(_) => None,
        }
    }
}

impl fmt::Display for SimpleDomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.element_kind(), self.type_name())
    }
}

///
/// DomainTypeRef
///
/// Bootstrap-time reference to an attribute's value type. Managed types are
/// referenced by handle and resolved when the metamodel is built.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DomainTypeRef {
    Basic(BasicDomainType),
    Any(AnyMappingDomainType),
    Managed(ManagedTypeId),
}

impl DomainTypeRef {
    #[must_use]
    pub fn basic(kind: BasicKind) -> Self {
        Self::Basic(BasicDomainType::new(kind))
    }
}

impl From<BasicKind> for DomainTypeRef {
    fn from(kind: BasicKind) -> Self {
        Self::basic(kind)
    }
}

impl From<ManagedTypeId> for DomainTypeRef {
    fn from(id: ManagedTypeId) -> Self {
        Self::Managed(id)
    }
}
