use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// CollectionClassification
///
/// Semantic shape of a plural attribute's container.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum CollectionClassification {
    Array,
    Bag,
    IdBag,
    List,
    Map,
    OrderedMap,
    OrderedSet,
    Set,
    SortedMap,
    SortedSet,
}

impl CollectionClassification {
    /// Map onto the coarse JPA-style collection type.
    #[must_use]
    pub const fn to_collection_type(self) -> CollectionType {
        match self {
            Self::Array | Self::Bag | Self::IdBag => CollectionType::Collection,
            Self::List => CollectionType::List,
            Self::Set | Self::SortedSet | Self::OrderedSet => CollectionType::Set,
            Self::Map | Self::SortedMap | Self::OrderedMap => CollectionType::Map,
        }
    }

    /// Keyed by a map key.
    #[must_use]
    pub const fn is_map(self) -> bool {
        matches!(self, Self::Map | Self::SortedMap | Self::OrderedMap)
    }

    /// Addressed by a positional index.
    #[must_use]
    pub const fn is_indexed(self) -> bool {
        matches!(self, Self::List | Self::Array)
    }

    /// Whether the attribute exposes an index or key path source.
    #[must_use]
    pub const fn has_index_or_key(self) -> bool {
        self.is_map() || self.is_indexed()
    }
}

///
/// CollectionType
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum CollectionType {
    Collection,
    List,
    Map,
    Set,
}

///
/// PersistentAttributeType
/// Kind of association (or absence of one) an attribute represents.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum PersistentAttributeType {
    Basic,
    ElementCollection,
    Embedded,
    ManyToMany,
    ManyToOne,
    OneToMany,
    OneToOne,
}

impl PersistentAttributeType {
    #[must_use]
    pub const fn is_plural(self) -> bool {
        matches!(
            self,
            Self::ElementCollection | Self::OneToMany | Self::ManyToMany
        )
    }

    #[must_use]
    pub const fn is_association(self) -> bool {
        matches!(
            self,
            Self::ManyToOne | Self::OneToOne | Self::OneToMany | Self::ManyToMany
        )
    }
}

///
/// BindableType
/// How a metamodel element may be bound within a query.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum BindableType {
    EntityType,
    PluralAttribute,
    SingularAttribute,
}
