//! Module: registry
//! Responsibility: metamodel bootstrap and the frozen, process-wide metamodel.
//! Does not own: query path construction (see `query`).
//!
//! Invariants:
//! - Managed type handles are dense, issued in registration order.
//! - A super type is always registered before its subtypes, so hierarchies
//!   are acyclic by construction.
//! - Any attribute failure fails the whole bootstrap; no partial metamodel
//!   is ever produced.

use crate::{
    error::ErrorTree,
    model::{
        attribute::{PersistentAttribute, SingularAttributeBuilder},
        classification::{CollectionClassification, PersistentAttributeType},
        managed::{ManagedKind, ManagedType, ManagedTypeId},
        plural::PluralAttributeBuilder,
        types::{DomainTypeRef, ElementKind, ManagedTypeRef, SimpleDomainType, TypeDescriptor},
        validate::validate_metamodel,
    },
    obs::sink::{MetricsEvent, record},
    query::node::NodeBuilder,
};
use metamodel_config::Config;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// MetamodelError
///

#[derive(Debug, ThisError)]
pub enum MetamodelError {
    #[error("unrecognized value type '{type_name}' for attribute '{attribute}'")]
    UnrecognizedElementType { attribute: String, type_name: String },

    #[error("unknown managed type {id} referenced by '{context}'")]
    UnknownManagedType { id: ManagedTypeId, context: String },

    #[error("managed type '{name}' registered more than once")]
    DuplicateManagedType { name: String },

    #[error("attribute '{attribute}' declared more than once")]
    DuplicateAttribute { attribute: String },

    #[error("invalid super type for '{name}': {message}")]
    InvalidSuperType { name: String, message: String },

    #[error("attribute '{attribute}' ({classification}) requires a key type")]
    MissingMapKey {
        attribute: String,
        classification: CollectionClassification,
    },

    #[error("attribute '{attribute}' ({classification}) does not take a key type")]
    UnexpectedKeyType {
        attribute: String,
        classification: CollectionClassification,
    },

    #[error("attribute '{attribute}' cannot be {attribute_type} with {kind} values")]
    AttributeTypeMismatch {
        attribute: String,
        attribute_type: PersistentAttributeType,
        kind: ElementKind,
    },

    #[error("metamodel validation failed: {0}")]
    Validation(ErrorTree),
}

///
/// ManagedTypeHeader
/// Registration record for a managed type before its attributes exist.
///

#[derive(Clone, Debug)]
struct ManagedTypeHeader {
    id: ManagedTypeId,
    name: String,
    descriptor: TypeDescriptor,
    kind: ManagedKind,
}

impl ManagedTypeHeader {
    fn to_ref(&self) -> ManagedTypeRef {
        ManagedTypeRef {
            id: self.id,
            name: self.name.clone(),
            descriptor: self.descriptor.clone(),
        }
    }
}

///
/// PendingAttribute
///

#[derive(Clone, Debug)]
enum PendingAttribute {
    Singular(SingularAttributeBuilder),
    Plural(PluralAttributeBuilder),
}

///
/// MetamodelBuilder
///
/// Bootstrap surface. Managed types are registered first (handles are
/// returned immediately); attributes are collected and only resolved in
/// `build`, so attributes may reference types registered after their owner.
///

#[derive(Debug, Default)]
pub struct MetamodelBuilder {
    config: Config,
    types: Vec<ManagedTypeHeader>,
    pending: Vec<PendingAttribute>,
}

impl MetamodelBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Register a managed type and return its handle.
    pub fn add_managed_type(
        &mut self,
        name: impl Into<String>,
        descriptor: impl Into<TypeDescriptor>,
        kind: ManagedKind,
    ) -> ManagedTypeId {
        #[expect(clippy::cast_possible_truncation)]
        let id = ManagedTypeId::new(self.types.len() as u32);

        self.types.push(ManagedTypeHeader {
            id,
            name: name.into(),
            descriptor: descriptor.into(),
            kind,
        });

        id
    }

    pub fn add_entity(
        &mut self,
        name: impl Into<String>,
        descriptor: impl Into<TypeDescriptor>,
    ) -> ManagedTypeId {
        self.add_managed_type(name, descriptor, ManagedKind::Entity { super_type: None })
    }

    pub fn add_embeddable(
        &mut self,
        name: impl Into<String>,
        descriptor: impl Into<TypeDescriptor>,
    ) -> ManagedTypeId {
        self.add_managed_type(name, descriptor, ManagedKind::Embeddable)
    }

    pub fn add_mapped_superclass(
        &mut self,
        name: impl Into<String>,
        descriptor: impl Into<TypeDescriptor>,
    ) -> ManagedTypeId {
        self.add_managed_type(
            name,
            descriptor,
            ManagedKind::MappedSuperclass { super_type: None },
        )
    }

    pub fn add_attribute(&mut self, attribute: SingularAttributeBuilder) -> &mut Self {
        self.pending.push(PendingAttribute::Singular(attribute));
        self
    }

    pub fn add_plural_attribute(&mut self, attribute: PluralAttributeBuilder) -> &mut Self {
        self.pending.push(PendingAttribute::Plural(attribute));
        self
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Name of a registered managed type.
    #[must_use]
    pub fn managed_type_name(&self, id: ManagedTypeId) -> Option<&str> {
        self.header(id).map(|header| header.name.as_str())
    }

    /// `Owner.attribute` rendering used in diagnostics.
    pub fn qualified_name(
        &self,
        declaring_type: ManagedTypeId,
        attribute: &str,
    ) -> Result<String, MetamodelError> {
        let owner = self.managed_type_name(declaring_type).ok_or_else(|| {
            MetamodelError::UnknownManagedType {
                id: declaring_type,
                context: attribute.to_string(),
            }
        })?;

        Ok(format!("{owner}.{attribute}"))
    }

    /// Resolve a bootstrap type reference into a value type.
    ///
    /// Entities and embeddables are the only managed types an attribute may
    /// hold; a mapped superclass is not a value type.
    pub fn resolve_value_type(
        &self,
        ty: DomainTypeRef,
        attribute: &str,
    ) -> Result<SimpleDomainType, MetamodelError> {
        match ty {
            DomainTypeRef::Basic(basic) => Ok(SimpleDomainType::Basic(basic)),
            DomainTypeRef::Any(any) => Ok(SimpleDomainType::Any(any)),
            DomainTypeRef::Managed(id) => {
                let header = self
                    .header(id)
                    .ok_or_else(|| MetamodelError::UnknownManagedType {
                        id,
                        context: attribute.to_string(),
                    })?;

                match header.kind {
                    ManagedKind::Entity { .. } => Ok(SimpleDomainType::Entity(header.to_ref())),
                    ManagedKind::Embeddable => Ok(SimpleDomainType::Embeddable(header.to_ref())),
                    ManagedKind::MappedSuperclass { .. } => {
                        Err(MetamodelError::UnrecognizedElementType {
                            attribute: attribute.to_string(),
                            type_name: header.name.clone(),
                        })
                    }
                }
            }
        }
    }

    /// Resolve every attribute and freeze the metamodel.
    pub fn build(self) -> Result<Metamodel, MetamodelError> {
        let span = tracing::info_span!("metamodel.bootstrap", managed_types = self.types.len());
        let _enter = span.enter();

        match self.build_inner() {
            Ok(metamodel) => {
                let attributes = metamodel.attribute_count();
                tracing::info!(
                    managed_types = metamodel.types.len(),
                    attributes,
                    "metamodel bootstrap finished"
                );
                record(MetricsEvent::BootstrapFinished {
                    managed_types: metamodel.types.len() as u64,
                    attributes: attributes as u64,
                });

                Ok(metamodel)
            }
            Err(err) => {
                tracing::warn!(error = %err, "metamodel bootstrap failed");
                record(MetricsEvent::BootstrapFailed);

                Err(err)
            }
        }
    }

    fn build_inner(mut self) -> Result<Metamodel, MetamodelError> {
        // Phase 1: structural checks on the registered types.
        let by_name = self.index_names()?;
        self.check_super_types()?;

        // Phase 2: resolve attributes against the registered types.
        let pending = std::mem::take(&mut self.pending);
        let mut attributes: Vec<Vec<PersistentAttribute>> =
            std::iter::repeat_with(Vec::new).take(self.types.len()).collect();

        for attribute in pending {
            let attribute = match attribute {
                PendingAttribute::Singular(builder) => {
                    PersistentAttribute::Singular(builder.build(&self)?)
                }
                PendingAttribute::Plural(builder) => {
                    PersistentAttribute::Plural(builder.build(&self)?)
                }
            };

            let owner = attribute.attribute().declaring_type();
            let Some(declared) = attributes.get_mut(owner.index()) else {
                return Err(MetamodelError::UnknownManagedType {
                    id: owner,
                    context: attribute.name().to_string(),
                });
            };
            if declared.iter().any(|existing| existing.name() == attribute.name()) {
                return Err(MetamodelError::DuplicateAttribute {
                    attribute: self.qualified_name(owner, attribute.name())?,
                });
            }

            record(MetricsEvent::AttributeBuilt {
                kind: attribute.value_kind(),
                plural: attribute.is_collection(),
            });
            declared.push(attribute);
        }

        // Phase 3: freeze.
        let types: Vec<ManagedType> = self
            .types
            .into_iter()
            .zip(attributes)
            .map(|(header, attributes)| ManagedType {
                id: header.id,
                name: header.name,
                descriptor: header.descriptor,
                kind: header.kind,
                attributes,
            })
            .collect();

        let metamodel = Metamodel {
            types,
            by_name,
            config: self.config,
        };

        // Phase 4: schema-wide validation.
        if metamodel.config.bootstrap.validate {
            validate_metamodel(&metamodel).map_err(MetamodelError::Validation)?;
        }

        Ok(metamodel)
    }

    fn header(&self, id: ManagedTypeId) -> Option<&ManagedTypeHeader> {
        self.types.get(id.index())
    }

    fn index_names(&self) -> Result<BTreeMap<String, ManagedTypeId>, MetamodelError> {
        let mut by_name = BTreeMap::new();

        for header in &self.types {
            if by_name.insert(header.name.clone(), header.id).is_some() {
                return Err(MetamodelError::DuplicateManagedType {
                    name: header.name.clone(),
                });
            }
        }

        Ok(by_name)
    }

    fn check_super_types(&self) -> Result<(), MetamodelError> {
        for header in &self.types {
            let Some(super_id) = header.kind.super_type() else {
                continue;
            };

            if super_id >= header.id {
                return Err(MetamodelError::InvalidSuperType {
                    name: header.name.clone(),
                    message: format!("super type {super_id} must be registered before its subtypes"),
                });
            }

            let Some(super_header) = self.header(super_id) else {
                return Err(MetamodelError::UnknownManagedType {
                    id: super_id,
                    context: header.name.clone(),
                });
            };

            let allowed = match header.kind {
                ManagedKind::Entity { .. } => matches!(
                    super_header.kind,
                    ManagedKind::Entity { .. } | ManagedKind::MappedSuperclass { .. }
                ),
                ManagedKind::MappedSuperclass { .. } => {
                    matches!(super_header.kind, ManagedKind::MappedSuperclass { .. })
                }
                ManagedKind::Embeddable => false,
            };
            if !allowed {
                return Err(MetamodelError::InvalidSuperType {
                    name: header.name.clone(),
                    message: format!(
                        "a {} cannot extend the {} '{}'",
                        header.kind.label(),
                        super_header.kind.label(),
                        super_header.name
                    ),
                });
            }
        }

        Ok(())
    }
}

///
/// Metamodel
///
/// Frozen set of managed types. Immutable and `Send + Sync`; share it behind
/// an `Arc` and hand out `NodeBuilder`s per query.
///

#[derive(Debug, Serialize)]
pub struct Metamodel {
    types: Vec<ManagedType>,

    #[serde(skip)]
    by_name: BTreeMap<String, ManagedTypeId>,

    #[serde(skip)]
    config: Config,
}

impl Metamodel {
    #[must_use]
    pub fn builder() -> MetamodelBuilder {
        MetamodelBuilder::new()
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn get(&self, id: ManagedTypeId) -> Option<&ManagedType> {
        self.types.get(id.index())
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&ManagedType> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    /// Look up an entity (not an embeddable or mapped superclass) by name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&ManagedType> {
        self.by_name(name).filter(|ty| ty.is_entity())
    }

    pub fn managed_types(&self) -> impl Iterator<Item = &ManagedType> {
        self.types.iter()
    }

    /// Iterate a type and its super types, most specific first.
    pub fn hierarchy(&self, id: ManagedTypeId) -> impl Iterator<Item = &ManagedType> {
        std::iter::successors(self.get(id), |ty| {
            ty.super_type().and_then(|super_id| self.get(super_id))
        })
    }

    /// Find an attribute declared on the type or inherited from a super type.
    #[must_use]
    pub fn find_attribute(&self, id: ManagedTypeId, name: &str) -> Option<&PersistentAttribute> {
        self.hierarchy(id)
            .find_map(|ty| ty.declared_attribute(name))
    }

    /// All attributes visible on a type, inherited ones first.
    #[must_use]
    pub fn attributes(&self, id: ManagedTypeId) -> Vec<&PersistentAttribute> {
        let mut chain: Vec<&ManagedType> = self.hierarchy(id).collect();
        chain.reverse();

        chain
            .into_iter()
            .flat_map(|ty| ty.declared_attributes())
            .collect()
    }

    /// Total number of declared attributes across all managed types.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.types.iter().map(|ty| ty.attributes.len()).sum()
    }

    /// Node factory for query trees over this metamodel.
    #[must_use]
    pub const fn node_builder(&self) -> NodeBuilder<'_> {
        NodeBuilder::new(self)
    }
}
