use crate::model::{
    attribute::SingularAttributeBuilder,
    classification::CollectionClassification,
    managed::{ManagedKind, ManagedTypeId},
    plural::PluralAttribute,
    registry::{Metamodel, MetamodelBuilder},
    types::{AnyMappingDomainType, BasicDomainType, BasicKind, DomainTypeRef, TypeDescriptor},
};

/// Type path prefix for fixture descriptors.
pub(crate) const TEST_TYPE_PREFIX: &str = "metamodel_core::test_support";

///
/// FixtureIds
///
/// Handles of the managed types registered by `customer_builder`.
///

#[derive(Clone, Copy, Debug)]
pub(crate) struct FixtureIds {
    pub(crate) auditable: ManagedTypeId,
    pub(crate) address: ManagedTypeId,
    pub(crate) order: ManagedTypeId,
    pub(crate) customer: ManagedTypeId,
}

pub(crate) fn descriptor(name: &str) -> TypeDescriptor {
    TypeDescriptor::new(format!("{TEST_TYPE_PREFIX}::{name}"))
}

pub(crate) fn payment_type() -> DomainTypeRef {
    DomainTypeRef::Any(AnyMappingDomainType::new(
        "Payment",
        descriptor("Payment"),
        BasicDomainType::new(BasicKind::Text),
        BasicDomainType::new(BasicKind::Int64),
    ))
}

/// Register the customer schema without building it, so tests can add to it.
///
/// - `Auditable` (mapped superclass): `created_at`
/// - `Address` (embeddable): `city`, `street`
/// - `Order` (entity): `id`, `total`
/// - `Customer` (entity, extends `Auditable`): `id`, `name`, `orders`,
///   `addresses`, `tags`, `notes`, `payments`
pub(crate) fn customer_builder() -> (MetamodelBuilder, FixtureIds) {
    let mut builder = Metamodel::builder();

    let auditable = builder.add_mapped_superclass("Auditable", descriptor("Auditable"));
    let address = builder.add_embeddable("Address", descriptor("Address"));
    let order = builder.add_entity("Order", descriptor("Order"));
    let customer = builder.add_managed_type(
        "Customer",
        descriptor("Customer"),
        ManagedKind::Entity {
            super_type: Some(auditable),
        },
    );

    builder
        .add_attribute(SingularAttributeBuilder::new(
            auditable,
            "created_at",
            BasicKind::Timestamp,
        ))
        .add_attribute(SingularAttributeBuilder::new(address, "city", BasicKind::Text))
        .add_attribute(SingularAttributeBuilder::new(address, "street", BasicKind::Text))
        .add_attribute(SingularAttributeBuilder::new(order, "id", BasicKind::Ulid).id())
        .add_attribute(SingularAttributeBuilder::new(order, "total", BasicKind::Decimal))
        .add_attribute(SingularAttributeBuilder::new(customer, "id", BasicKind::Uint64).id())
        .add_attribute(SingularAttributeBuilder::new(customer, "name", BasicKind::Text))
        .add_plural_attribute(PluralAttribute::builder(
            customer,
            "orders",
            order,
            TypeDescriptor::new("std::collections::BTreeSet<Order>"),
            CollectionClassification::Set,
        ))
        .add_plural_attribute(PluralAttribute::builder(
            customer,
            "addresses",
            address,
            TypeDescriptor::new("Vec<Address>"),
            CollectionClassification::List,
        ))
        .add_plural_attribute(PluralAttribute::builder(
            customer,
            "tags",
            BasicKind::Text,
            TypeDescriptor::new("std::collections::BTreeSet<String>"),
            CollectionClassification::SortedSet,
        ))
        .add_plural_attribute(
            PluralAttribute::builder(
                customer,
                "notes",
                BasicKind::Text,
                TypeDescriptor::new("std::collections::HashMap<String, String>"),
                CollectionClassification::Map,
            )
            .key_type(BasicKind::Text),
        )
        .add_plural_attribute(PluralAttribute::builder(
            customer,
            "payments",
            payment_type(),
            TypeDescriptor::new("Vec<Payment>"),
            CollectionClassification::Bag,
        ));

    (
        builder,
        FixtureIds {
            auditable,
            address,
            order,
            customer,
        },
    )
}

/// Build the customer schema.
pub(crate) fn customer_metamodel() -> (Metamodel, FixtureIds) {
    let (builder, ids) = customer_builder();
    let metamodel = builder.build().expect("customer fixture should build");

    (metamodel, ids)
}
