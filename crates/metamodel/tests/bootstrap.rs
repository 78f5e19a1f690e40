use metamodel::{
    bootstrap,
    core::obs::{metrics_report, metrics_reset_all},
    error::{ErrorKind, ErrorOrigin},
    prelude::*,
    resolve,
};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn shop_builder(config: Config) -> MetamodelBuilder {
    let mut builder = MetamodelBuilder::with_config(config);

    let line = builder.add_embeddable("LineItem", "shop::LineItem");
    let product = builder.add_entity("Product", "shop::Product");
    let order = builder.add_entity("Order", "shop::Order");

    builder
        .add_attribute(SingularAttributeBuilder::new(line, "quantity", BasicKind::Uint32))
        .add_attribute(SingularAttributeBuilder::new(line, "product", product))
        .add_attribute(SingularAttributeBuilder::new(product, "id", BasicKind::Ulid).id())
        .add_attribute(SingularAttributeBuilder::new(product, "price", BasicKind::Decimal))
        .add_attribute(SingularAttributeBuilder::new(order, "id", BasicKind::Ulid).id())
        .add_plural_attribute(PluralAttribute::builder(
            order,
            "lines",
            line,
            TypeDescriptor::new("Vec<shop::LineItem>"),
            CollectionClassification::List,
        ))
        .add_plural_attribute(
            PluralAttribute::builder(
                order,
                "related",
                product,
                TypeDescriptor::new("Vec<shop::Product>"),
                CollectionClassification::Bag,
            )
            .attribute_type(PersistentAttributeType::ManyToMany),
        );

    builder
}

#[test]
fn metamodel_is_shareable_across_threads() {
    init_tracing();
    let metamodel = Arc::new(bootstrap(shop_builder(Config::default())).expect("bootstrap"));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let metamodel = Arc::clone(&metamodel);
            std::thread::spawn(move || {
                resolve(&metamodel, "Order.lines.product.price")
                    .map(|path| path.navigable_path().fingerprint())
            })
        })
        .collect();

    let fingerprints: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread").expect("resolve"))
        .collect();
    assert!(fingerprints.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn plural_descriptors_are_classified() {
    init_tracing();
    let metamodel = bootstrap(shop_builder(Config::default())).expect("bootstrap");
    let order = metamodel.entity("Order").expect("order entity");

    let lines = order
        .declared_attribute("lines")
        .and_then(PersistentAttribute::as_plural)
        .expect("lines");
    assert_eq!(lines.element_kind(), ElementKind::Embedded);
    assert_eq!(lines.collection_type(), CollectionType::List);
    assert!(!lines.is_association());
    assert!(lines.key_graph_type().is_none());

    let related = order
        .declared_attribute("related")
        .and_then(PersistentAttribute::as_plural)
        .expect("related");
    assert_eq!(related.element_kind(), ElementKind::Entity);
    assert!(related.is_association());
    assert!(related.is_collection());
}

#[test]
fn config_limits_apply_to_resolution() {
    init_tracing();
    let config = Config::from_toml_str(
        r"
        [paths]
        max_depth = 2
        ",
    )
    .expect("config");
    let metamodel = bootstrap(shop_builder(config)).expect("bootstrap");

    assert!(resolve(&metamodel, "Order.lines").is_ok());

    let err = resolve(&metamodel, "Order.lines.quantity").expect_err("too deep");
    assert_eq!(err.kind, ErrorKind::Unsupported);
    assert_eq!(err.origin, ErrorOrigin::Path);
}

#[test]
fn public_errors_carry_kind_and_origin() {
    init_tracing();
    let metamodel = bootstrap(shop_builder(Config::default())).expect("bootstrap");

    let err = resolve(&metamodel, "Order.lines.colour").expect_err("unknown part");
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.origin, ErrorOrigin::Path);

    let mut builder = shop_builder(Config::default());
    let base = builder.add_mapped_superclass("Base", "shop::Base");
    let order = ManagedTypeId::new(2);
    builder.add_plural_attribute(PluralAttribute::builder(
        order,
        "bases",
        base,
        TypeDescriptor::new("Vec<shop::Base>"),
        CollectionClassification::Bag,
    ));

    let err = bootstrap(builder).expect_err("mapped superclass element");
    assert_eq!(err.kind, ErrorKind::Invalid);
    assert_eq!(err.origin, ErrorOrigin::Bootstrap);
    assert!(err.message.contains("Order.bases"));
}

#[test]
fn bootstrap_and_paths_are_counted() {
    init_tracing();
    metrics_reset_all();

    let metamodel = bootstrap(shop_builder(Config::default())).expect("bootstrap");
    resolve(&metamodel, "Order.related.price").expect("resolve");

    let report = metrics_report();
    let counters = report.counters.expect("counters");
    assert_eq!(counters.ops.bootstrap_runs, 1);
    assert_eq!(counters.ops.plural_attributes_built, 2);
    assert_eq!(counters.ops.paths_created, 2);
    assert_eq!(counters.ops.plural_paths_created, 1);
    assert_eq!(counters.last_managed_types, 3);
    assert!((report.association_ratio - 0.5).abs() < f64::EPSILON);
}

#[test]
fn invalid_config_is_rejected() {
    let err = Config::from_toml_str("[paths]\nmax_depth = 0\n").expect_err("zero depth");

    let err = metamodel::Error::from(err);
    assert_eq!(err.origin, ErrorOrigin::Config);
}
