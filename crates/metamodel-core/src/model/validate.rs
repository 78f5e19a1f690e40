//! Schema-wide metamodel validation, run once when the metamodel is frozen.

use crate::{
    error::ErrorTree,
    model::{
        managed::{ManagedKind, ManagedType},
        registry::Metamodel,
        types::ElementKind,
    },
};

/// Run full validation in a staged, deterministic order.
pub(crate) fn validate_metamodel(metamodel: &Metamodel) -> Result<(), ErrorTree> {
    let max_len = metamodel.config().bootstrap.max_name_len;
    let mut errs = ErrorTree::new();

    // Phase 1: local naming rules.
    for ty in metamodel.managed_types() {
        if let Err(msg) = validate_name(ty.name(), max_len) {
            err!(errs, "managed type '{}': {msg}", ty.name());
        }
        for attr in ty.declared_attributes() {
            if let Err(msg) = validate_name(attr.name(), max_len) {
                err!(errs, "attribute '{}.{}': {msg}", ty.name(), attr.name());
            }
        }
    }

    // Phase 2: hierarchy-wide rules.
    for ty in metamodel.managed_types() {
        validate_inheritance(metamodel, ty, &mut errs);
        validate_identifier(metamodel, ty, &mut errs);
    }

    errs.result()
}

/// Ensure a name is a non-empty ASCII identifier within the length limit.
fn validate_name(name: &str, max_len: usize) -> Result<(), String> {
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    if name.len() > max_len {
        return Err(format!("name exceeds max length {max_len}"));
    }

    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("name must be an ASCII identifier".to_string());
    }

    Ok(())
}

// Declared attributes must not shadow inherited ones.
fn validate_inheritance(metamodel: &Metamodel, ty: &ManagedType, errs: &mut ErrorTree) {
    let Some(super_id) = ty.super_type() else {
        return;
    };

    for attr in ty.declared_attributes() {
        if let Some(inherited) = metamodel.find_attribute(super_id, attr.name()) {
            let owner = metamodel
                .get(inherited.attribute().declaring_type())
                .map_or("?", ManagedType::name);
            err!(
                errs,
                "attribute '{}.{}' shadows the attribute inherited from '{owner}'",
                ty.name(),
                attr.name()
            );
        }
    }
}

// Entities resolve exactly one identifier; embeddables declare none.
fn validate_identifier(metamodel: &Metamodel, ty: &ManagedType, errs: &mut ErrorTree) {
    let declared_ids = ty
        .declared_attributes()
        .iter()
        .filter(|attr| attr.is_id())
        .count();

    for attr in ty.declared_attributes().iter().filter(|attr| attr.is_id()) {
        if !matches!(attr.value_kind(), ElementKind::Basic | ElementKind::Embedded) {
            err!(
                errs,
                "identifier '{}.{}' must be basic or embedded, found {}",
                ty.name(),
                attr.name(),
                attr.value_kind()
            );
        }
    }

    match ty.kind() {
        ManagedKind::Embeddable => {
            if declared_ids > 0 {
                err!(errs, "embeddable '{}' cannot declare an identifier", ty.name());
            }
        }
        ManagedKind::MappedSuperclass { .. } => {
            if declared_ids > 1 {
                err!(errs, "'{}' declares {declared_ids} identifiers", ty.name());
            }
        }
        ManagedKind::Entity { .. } => {
            let visible = metamodel
                .attributes(ty.id())
                .into_iter()
                .filter(|attr| attr.is_id())
                .count();

            match visible {
                0 => err!(errs, "entity '{}' has no identifier", ty.name()),
                1 => {}
                n => err!(errs, "entity '{}' resolves {n} identifiers", ty.name()),
            }
        }
    }
}
