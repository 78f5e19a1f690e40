//! Navigable paths: the structural identity of a dotted access chain.
#![allow(clippy::cast_possible_truncation)]

use sha2::{Digest, Sha256};
use std::{fmt, sync::Arc};

///
/// NavigablePath
///
/// Immutable chain of path segments rooted at an entity. Equality, ordering
/// and hashing are structural, so equal chains are interchangeable as cache
/// keys. Parents are shared, appending is cheap.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NavigablePath {
    parent: Option<Arc<Self>>,
    local_name: String,
    alias: Option<String>,
    full_path: String,
}

impl NavigablePath {
    /// Root path for an entity.
    #[must_use]
    pub fn root(entity_name: impl Into<String>) -> Self {
        let local_name = entity_name.into();

        Self {
            parent: None,
            full_path: local_name.clone(),
            local_name,
            alias: None,
        }
    }

    /// Root path for an entity with a query alias.
    #[must_use]
    pub fn root_aliased(entity_name: impl Into<String>, alias: impl Into<String>) -> Self {
        let local_name = entity_name.into();
        let alias = alias.into();

        Self {
            parent: None,
            full_path: format!("{local_name}({alias})"),
            local_name,
            alias: Some(alias),
        }
    }

    /// Child path one segment below this one.
    #[must_use]
    pub fn append(&self, name: &str) -> Self {
        Self {
            parent: Some(Arc::new(self.clone())),
            local_name: name.to_string(),
            alias: None,
            full_path: format!("{}.{name}", self.full_path),
        }
    }

    /// Child path carrying an alias (explicit joins).
    #[must_use]
    pub fn append_aliased(&self, name: &str, alias: &str) -> Self {
        Self {
            parent: Some(Arc::new(self.clone())),
            local_name: name.to_string(),
            alias: Some(alias.to_string()),
            full_path: format!("{}.{name}({alias})", self.full_path),
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }

    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    #[must_use]
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Number of segments, the root counting as one.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// This path followed by its parents up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |path| path.parent())
    }

    /// Whether `other` is a direct child of this path.
    #[must_use]
    pub fn is_parent_of(&self, other: &Self) -> bool {
        other.parent().is_some_and(|parent| parent == self)
    }

    /// Whether this path is `other` or one of its ancestors.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.ancestors().any(|path| path == self)
    }

    /// Compute a stable fingerprint for this path.
    #[must_use]
    pub fn fingerprint(&self) -> PathFingerprint {
        let mut segments: Vec<&Self> = self.ancestors().collect();
        segments.reverse();

        let mut hasher = Sha256::new();
        hasher.update(b"navpath:v1");
        write_u32(&mut hasher, segments.len() as u32);
        for segment in segments {
            write_str(&mut hasher, &segment.local_name);
            match &segment.alias {
                Some(alias) => {
                    write_tag(&mut hasher, 0x01);
                    write_str(&mut hasher, alias);
                }
                None => write_tag(&mut hasher, 0x00),
            }
        }

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);

        PathFingerprint(out)
    }
}

impl fmt::Display for NavigablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path)
    }
}

///
/// PathFingerprint
///
/// Stable, deterministic fingerprint of a navigable path.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PathFingerprint([u8; 32]);

impl PathFingerprint {
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl fmt::Display for PathFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}

fn write_u32(hasher: &mut Sha256, value: u32) {
    hasher.update(value.to_be_bytes());
}

fn write_str(hasher: &mut Sha256, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn append_builds_dotted_full_path() {
        let path = NavigablePath::root("Customer")
            .append("orders")
            .append("total");

        assert_eq!(path.full_path(), "Customer.orders.total");
        assert_eq!(path.local_name(), "total");
        assert_eq!(path.depth(), 3);
        assert_eq!(
            path.parent().map(NavigablePath::full_path),
            Some("Customer.orders")
        );
    }

    #[test]
    fn aliases_are_part_of_identity() {
        let plain = NavigablePath::root("Customer").append("orders");
        let aliased = NavigablePath::root("Customer").append_aliased("orders", "o");

        assert_ne!(plain, aliased);
        assert_ne!(plain.fingerprint(), aliased.fingerprint());
        assert_eq!(aliased.full_path(), "Customer.orders(o)");
        assert_eq!(aliased.alias(), Some("o"));
    }

    #[test]
    fn parent_and_prefix_relations() {
        let root = NavigablePath::root("Customer");
        let orders = root.append("orders");
        let total = orders.append("total");

        assert!(root.is_parent_of(&orders));
        assert!(!root.is_parent_of(&total));
        assert!(root.is_prefix_of(&total));
        assert!(total.is_prefix_of(&total));
        assert!(!total.is_prefix_of(&orders));
    }

    #[test]
    fn segment_boundaries_affect_fingerprint() {
        // "a.bc" and "ab.c" must never collide.
        let left = NavigablePath::root("a").append("bc");
        let right = NavigablePath::root("ab").append("c");

        assert_ne!(left.fingerprint(), right.fingerprint());
    }

    #[test]
    fn fingerprint_renders_as_hex() {
        let fp = NavigablePath::root("Customer").fingerprint();

        assert_eq!(fp.as_hex().len(), 64);
        assert_eq!(fp.to_string(), fp.as_hex());
        assert!(fp.as_hex().starts_with(&format!("{:02x}", fp.as_bytes()[0])));
    }

    fn arb_segments() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-z][a-z0-9_]{0,6}", 1..6)
    }

    fn build(segments: &[String]) -> NavigablePath {
        let mut path = NavigablePath::root(segments[0].clone());
        for segment in &segments[1..] {
            path = path.append(segment);
        }
        path
    }

    proptest! {
        #[test]
        fn equal_chains_have_equal_identity(segments in arb_segments()) {
            let left = build(&segments);
            let right = build(&segments);

            prop_assert_eq!(&left, &right);
            prop_assert_eq!(left.fingerprint(), right.fingerprint());
            prop_assert_eq!(left.depth(), segments.len());
        }

        #[test]
        fn appending_extends_without_changing_the_parent(segments in arb_segments(), tail in "[a-z]{1,6}") {
            let parent = build(&segments);
            let child = parent.append(&tail);

            prop_assert!(parent.is_parent_of(&child));
            prop_assert_eq!(child.parent(), Some(&parent));
            prop_assert_ne!(child.fingerprint(), parent.fingerprint());
        }
    }
}
