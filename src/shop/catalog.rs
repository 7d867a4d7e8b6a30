//! Item identifier lookup used when parsing shop signs.

use std::collections::HashSet;

/// Answer from a [`Catalog`] lookup. `Empty` is the null item, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEntry {
    Item(String),
    Empty,
}

/// Read-only item registry owned by the host.
pub trait Catalog: Send + Sync {
    fn resolve(&self, identifier: &str) -> CatalogEntry;
}

/// Fixed list of known identifiers.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    items: HashSet<String>,
}

impl StaticCatalog {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Catalog for StaticCatalog {
    fn resolve(&self, identifier: &str) -> CatalogEntry {
        if identifier.ends_with(":air") || !self.items.contains(identifier) {
            return CatalogEntry::Empty;
        }
        CatalogEntry::Item(identifier.to_string())
    }
}

/// `namespace:path` where the namespace is `[a-z0-9_.-]+` and the path is `[a-z0-9_./-]+`.
pub fn is_valid_identifier(identifier: &str) -> bool {
    let Some((namespace, path)) = identifier.split_once(':') else {
        return false;
    };
    let namespace_ok = !namespace.is_empty()
        && namespace
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'-'));
    let path_ok = !path.is_empty()
        && path
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'/' | b'-'));
    namespace_ok && path_ok
}
