//! Read-only access to template trees and manifest fragments

use super::manifest::ManifestFragment;
use crate::error::{Error, Result, TemplateKind};
use std::collections::{BTreeMap, HashMap};

/// A resolved template tree: relative file path -> file contents
///
/// Paths always use `/` separators regardless of platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateTree {
    pub id: String,
    pub files: BTreeMap<String, Vec<u8>>,
}

impl TemplateTree {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.to_string(), content.into());
        self
    }
}

/// Provider of named template trees and manifest fragments
///
/// Implementations never mutate their contents; any caching they do is
/// internal and safe under shared references.
#[allow(async_fn_in_trait)]
pub trait TemplateStore {
    async fn resolve_tree(&self, id: &str) -> Result<TemplateTree>;

    async fn resolve_fragment(&self, id: &str) -> Result<ManifestFragment>;
}

/// In-memory store, handy for embedding templates and for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    trees: HashMap<String, TemplateTree>,
    fragments: HashMap<String, ManifestFragment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tree(mut self, tree: TemplateTree) -> Self {
        self.trees.insert(tree.id.clone(), tree);
        self
    }

    pub fn with_fragment(mut self, id: &str, fragment: ManifestFragment) -> Self {
        self.fragments.insert(id.to_string(), fragment);
        self
    }
}

impl TemplateStore for MemoryStore {
    async fn resolve_tree(&self, id: &str) -> Result<TemplateTree> {
        self.trees
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(TemplateKind::Tree, id))
    }

    async fn resolve_fragment(&self, id: &str) -> Result<ManifestFragment> {
        self.fragments
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(TemplateKind::Fragment, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_resolves_and_reports_missing() {
        let store = MemoryStore::new()
            .with_tree(TemplateTree::new("remix").with_file("app/root.tsx", "export {}"))
            .with_fragment("lucia", ManifestFragment::default().with_dependency("lucia", "^3.2.0"));

        let tree = store.resolve_tree("remix").await.unwrap();
        assert_eq!(tree.files["app/root.tsx"], b"export {}".to_vec());
        assert_eq!(
            store.resolve_fragment("lucia").await.unwrap().dependencies["lucia"],
            "^3.2.0"
        );

        assert!(matches!(
            store.resolve_tree("next-tailwind").await,
            Err(Error::TemplateNotFound {
                kind: TemplateKind::Tree,
                ..
            })
        ));
        assert!(matches!(
            store.resolve_fragment("drizzle").await,
            Err(Error::TemplateNotFound {
                kind: TemplateKind::Fragment,
                ..
            })
        ));
    }
}
