//! Host-owned catalog cache keyed by question.
//!
//! Catalogs are immutable once built; a rebuild swaps the `Arc` under one
//! write lock, so a reader holds either the old catalog or the new one.

use super::catalog::AlternateAnswerCatalog;
use crate::error::CatalogError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

#[derive(Debug)]
pub struct CatalogCache<K> {
    entries: RwLock<HashMap<K, Arc<AlternateAnswerCatalog>>>,
}

impl<K> Default for CatalogCache<K> {
    fn default() -> Self {
        CatalogCache { entries: RwLock::new(HashMap::new()) }
    }
}

impl<K: Eq + Hash> CatalogCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<Arc<AlternateAnswerCatalog>> {
        self.entries.read().get(key).cloned()
    }

    /// Cached catalog for `key`, building it on a miss.
    ///
    /// `build` runs without the lock held. When two callers race on the same
    /// key the first one stored wins and both get it.
    pub fn get_or_build<F>(&self, key: K, build: F) -> Result<Arc<AlternateAnswerCatalog>, CatalogError>
    where
        F: FnOnce() -> Result<AlternateAnswerCatalog, CatalogError>,
    {
        if let Some(found) = self.get(&key) {
            return Ok(found);
        }
        let built = Arc::new(build()?);
        let mut entries = self.entries.write();
        Ok(Arc::clone(entries.entry(key).or_insert(built)))
    }

    /// Store a freshly built catalog, returning the one it replaces.
    pub fn replace(&self, key: K, catalog: AlternateAnswerCatalog) -> Option<Arc<AlternateAnswerCatalog>> {
        self.entries.write().insert(key, Arc::new(catalog))
    }

    pub fn invalidate(&self, key: &K) -> Option<Arc<AlternateAnswerCatalog>> {
        self.entries.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
