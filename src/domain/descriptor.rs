//! Interned item descriptors.
//!
//! Every item kind is described once. Items hold an `Arc<Descriptor>` handed
//! out by a [`DescriptorCache`], so thousands of items of the same kind share
//! one allocation.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::{debug, instrument};

/// Immutable metadata for an item kind.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Descriptor {
    key: String,
    display_name: String,
}

impl Descriptor {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

static GLOBAL: OnceLock<DescriptorCache> = OnceLock::new();

/// Keyed pool of shared descriptors.
///
/// Lookups of known keys only take the read lock. Construction of an unseen
/// key happens under the write lock, so concurrent callers racing on the same
/// key all observe the single instance that got stored. Entries are never
/// evicted; [`DescriptorCache::clear`] is the only way to drop them.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: RwLock<HashMap<String, Arc<Descriptor>>>,
    display_names: BTreeMap<String, String>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose descriptors take their display name from `display_names`.
    /// Keys without a mapping use the key itself.
    pub fn with_display_names(display_names: BTreeMap<String, String>) -> Self {
        Self {
            entries: RwLock::default(),
            display_names,
        }
    }

    /// Process-wide cache, created empty on first use and never cleared
    /// implicitly.
    pub fn global() -> &'static DescriptorCache {
        GLOBAL.get_or_init(DescriptorCache::new)
    }

    /// Returns the descriptor for `key`, constructing it on first request.
    #[instrument(level = "trace", skip(self))]
    pub fn get_or_create(&self, key: &str) -> Arc<Descriptor> {
        if let Some(existing) = self.get(key) {
            debug!(key, "descriptor reused");
            return existing;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have stored the key between our read and write lock.
        Arc::clone(entries.entry(key.to_string()).or_insert_with(|| {
            debug!(key, "descriptor created");
            Arc::new(Descriptor {
                key: key.to_string(),
                display_name: self
                    .display_names
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| key.to_string()),
            })
        }))
    }

    /// Looks up `key` without constructing anything.
    pub fn get(&self, key: &str) -> Option<Arc<Descriptor>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Drops every cached entry. Descriptors still held by items stay alive;
    /// later lookups construct fresh instances.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
