// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{grid_node::NodeId, CacheError, Combiner};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

pub trait CacheKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> CacheKey for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

pub trait CacheValue: Clone + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Clone + Send + Sync + 'static {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Number of partitions of the cache's affinity function
    pub partitions: usize,
    /// Capacity bound; inserting a new key into a full cache fails
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            partitions: 64,
            max_entries: None,
        }
    }
}

/// A named, partitioned key-value segment used as pipeline stage storage.
/// Handles are cheap to clone and all refer to the same segment.
pub trait DistributedCache<K: CacheKey, V: CacheValue>: Clone + Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Entries whose primary copy is hosted on `node`.
    fn local_entries(&self, node: NodeId) -> Result<Vec<(K, V)>, CacheError>;

    /// Atomically merges `incoming` into the entry at `key` through
    /// `combiner`, returning the previous value.
    ///
    /// Invocations on the same key are serialized; there is no atomicity
    /// across keys.
    fn invoke(&self, key: K, incoming: V, combiner: &dyn Combiner<V>)
        -> Result<Option<V>, CacheError>;

    fn get(&self, key: &K) -> Result<Option<V>, CacheError>;

    /// Every entry of the cache, regardless of where it is hosted.
    fn entries(&self) -> Result<Vec<(K, V)>, CacheError>;

    fn len(&self) -> Result<usize, CacheError>;

    fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }
}

/// Creates, looks up and destroys named caches on the grid.
pub trait CacheManager: Send + Sync + 'static {
    type Cache<K: CacheKey, V: CacheValue>: DistributedCache<K, V>;

    /// Returns the cache called `name`, creating it with `config` on first
    /// access.
    fn get_or_create<K: CacheKey, V: CacheValue>(
        &self,
        name: &str,
        config: &CacheConfig,
    ) -> Result<Self::Cache<K, V>, CacheError>;

    fn destroy(&self, name: &str) -> Result<(), CacheError>;

    fn exists(&self, name: &str) -> bool;

    fn cache_names(&self) -> Vec<String>;
}
