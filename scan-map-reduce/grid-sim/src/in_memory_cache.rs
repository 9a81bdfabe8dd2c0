// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use scan_map_reduce_core::{
    CacheConfig, CacheError, CacheKey, CacheManager, CacheValue, Combiner, DistributedCache,
    GridMembership, NodeId,
};
use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hasher;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Type-erased view of a cache store, kept by the manager.
trait ErasedStore: Send + Sync {
    fn mark_destroyed(&self);
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// One cache segment split into partitions, each with a primary node.
///
/// A partition's mutex serializes every invoke on its keys, which gives
/// per-key atomicity for combiners. Primaries are assigned at creation; a
/// partition whose primary has left the grid is rehosted on a live server.
struct CacheStore<K, V> {
    name: String,
    partitions: Vec<Mutex<HashMap<K, V>>>,
    primaries: Vec<NodeId>,
    membership: Arc<dyn GridMembership>,
    len: AtomicUsize,
    max_entries: Option<usize>,
    destroyed: AtomicBool,
}

impl<K: CacheKey, V: CacheValue> CacheStore<K, V> {
    fn new(
        name: &str,
        config: &CacheConfig,
        servers: &[NodeId],
        membership: Arc<dyn GridMembership>,
    ) -> Self {
        let count = config.partitions.max(1);
        Self {
            name: name.to_string(),
            partitions: (0..count).map(|_| Mutex::new(HashMap::new())).collect(),
            primaries: (0..count).map(|p| servers[p % servers.len()]).collect(),
            membership,
            len: AtomicUsize::new(0),
            max_entries: config.max_entries,
            destroyed: AtomicBool::new(false),
        }
    }

    fn check_alive(&self) -> Result<(), CacheError> {
        if self.destroyed.load(Ordering::SeqCst) {
            Err(CacheError::Destroyed(self.name.clone()))
        } else {
            Ok(())
        }
    }

    fn partition_of(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.partitions.len() as u64) as usize
    }

    /// Sorted ids of the server nodes currently in the grid.
    fn live_servers(&self) -> Vec<NodeId> {
        let mut servers: Vec<NodeId> = self
            .membership
            .server_nodes()
            .iter()
            .map(|node| node.id)
            .collect();
        servers.sort_unstable();
        servers.dedup();
        servers
    }

    /// Node currently hosting `partition`, or `None` when no server is left.
    fn host_of(&self, partition: usize, live: &[NodeId]) -> Option<NodeId> {
        let primary = self.primaries[partition];
        if live.binary_search(&primary).is_ok() {
            Some(primary)
        } else if live.is_empty() {
            None
        } else {
            Some(live[partition % live.len()])
        }
    }

    fn lock(&self, partition: usize) -> MutexGuard<'_, HashMap<K, V>> {
        self.partitions[partition]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn reserve_slot(&self) -> Result<(), CacheError> {
        match self.max_entries {
            Some(max_entries) => self
                .len
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |len| {
                    (len < max_entries).then_some(len + 1)
                })
                .map(|_| ())
                .map_err(|_| CacheError::CapacityExceeded {
                    name: self.name.clone(),
                    max_entries,
                }),
            None => {
                self.len.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }
}

impl<K: CacheKey, V: CacheValue> ErasedStore for CacheStore<K, V> {
    fn mark_destroyed(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Handle to a cache of the simulated grid.
pub struct InMemoryCache<K, V> {
    store: Arc<CacheStore<K, V>>,
}

impl<K, V> Clone for InMemoryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<K, V> fmt::Debug for InMemoryCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCache")
            .field("name", &self.store.name)
            .field("partitions", &self.store.partitions.len())
            .finish()
    }
}

impl<K: CacheKey, V: CacheValue> InMemoryCache<K, V> {
    /// Node hosting the primary copy of `key`, resolved against the current
    /// membership. The assigned primary is returned when no server is left.
    pub fn primary_of(&self, key: &K) -> NodeId {
        let partition = self.store.partition_of(key);
        self.store
            .host_of(partition, &self.store.live_servers())
            .unwrap_or(self.store.primaries[partition])
    }

    pub fn partition_count(&self) -> usize {
        self.store.partitions.len()
    }
}

impl<K: CacheKey, V: CacheValue> DistributedCache<K, V> for InMemoryCache<K, V> {
    fn name(&self) -> &str {
        &self.store.name
    }

    fn local_entries(&self, node: NodeId) -> Result<Vec<(K, V)>, CacheError> {
        self.store.check_alive()?;
        let live = self.store.live_servers();
        let mut entries = Vec::new();
        for partition in 0..self.store.partitions.len() {
            if self.store.host_of(partition, &live) == Some(node) {
                let map = self.store.lock(partition);
                entries.extend(map.iter().map(|(key, value)| (key.clone(), value.clone())));
            }
        }
        Ok(entries)
    }

    fn invoke(
        &self,
        key: K,
        incoming: V,
        combiner: &dyn Combiner<V>,
    ) -> Result<Option<V>, CacheError> {
        self.store.check_alive()?;
        let mut map = self.store.lock(self.store.partition_of(&key));

        let is_new = !map.contains_key(&key);
        if is_new {
            self.store.reserve_slot()?;
        }
        let merged = match combiner.merge(map.get(&key), incoming) {
            Ok(merged) => merged,
            Err(e) => {
                if is_new {
                    self.store.len.fetch_sub(1, Ordering::SeqCst);
                }
                return Err(e.into());
            }
        };
        Ok(map.insert(key, merged))
    }

    fn get(&self, key: &K) -> Result<Option<V>, CacheError> {
        self.store.check_alive()?;
        Ok(self.store.lock(self.store.partition_of(key)).get(key).cloned())
    }

    fn entries(&self) -> Result<Vec<(K, V)>, CacheError> {
        self.store.check_alive()?;
        let mut entries = Vec::with_capacity(self.store.len.load(Ordering::SeqCst));
        for partition in 0..self.store.partitions.len() {
            let map = self.store.lock(partition);
            entries.extend(map.iter().map(|(key, value)| (key.clone(), value.clone())));
        }
        Ok(entries)
    }

    fn len(&self) -> Result<usize, CacheError> {
        self.store.check_alive()?;
        Ok(self.store.len.load(Ordering::SeqCst))
    }
}

/// Creates and destroys named caches whose partitions are spread over the
/// grid's server nodes.
pub struct InMemoryCacheManager {
    membership: Arc<dyn GridMembership>,
    caches: Mutex<HashMap<String, Arc<dyn ErasedStore>>>,
}

impl InMemoryCacheManager {
    pub fn new(membership: Arc<dyn GridMembership>) -> Self {
        Self {
            membership,
            caches: Mutex::new(HashMap::new()),
        }
    }

    fn caches(&self) -> MutexGuard<'_, HashMap<String, Arc<dyn ErasedStore>>> {
        self.caches.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CacheManager for InMemoryCacheManager {
    type Cache<K: CacheKey, V: CacheValue> = InMemoryCache<K, V>;

    fn get_or_create<K: CacheKey, V: CacheValue>(
        &self,
        name: &str,
        config: &CacheConfig,
    ) -> Result<InMemoryCache<K, V>, CacheError> {
        let mut caches = self.caches();
        if let Some(existing) = caches.get(name) {
            let store = existing
                .clone()
                .into_any()
                .downcast::<CacheStore<K, V>>()
                .map_err(|_| CacheError::TypeMismatch(name.to_string()))?;
            return Ok(InMemoryCache { store });
        }

        let mut servers: Vec<NodeId> = self
            .membership
            .server_nodes()
            .iter()
            .map(|node| node.id)
            .collect();
        if servers.is_empty() {
            return Err(CacheError::NoAffinityNodes {
                name: name.to_string(),
            });
        }
        servers.sort_unstable();
        servers.dedup();

        let store = Arc::new(CacheStore::<K, V>::new(
            name,
            config,
            &servers,
            self.membership.clone(),
        ));
        caches.insert(name.to_string(), store.clone());
        debug!(
            cache = name,
            partitions = store.partitions.len(),
            nodes = servers.len(),
            "cache created"
        );
        Ok(InMemoryCache { store })
    }

    fn destroy(&self, name: &str) -> Result<(), CacheError> {
        match self.caches().remove(name) {
            Some(store) => {
                store.mark_destroyed();
                debug!(cache = name, "cache destroyed");
                Ok(())
            }
            None => Err(CacheError::NotFound(name.to_string())),
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.caches().contains_key(name)
    }

    fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches().keys().cloned().collect();
        names.sort();
        names
    }
}
