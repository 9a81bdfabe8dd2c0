// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{
    stage_kind::StageKind, CacheConfig, CacheError, CacheKey, CacheManager, CacheValue,
    DistributedCache,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Output cache of one pipeline stage, destroyed when dropped.
///
/// The cache is owned by exactly one stage at a time. [`StageCache::release`]
/// hands it to the caller, after which it is no longer destroyed.
pub struct StageCache<M, K, V>
where
    M: CacheManager,
    K: CacheKey,
    V: CacheValue,
{
    manager: Arc<M>,
    stage: StageKind,
    cache: M::Cache<K, V>,
    released: bool,
}

impl<M, K, V> StageCache<M, K, V>
where
    M: CacheManager,
    K: CacheKey,
    V: CacheValue,
{
    pub fn create(
        manager: Arc<M>,
        stage: StageKind,
        run_id: &str,
        config: &CacheConfig,
    ) -> Result<Self, CacheError> {
        let name = stage.cache_name(run_id);
        let cache = manager.get_or_create::<K, V>(&name, config)?;
        debug!(stage = %stage, cache = %name, "stage cache created");
        Ok(Self {
            manager,
            stage,
            cache,
            released: false,
        })
    }

    pub fn cache(&self) -> &M::Cache<K, V> {
        &self.cache
    }

    pub fn stage(&self) -> StageKind {
        self.stage
    }

    /// Transfers ownership of the cache to the caller.
    pub fn release(mut self) -> M::Cache<K, V> {
        self.released = true;
        self.cache.clone()
    }
}

impl<M, K, V> Drop for StageCache<M, K, V>
where
    M: CacheManager,
    K: CacheKey,
    V: CacheValue,
{
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let name = self.cache.name();
        match self.manager.destroy(name) {
            Ok(()) => debug!(stage = %self.stage, cache = %name, "stage cache destroyed"),
            Err(e) => warn!(
                stage = %self.stage,
                cache = %name,
                error = %e,
                "failed to destroy stage cache"
            ),
        }
    }
}
