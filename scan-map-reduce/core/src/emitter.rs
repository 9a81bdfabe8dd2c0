// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{CacheError, CacheKey, CacheValue, Combiner, DistributedCache};
use std::marker::PhantomData;

/// Output side handed to scan, map and reduce logic.
pub trait Emit<K, V> {
    /// Merges `value` into the output at `key` and returns the value that was
    /// there before.
    fn emit(&mut self, key: K, value: V) -> Result<Option<V>, CacheError>;
}

/// Emits into a distributed cache through a combiner.
pub struct CacheEmitter<'a, C, K, V> {
    cache: &'a C,
    combiner: &'a dyn Combiner<V>,
    emitted: u64,
    _key: PhantomData<K>,
}

impl<'a, C, K, V> CacheEmitter<'a, C, K, V>
where
    C: DistributedCache<K, V>,
    K: CacheKey,
    V: CacheValue,
{
    pub fn new(cache: &'a C, combiner: &'a dyn Combiner<V>) -> Self {
        Self {
            cache,
            combiner,
            emitted: 0,
            _key: PhantomData,
        }
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl<C, K, V> Emit<K, V> for CacheEmitter<'_, C, K, V>
where
    C: DistributedCache<K, V>,
    K: CacheKey,
    V: CacheValue,
{
    fn emit(&mut self, key: K, value: V) -> Result<Option<V>, CacheError> {
        let previous = self.cache.invoke(key, value, self.combiner)?;
        self.emitted += 1;
        Ok(previous)
    }
}
