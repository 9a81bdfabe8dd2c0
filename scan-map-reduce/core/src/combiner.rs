// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::CombineError;
use std::collections::BTreeSet;
use std::ops::Add;

/// Per-key merge strategy, invoked atomically by the cache for every emitted
/// value.
///
/// Concurrent emits to one key arrive in no particular order, so only
/// commutative and associative combiners give a deterministic final value.
pub trait Combiner<V>: Send + Sync {
    /// Returns the value to store given the current one (if any) and the
    /// incoming one.
    fn merge(&self, existing: Option<&V>, incoming: V) -> Result<V, CombineError>;
}

impl<V, F> Combiner<V> for F
where
    F: Fn(Option<&V>, V) -> Result<V, CombineError> + Send + Sync,
{
    fn merge(&self, existing: Option<&V>, incoming: V) -> Result<V, CombineError> {
        (self)(existing, incoming)
    }
}

/// Unconditional replace: the incoming value wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceCombiner;

impl<V> Combiner<V> for ReplaceCombiner {
    fn merge(&self, _existing: Option<&V>, incoming: V) -> Result<V, CombineError> {
        Ok(incoming)
    }
}

/// Adds the incoming value to the existing one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumCombiner;

impl<V> Combiner<V> for SumCombiner
where
    V: Add<Output = V> + Clone,
{
    fn merge(&self, existing: Option<&V>, incoming: V) -> Result<V, CombineError> {
        Ok(match existing {
            Some(current) => current.clone() + incoming,
            None => incoming,
        })
    }
}

/// Set union of the existing and incoming sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnionCombiner;

impl<T> Combiner<BTreeSet<T>> for UnionCombiner
where
    T: Ord + Clone,
{
    fn merge(
        &self,
        existing: Option<&BTreeSet<T>>,
        incoming: BTreeSet<T>,
    ) -> Result<BTreeSet<T>, CombineError> {
        let mut merged = existing.cloned().unwrap_or_default();
        merged.extend(incoming);
        Ok(merged)
    }
}
