// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::token_hash::token_for;
use scan_map_reduce_core::{StorageError, StorageReader, Token, TokenRange};
use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hash;
use std::ops::Bound;
use std::sync::{PoisonError, RwLock};

/// Simulated storage tier: records ordered by token.
pub struct InMemoryStorage<R> {
    rows: RwLock<BTreeMap<Token, Vec<R>>>,
    failing_tokens: RwLock<BTreeSet<Token>>,
}

impl<R> InMemoryStorage<R>
where
    R: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            failing_tokens: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn insert(&self, token: Token, record: R) {
        self.rows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(token)
            .or_default()
            .push(record);
    }

    /// Inserts a record under the token of its partition key.
    pub fn insert_keyed<K: Hash + ?Sized>(&self, key: &K, record: R) -> Token {
        let token = token_for(key);
        self.insert(token, record);
        token
    }

    pub fn len(&self) -> usize {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records stored under tokens of `range`.
    pub fn count_in(&self, range: &TokenRange) -> usize {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(token, _)| range.contains(**token))
            .map(|(_, records)| records.len())
            .sum()
    }

    /// Makes every scan of a range containing `token` fail.
    pub fn fail_scans_containing(&self, token: Token) {
        self.failing_tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token);
    }
}

impl<R> Default for InMemoryStorage<R>
where
    R: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R> StorageReader for InMemoryStorage<R>
where
    R: Clone + Send + Sync + 'static,
{
    type Record = R;

    fn scan(
        &self,
        range: &TokenRange,
        on_record: &mut dyn FnMut(R) -> bool,
    ) -> Result<u64, StorageError> {
        let failing = self
            .failing_tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|token| range.contains(*token));
        if failing {
            return Err(StorageError::Unavailable(format!("replicas of {} did not respond", range)));
        }
        if range.is_empty() {
            return Ok(0);
        }

        let lower = if range.is_start_inclusive() {
            Bound::Included(range.start())
        } else {
            Bound::Excluded(range.start())
        };
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);

        let mut delivered = 0u64;
        for records in rows
            .range((lower, Bound::Included(range.end())))
            .map(|(_, records)| records)
        {
            for record in records {
                delivered += 1;
                if !on_record(record.clone()) {
                    return Ok(delivered);
                }
            }
        }
        Ok(delivered)
    }
}
