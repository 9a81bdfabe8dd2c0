// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{
    grid_node::GridNode, token_range::TokenRange, CacheEmitter, CacheKey, CacheValue, Combiner,
    DistributedCache, Emit, JobError, NodeJob, ReplaceCombiner, StorageReader,
};
use std::sync::Arc;
use tracing::debug;

/// Per-record logic of a scan stage.
pub trait ScanReducer: Send + Sync + 'static {
    type Record: Send + 'static;
    type OutKey: CacheKey;
    type OutValue: CacheValue;

    /// Handles one record read from storage. Returning `Ok(false)` stops the
    /// scan of the current range.
    fn reduce(
        &self,
        record: Self::Record,
        emitter: &mut dyn Emit<Self::OutKey, Self::OutValue>,
    ) -> Result<bool, JobError>;
}

/// What a pipeline's scan stage reads and how it writes its output.
pub struct ScanStage<S, F>
where
    S: StorageReader,
    F: ScanReducer<Record = S::Record>,
{
    pub keyspace: String,
    pub reader: Arc<S>,
    pub reducer: Arc<F>,
    pub combiner: Arc<dyn Combiner<F::OutValue>>,
}

impl<S, F> ScanStage<S, F>
where
    S: StorageReader,
    F: ScanReducer<Record = S::Record>,
{
    pub fn new(keyspace: impl Into<String>, reader: Arc<S>, reducer: F) -> Self {
        Self {
            keyspace: keyspace.into(),
            reader,
            reducer: Arc::new(reducer),
            combiner: Arc::new(ReplaceCombiner),
        }
    }

    pub fn with_combiner(mut self, combiner: impl Combiner<F::OutValue> + 'static) -> Self {
        self.combiner = Arc::new(combiner);
        self
    }

    pub(crate) fn job<C>(&self, range: TokenRange, output: C) -> ScanJob<S, F, C>
    where
        C: DistributedCache<F::OutKey, F::OutValue>,
    {
        ScanJob {
            range,
            reader: self.reader.clone(),
            reducer: self.reducer.clone(),
            combiner: self.combiner.clone(),
            output,
        }
    }
}

/// Reads one token range and streams its records to the scan reducer.
pub struct ScanJob<S, F, C>
where
    S: StorageReader,
    F: ScanReducer<Record = S::Record>,
{
    range: TokenRange,
    reader: Arc<S>,
    reducer: Arc<F>,
    combiner: Arc<dyn Combiner<F::OutValue>>,
    output: C,
}

impl<S, F, C> ScanJob<S, F, C>
where
    S: StorageReader,
    F: ScanReducer<Record = S::Record>,
    C: DistributedCache<F::OutKey, F::OutValue>,
{
    pub fn new(
        range: TokenRange,
        reader: Arc<S>,
        reducer: Arc<F>,
        combiner: Arc<dyn Combiner<F::OutValue>>,
        output: C,
    ) -> Self {
        Self {
            range,
            reader,
            reducer,
            combiner,
            output,
        }
    }

    pub fn range(&self) -> &TokenRange {
        &self.range
    }

    /// Scans the range and returns the number of records processed.
    ///
    /// A storage failure or a failing reducer fails the job; no partial
    /// count is returned.
    pub fn run(&self) -> Result<u64, JobError> {
        let mut emitter = CacheEmitter::new(&self.output, self.combiner.as_ref());
        let mut processed = 0u64;
        let mut failure = None;

        self.reader.scan(&self.range, &mut |record| {
            processed += 1;
            match self.reducer.reduce(record, &mut emitter) {
                Ok(keep_going) => keep_going,
                Err(e) => {
                    failure = Some(e);
                    false
                }
            }
        })?;

        match failure {
            Some(e) => Err(e),
            None => Ok(processed),
        }
    }
}

impl<S, F, C> NodeJob for ScanJob<S, F, C>
where
    S: StorageReader,
    F: ScanReducer<Record = S::Record>,
    C: DistributedCache<F::OutKey, F::OutValue>,
{
    type Output = u64;

    fn execute(self, node: &GridNode) -> Result<u64, JobError> {
        debug!(node = node.id, range = %self.range, "scan job started");
        let processed = self.run()?;
        debug!(node = node.id, range = %self.range, processed, "scan job finished");
        Ok(processed)
    }
}
