// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{
    stage_kind::StageKind, CacheKey, CacheManager, CacheValue, DistributedCache, GridContext,
    JobDispatcher, JobResult, PipelineError, RingPartitioner, ScanReducer, ScanScheduler,
    ScanStage, SchedulingError, StageCache, StorageReader, TransformStage, TransformationRunner,
    Transformer,
};
use tracing::{info, warn};

/// Final cache of a pipeline run and the number of entries each stage
/// processed. The cache now belongs to the caller.
#[derive(Debug, Clone)]
pub struct PipelineOutput<C> {
    pub cache: C,
    pub scanned: u64,
    pub mapped: Option<u64>,
    pub reduced: Option<u64>,
}

/// Chains scan, map and reduce stages and owns the ephemeral caches between
/// them.
///
/// Every stage writes into a fresh `job-<stage>-<run id>` cache. An
/// intermediate cache is destroyed as soon as the stage reading it is done,
/// and on every error path. A failed run always returns a
/// [`PipelineError`] and leaves no cache behind.
pub struct PipelineOrchestrator<D: JobDispatcher, M: CacheManager> {
    context: GridContext<D, M>,
}

impl<D: JobDispatcher, M: CacheManager> PipelineOrchestrator<D, M> {
    pub fn new(context: GridContext<D, M>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &GridContext<D, M> {
        &self.context
    }

    /// Runs the scan stage only.
    pub async fn scan<S, F>(
        &self,
        scan: &ScanStage<S, F>,
    ) -> Result<PipelineOutput<M::Cache<F::OutKey, F::OutValue>>, PipelineError>
    where
        S: StorageReader,
        F: ScanReducer<Record = S::Record>,
    {
        let run_id = self.context.random.run_id();
        info!(run = %run_id, keyspace = %scan.keyspace, "pipeline started (scan)");

        let scan_cache = self.stage_cache::<F::OutKey, F::OutValue>(StageKind::Scan, &run_id)?;
        let scanned = self.run_scan(&run_id, scan, scan_cache.cache()).await?;

        info!(run = %run_id, scanned = scanned.total, "pipeline finished");
        Ok(PipelineOutput {
            cache: scan_cache.release(),
            scanned: scanned.total,
            mapped: None,
            reduced: None,
        })
    }

    /// Runs the scan stage followed by a map stage.
    pub async fn scan_map<S, F, T>(
        &self,
        scan: &ScanStage<S, F>,
        map: &TransformStage<T>,
    ) -> Result<PipelineOutput<M::Cache<T::OutKey, T::OutValue>>, PipelineError>
    where
        S: StorageReader,
        F: ScanReducer<Record = S::Record>,
        T: Transformer<InKey = F::OutKey, InValue = F::OutValue>,
    {
        let run_id = self.context.random.run_id();
        info!(run = %run_id, keyspace = %scan.keyspace, "pipeline started (scan, map)");

        let scan_cache = self.stage_cache::<F::OutKey, F::OutValue>(StageKind::Scan, &run_id)?;
        let scanned = self.run_scan(&run_id, scan, scan_cache.cache()).await?;

        let map_cache = self.stage_cache::<T::OutKey, T::OutValue>(StageKind::Map, &run_id)?;
        let mapped = self
            .run_transform(&run_id, StageKind::Map, scan_cache.cache(), map_cache.cache(), map)
            .await?;
        drop(scan_cache);

        info!(run = %run_id, scanned = scanned.total, mapped = mapped.total, "pipeline finished");
        Ok(PipelineOutput {
            cache: map_cache.release(),
            scanned: scanned.total,
            mapped: Some(mapped.total),
            reduced: None,
        })
    }

    /// Runs the full scan, map and reduce pipeline.
    pub async fn scan_map_reduce<S, F, T, R>(
        &self,
        scan: &ScanStage<S, F>,
        map: &TransformStage<T>,
        reduce: &TransformStage<R>,
    ) -> Result<PipelineOutput<M::Cache<R::OutKey, R::OutValue>>, PipelineError>
    where
        S: StorageReader,
        F: ScanReducer<Record = S::Record>,
        T: Transformer<InKey = F::OutKey, InValue = F::OutValue>,
        R: Transformer<InKey = T::OutKey, InValue = T::OutValue>,
    {
        let run_id = self.context.random.run_id();
        info!(run = %run_id, keyspace = %scan.keyspace, "pipeline started (scan, map, reduce)");

        let scan_cache = self.stage_cache::<F::OutKey, F::OutValue>(StageKind::Scan, &run_id)?;
        let scanned = self.run_scan(&run_id, scan, scan_cache.cache()).await?;

        let map_cache = self.stage_cache::<T::OutKey, T::OutValue>(StageKind::Map, &run_id)?;
        let mapped = self
            .run_transform(&run_id, StageKind::Map, scan_cache.cache(), map_cache.cache(), map)
            .await?;
        drop(scan_cache);

        let reduce_cache = self.stage_cache::<R::OutKey, R::OutValue>(StageKind::Reduce, &run_id)?;
        let reduced = self
            .run_transform(
                &run_id,
                StageKind::Reduce,
                map_cache.cache(),
                reduce_cache.cache(),
                reduce,
            )
            .await?;
        drop(map_cache);

        info!(
            run = %run_id,
            scanned = scanned.total,
            mapped = mapped.total,
            reduced = reduced.total,
            "pipeline finished"
        );
        Ok(PipelineOutput {
            cache: reduce_cache.release(),
            scanned: scanned.total,
            mapped: Some(mapped.total),
            reduced: Some(reduced.total),
        })
    }

    async fn run_scan<S, F, C>(
        &self,
        run_id: &str,
        stage: &ScanStage<S, F>,
        output: &C,
    ) -> Result<JobResult, PipelineError>
    where
        S: StorageReader,
        F: ScanReducer<Record = S::Record>,
        C: DistributedCache<F::OutKey, F::OutValue>,
    {
        let scheduling = |source: SchedulingError| {
            warn!(run = %run_id, error = %source, "scan scheduling failed");
            PipelineError::Scheduling {
                stage: StageKind::Scan,
                source,
            }
        };

        let ranges = RingPartitioner::split_for(
            self.context.topology.as_ref(),
            &stage.keyspace,
            self.context.config.vnodes_per_member,
        )
        .map_err(scheduling)?;
        let scheduler =
            ScanScheduler::new(self.context.topology.clone(), self.context.random.clone());
        let assignments = scheduler
            .assignments(&ranges, &self.context.membership.nodes(), &stage.keyspace)
            .map_err(scheduling)?;

        info!(run = %run_id, ranges = assignments.len(), "scan stage started");
        let jobs = assignments
            .into_iter()
            .map(|assignment| {
                let job = stage.job(assignment.range, output.clone());
                (assignment.node, job)
            })
            .collect();

        let results = self
            .context
            .dispatcher
            .execute(jobs)
            .await
            .map_err(|source| {
                warn!(run = %run_id, error = %source, "scan stage failed");
                PipelineError::Stage {
                    stage: StageKind::Scan,
                    source,
                }
            })?;
        Ok(JobResult::sum(&results))
    }

    async fn run_transform<T, CI, CO>(
        &self,
        run_id: &str,
        kind: StageKind,
        input: &CI,
        output: &CO,
        stage: &TransformStage<T>,
    ) -> Result<JobResult, PipelineError>
    where
        T: Transformer,
        CI: DistributedCache<T::InKey, T::InValue>,
        CO: DistributedCache<T::OutKey, T::OutValue>,
    {
        info!(run = %run_id, stage = %kind, input = input.name(), "transform stage started");
        let runner = TransformationRunner::new(
            self.context.dispatcher.clone(),
            self.context.membership.clone(),
            self.context.config.progress_interval,
        );
        runner
            .run(kind, input, output, stage)
            .await
            .map_err(|source| {
                warn!(run = %run_id, stage = %kind, error = %source, "transform stage failed");
                PipelineError::Stage { stage: kind, source }
            })
    }

    fn stage_cache<K: CacheKey, V: CacheValue>(
        &self,
        kind: StageKind,
        run_id: &str,
    ) -> Result<StageCache<M, K, V>, PipelineError> {
        StageCache::create(
            self.context.caches.clone(),
            kind,
            run_id,
            &self.context.config.cache,
        )
        .map_err(|source| PipelineError::Cache { stage: kind, source })
    }
}
