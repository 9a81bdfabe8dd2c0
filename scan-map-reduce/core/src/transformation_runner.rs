// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{
    grid_node::GridNode, stage_kind::StageKind, CacheEmitter, CacheKey, CacheValue, Combiner,
    DispatchError, DistributedCache, Emit, GridMembership, JobDispatcher, JobError, JobFactory,
    JobResult, NodeJob, ReplaceCombiner,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Map or reduce logic applied to every entry of a stage's input cache.
pub trait Transformer: Send + Sync + 'static {
    type InKey: CacheKey;
    type InValue: CacheValue;
    type OutKey: CacheKey;
    type OutValue: CacheValue;

    fn transform(
        &self,
        key: &Self::InKey,
        value: &Self::InValue,
        emitter: &mut dyn Emit<Self::OutKey, Self::OutValue>,
    ) -> Result<(), JobError>;
}

/// A map or reduce stage: the transform plus the combiner its output cache
/// merges emitted values with.
pub struct TransformStage<T: Transformer> {
    pub transformer: Arc<T>,
    pub combiner: Arc<dyn Combiner<T::OutValue>>,
}

impl<T: Transformer> TransformStage<T> {
    pub fn new(transformer: T) -> Self {
        Self {
            transformer: Arc::new(transformer),
            combiner: Arc::new(ReplaceCombiner),
        }
    }

    pub fn with_combiner(mut self, combiner: impl Combiner<T::OutValue> + 'static) -> Self {
        self.combiner = Arc::new(combiner);
        self
    }
}

/// The per-node half of a transformation: iterates the locally owned
/// entries of the input cache, one at a time, in iteration order.
pub struct TransformJob<T, CI, CO>
where
    T: Transformer,
{
    stage: StageKind,
    input: CI,
    output: CO,
    transformer: Arc<T>,
    combiner: Arc<dyn Combiner<T::OutValue>>,
    progress_interval: u64,
}

impl<T, CI, CO> NodeJob for TransformJob<T, CI, CO>
where
    T: Transformer,
    CI: DistributedCache<T::InKey, T::InValue>,
    CO: DistributedCache<T::OutKey, T::OutValue>,
{
    type Output = u64;

    fn execute(self, node: &GridNode) -> Result<u64, JobError> {
        let entries = self.input.local_entries(node.id)?;
        debug!(
            stage = %self.stage,
            node = node.id,
            input = self.input.name(),
            entries = entries.len(),
            "transform job started"
        );

        let mut emitter = CacheEmitter::new(&self.output, self.combiner.as_ref());
        let mut processed = 0u64;
        for (key, value) in entries {
            self.transformer.transform(&key, &value, &mut emitter)?;
            processed += 1;
            if self.progress_interval > 0 && processed % self.progress_interval == 0 {
                info!(stage = %self.stage, node = node.id, processed, "transform progress");
            }
        }

        debug!(
            stage = %self.stage,
            node = node.id,
            processed,
            emitted = emitter.emitted(),
            "transform job finished"
        );
        Ok(processed)
    }
}

/// Fans a transform out to every server node of the grid and sums the
/// number of entries each node processed.
pub struct TransformationRunner<D: JobDispatcher> {
    dispatcher: Arc<D>,
    membership: Arc<dyn GridMembership>,
    progress_interval: u64,
}

impl<D: JobDispatcher> TransformationRunner<D> {
    pub fn new(
        dispatcher: Arc<D>,
        membership: Arc<dyn GridMembership>,
        progress_interval: u64,
    ) -> Self {
        Self {
            dispatcher,
            membership,
            progress_interval,
        }
    }

    /// Runs `stage` over `input`, emitting into `output`.
    ///
    /// A failing entry aborts its node's job, and any failed node-job fails
    /// the whole run.
    pub async fn run<T, CI, CO>(
        &self,
        kind: StageKind,
        input: &CI,
        output: &CO,
        stage: &TransformStage<T>,
    ) -> Result<JobResult, DispatchError>
    where
        T: Transformer,
        CI: DistributedCache<T::InKey, T::InValue>,
        CO: DistributedCache<T::OutKey, T::OutValue>,
    {
        let nodes = self.membership.server_nodes();
        if nodes.is_empty() {
            return Err(DispatchError::NoNodes);
        }

        let factory = TransformJobFactory {
            stage: kind,
            input: input.clone(),
            output: output.clone(),
            transformer: stage.transformer.clone(),
            combiner: stage.combiner.clone(),
            progress_interval: self.progress_interval,
        };
        let results = self
            .dispatcher
            .run_on_each_node::<TransformJob<T, CI, CO>, _>(nodes, factory)
            .await?;
        Ok(JobResult::sum(&results))
    }
}

struct TransformJobFactory<T, CI, CO>
where
    T: Transformer,
{
    stage: StageKind,
    input: CI,
    output: CO,
    transformer: Arc<T>,
    combiner: Arc<dyn Combiner<T::OutValue>>,
    progress_interval: u64,
}

impl<T, CI, CO> JobFactory<TransformJob<T, CI, CO>> for TransformJobFactory<T, CI, CO>
where
    T: Transformer,
    CI: DistributedCache<T::InKey, T::InValue>,
    CO: DistributedCache<T::OutKey, T::OutValue>,
{
    fn create_job(&mut self, _node: &GridNode) -> TransformJob<T, CI, CO> {
        TransformJob {
            stage: self.stage,
            input: self.input.clone(),
            output: self.output.clone(),
            transformer: self.transformer.clone(),
            combiner: self.combiner.clone(),
            progress_interval: self.progress_interval,
        }
    }
}
