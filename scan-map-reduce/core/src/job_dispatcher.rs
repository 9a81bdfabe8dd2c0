// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{
    grid_node::{GridNode, NodeId},
    DispatchError, JobError, JobFactory,
};
use async_trait::async_trait;

/// Unit of work run on one grid node.
pub trait NodeJob: Send + 'static {
    type Output: Send + 'static;

    fn execute(self, node: &GridNode) -> Result<Self::Output, JobError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeResult<T> {
    pub node: NodeId,
    pub output: T,
}

/// Aggregate count of a scatter-gather task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobResult {
    pub total: u64,
}

impl JobResult {
    pub fn sum(results: &[NodeResult<u64>]) -> Self {
        Self {
            total: results.iter().map(|result| result.output).sum(),
        }
    }
}

/// Synchronous scatter-gather across grid nodes.
///
/// The returned future completes once every dispatched job has returned. Any
/// failed job fails the whole task; no partial results are reported.
#[async_trait]
pub trait JobDispatcher: Send + Sync + 'static {
    /// Runs each job on the node it is paired with.
    async fn execute<J: NodeJob>(
        &self,
        jobs: Vec<(GridNode, J)>,
    ) -> Result<Vec<NodeResult<J::Output>>, DispatchError>;

    /// Runs one job, built by `factory`, on every node in `nodes`.
    async fn run_on_each_node<J, F>(
        &self,
        nodes: Vec<GridNode>,
        mut factory: F,
    ) -> Result<Vec<NodeResult<J::Output>>, DispatchError>
    where
        J: NodeJob,
        F: JobFactory<J>,
    {
        let jobs = nodes
            .into_iter()
            .map(|node| {
                let job = factory.create_job(&node);
                (node, job)
            })
            .collect();
        self.execute(jobs).await
    }
}
