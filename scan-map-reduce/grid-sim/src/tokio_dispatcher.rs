// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use scan_map_reduce_core::{
    DispatchError, GridNode, JobDispatcher, JobError, NodeId, NodeJob, NodeResult,
};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Scatter-gather over tokio's blocking pool: every node-job runs on its own
/// blocking task, all of them in parallel.
///
/// Waits for every job before returning, so no job is still writing to a
/// cache once the caller moves on. The first failure, in dispatch order,
/// fails the whole task.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDispatcher;

impl TokioDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl JobDispatcher for TokioDispatcher {
    async fn execute<J: NodeJob>(
        &self,
        jobs: Vec<(GridNode, J)>,
    ) -> Result<Vec<NodeResult<J::Output>>, DispatchError> {
        if jobs.is_empty() {
            return Err(DispatchError::NoNodes);
        }

        let handles: Vec<(NodeId, JoinHandle<Result<J::Output, JobError>>)> = jobs
            .into_iter()
            .map(|(node, job)| {
                let id = node.id;
                let handle = tokio::task::spawn_blocking(move || job.execute(&node));
                (id, handle)
            })
            .collect();
        debug!(jobs = handles.len(), "node jobs dispatched");

        let mut results = Vec::with_capacity(handles.len());
        let mut failure = None;
        for (node, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(JobError::Panicked(e.to_string())),
            };
            match outcome {
                Ok(output) => results.push(NodeResult { node, output }),
                Err(source) => {
                    warn!(node, error = %source, "node job failed");
                    failure.get_or_insert(DispatchError::NodeFailed { node, source });
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }
}
