// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{grid_node::NodeId, stage_kind::StageKind};
use thiserror::Error;

/// Failures of the storage tier's partition metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("unknown keyspace '{0}'")]
    UnknownKeyspace(String),

    #[error("partition metadata unreachable: {0}")]
    Unreachable(String),
}

/// Failures of the storage tier's ranged read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be turned into a record
    #[error("failed to decode record: {0}")]
    Decode(String),

    /// Internal storage error (I/O, corruption, etc.)
    #[error("internal storage error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("combiner failed: {0}")]
pub struct CombineError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache '{0}' has been destroyed")]
    Destroyed(String),

    #[error("cache '{0}' does not exist")]
    NotFound(String),

    /// `get_or_create` was called with key/value types that differ from the
    /// ones the cache was created with.
    #[error("cache '{0}' exists with different key or value types")]
    TypeMismatch(String),

    #[error("cache '{name}' is full ({max_entries} entries)")]
    CapacityExceeded { name: String, max_entries: usize },

    #[error("cache '{name}' has no server node to host partitions")]
    NoAffinityNodes { name: String },

    #[error(transparent)]
    Combine(#[from] CombineError),
}

/// Failure of a single node-job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Raised by user supplied scan, map or reduce logic
    #[error("transform failed: {0}")]
    Transform(String),

    #[error("job panicked: {0}")]
    Panicked(String),
}

/// Failure of a scatter-gather task as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("no grid nodes to dispatch to")]
    NoNodes,

    #[error("job on node {node} failed: {source}")]
    NodeFailed {
        node: NodeId,
        #[source]
        source: JobError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulingError {
    #[error("no token ranges to schedule")]
    NoRanges,

    #[error("no server nodes available for scheduling")]
    NoServerNodes,

    #[error("cannot split the ring into {members} members x {vnodes} vnodes")]
    InvalidSplit { members: usize, vnodes: usize },

    #[error("range {range} has no owning storage node")]
    NoOwners { range: String },

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("{stage} stage scheduling failed: {source}")]
    Scheduling {
        stage: StageKind,
        #[source]
        source: SchedulingError,
    },

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: StageKind,
        #[source]
        source: DispatchError,
    },

    #[error("{stage} stage cache error: {source}")]
    Cache {
        stage: StageKind,
        #[source]
        source: CacheError,
    },
}

impl PipelineError {
    pub fn stage(&self) -> StageKind {
        match self {
            PipelineError::Scheduling { stage, .. }
            | PipelineError::Stage { stage, .. }
            | PipelineError::Cache { stage, .. } => *stage,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
