// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Locality-aware scan -> map -> reduce over a token-ring partitioned storage
//! tier, staged through a partitioned compute/cache grid.

pub mod token_range;
pub use token_range::{Token, TokenRange, MAX_TOKEN, MIN_TOKEN};

pub mod grid_node;
pub use grid_node::{GridNode, NodeId, NodeRole};

pub mod stage_kind;
pub use stage_kind::StageKind;

mod errors;
pub use errors::{
    CacheError, CombineError, ConfigError, DispatchError, JobError, PipelineError,
    SchedulingError, StorageError, TopologyError,
};

mod config;
pub use config::EngineConfig;

pub mod random;
pub use random::Random;

pub mod fastrand_random;
pub use fastrand_random::FastrandRandom;

mod topology_oracle;
pub use topology_oracle::{PartitionOwnership, TopologyOracle};

mod grid_membership;
pub use grid_membership::GridMembership;

mod storage_reader;
pub use storage_reader::StorageReader;

mod ring_partitioner;
pub use ring_partitioner::{RingPartitioner, MAX_SPLIT_RANGES};

mod scan_scheduler;
pub use scan_scheduler::{ScanAssignment, ScanScheduler};

mod combiner;
pub use combiner::{Combiner, ReplaceCombiner, SumCombiner, UnionCombiner};

mod distributed_cache;
pub use distributed_cache::{CacheConfig, CacheKey, CacheManager, CacheValue, DistributedCache};

mod emitter;
pub use emitter::{CacheEmitter, Emit};

mod job_factory;
pub use job_factory::JobFactory;

mod job_dispatcher;
pub use job_dispatcher::{JobDispatcher, JobResult, NodeJob, NodeResult};

mod scan_job;
pub use scan_job::{ScanJob, ScanReducer, ScanStage};

mod transformation_runner;
pub use transformation_runner::{TransformJob, TransformStage, TransformationRunner, Transformer};

mod stage_cache;
pub use stage_cache::StageCache;

mod grid_context;
pub use grid_context::GridContext;

mod pipeline_orchestrator;
pub use pipeline_orchestrator::{PipelineOrchestrator, PipelineOutput};
