// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! In-process storage tier and compute grid for the scan/map/reduce engine.

mod token_hash;
pub use token_hash::token_for;

mod static_topology;
pub use static_topology::StaticTopology;

mod in_memory_storage;
pub use in_memory_storage::InMemoryStorage;

mod in_memory_grid;
pub use in_memory_grid::InMemoryGrid;

mod in_memory_cache;
pub use in_memory_cache::{InMemoryCache, InMemoryCacheManager};

mod tokio_dispatcher;
pub use tokio_dispatcher::TokioDispatcher;

mod sim_cluster;
pub use sim_cluster::SimCluster;
