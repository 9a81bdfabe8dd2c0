// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{InMemoryCacheManager, InMemoryGrid, StaticTopology, TokioDispatcher};
use scan_map_reduce_core::{EngineConfig, GridContext, GridNode, NodeId, Random};
use std::net::IpAddr;
use std::sync::Arc;

/// A storage ring and a compute grid wired together in one process.
pub struct SimCluster {
    pub topology: Arc<StaticTopology>,
    pub grid: Arc<InMemoryGrid>,
    pub dispatcher: Arc<TokioDispatcher>,
    pub caches: Arc<InMemoryCacheManager>,
}

impl SimCluster {
    pub fn new(topology: StaticTopology, nodes: Vec<GridNode>) -> Self {
        let grid = Arc::new(InMemoryGrid::new(nodes));
        Self {
            topology: Arc::new(topology),
            caches: Arc::new(InMemoryCacheManager::new(grid.clone())),
            grid,
            dispatcher: Arc::new(TokioDispatcher::new()),
        }
    }

    /// One grid server co-located with every storage host, ids starting at 1.
    pub fn colocated(
        keyspace: &str,
        hosts: &[IpAddr],
        vnodes_per_host: usize,
        replication_factor: usize,
    ) -> Self {
        let topology = StaticTopology::evenly_spaced(hosts, vnodes_per_host, replication_factor)
            .with_keyspace(keyspace);
        let nodes = hosts
            .iter()
            .enumerate()
            .map(|(index, host)| GridNode::server(index as NodeId + 1, [*host]))
            .collect();
        Self::new(topology, nodes)
    }

    pub fn context(
        &self,
        random: Arc<dyn Random>,
        config: EngineConfig,
    ) -> GridContext<TokioDispatcher, InMemoryCacheManager> {
        GridContext::new(
            self.topology.clone(),
            self.grid.clone(),
            self.dispatcher.clone(),
            self.caches.clone(),
            random,
        )
        .with_config(config)
    }
}
