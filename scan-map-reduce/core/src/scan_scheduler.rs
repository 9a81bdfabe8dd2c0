// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{
    grid_node::{GridNode, NodeId},
    token_range::TokenRange,
    Random, SchedulingError, TopologyOracle,
};
use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// Binding of one scan range to the grid node that will read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanAssignment {
    pub range: TokenRange,
    pub node: GridNode,
}

/// Places scan ranges on grid nodes, preferring nodes co-located with a
/// storage replica of the range.
///
/// Placement is a greedy least-loaded pick over each range's replica set:
/// the replica that has been chosen least often so far in this call wins,
/// ties going to the first replica in set order. The chosen replica is then
/// mapped to a grid node sharing its address, or to a random server node when
/// no such node exists.
pub struct ScanScheduler {
    topology: Arc<dyn TopologyOracle>,
    random: Arc<dyn Random>,
}

impl ScanScheduler {
    pub fn new(topology: Arc<dyn TopologyOracle>, random: Arc<dyn Random>) -> Self {
        Self { topology, random }
    }

    pub fn schedule(
        &self,
        ranges: &[TokenRange],
        grid_nodes: &[GridNode],
        keyspace: &str,
    ) -> Result<BTreeMap<TokenRange, GridNode>, SchedulingError> {
        if ranges.is_empty() {
            return Err(SchedulingError::NoRanges);
        }

        let candidates: Vec<&GridNode> =
            grid_nodes.iter().filter(|node| node.is_server()).collect();
        if candidates.is_empty() {
            return Err(SchedulingError::NoServerNodes);
        }

        // Scoped to this call, never shared across pipeline runs.
        let mut load: HashMap<IpAddr, usize> = HashMap::new();
        let mut schedule = BTreeMap::new();

        for range in ranges {
            let owners = self.topology.owners_of(range, keyspace)?;
            let address = owners
                .iter()
                .min_by_key(|address| load.get(*address).copied().unwrap_or(0))
                .copied()
                .ok_or_else(|| SchedulingError::NoOwners {
                    range: range.to_string(),
                })?;
            *load.entry(address).or_insert(0) += 1;

            let node = match candidates.iter().find(|node| node.is_colocated_with(&address)) {
                Some(node) => *node,
                None => {
                    let fallback = candidates[self.random.usize(0..candidates.len())];
                    debug!(
                        range = %range,
                        address = %address,
                        node = fallback.id,
                        "no co-located grid node, falling back"
                    );
                    fallback
                }
            };
            schedule.insert(*range, node.clone());
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            let mut per_node: BTreeMap<NodeId, usize> = BTreeMap::new();
            for node in schedule.values() {
                *per_node.entry(node.id).or_insert(0) += 1;
            }
            debug!(ranges = schedule.len(), ?per_node, "scan ranges scheduled");
        }

        Ok(schedule)
    }

    /// Same as [`ScanScheduler::schedule`], flattened into assignments ordered
    /// by range.
    pub fn assignments(
        &self,
        ranges: &[TokenRange],
        grid_nodes: &[GridNode],
        keyspace: &str,
    ) -> Result<Vec<ScanAssignment>, SchedulingError> {
        Ok(self
            .schedule(ranges, grid_nodes, keyspace)?
            .into_iter()
            .map(|(range, node)| ScanAssignment { range, node })
            .collect())
    }
}
