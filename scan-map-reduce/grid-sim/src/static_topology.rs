// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use scan_map_reduce_core::{
    Token, TokenRange, TopologyError, TopologyOracle, MAX_TOKEN, MIN_TOKEN,
};
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};

/// Token ring of a simulated storage tier.
///
/// Each ring entry owns the tokens after the previous entry up to and
/// including its own token, wrapping past `MAX_TOKEN`. Replicas are the
/// owner followed by the next distinct addresses clockwise.
pub struct StaticTopology {
    ring: Vec<(Token, IpAddr)>,
    replication_factor: usize,
    keyspaces: BTreeSet<String>,
    reachable: AtomicBool,
}

impl StaticTopology {
    pub fn new(replication_factor: usize) -> Self {
        Self {
            ring: Vec::new(),
            replication_factor: replication_factor.max(1),
            keyspaces: BTreeSet::new(),
            reachable: AtomicBool::new(true),
        }
    }

    /// Spreads `vnodes_per_host` tokens per host evenly around the ring,
    /// interleaving hosts.
    pub fn evenly_spaced(
        hosts: &[IpAddr],
        vnodes_per_host: usize,
        replication_factor: usize,
    ) -> Self {
        let mut topology = Self::new(replication_factor);
        let count = hosts.len() * vnodes_per_host.max(1);
        if count == 0 {
            return topology;
        }
        let step = (MAX_TOKEN as i128 - MIN_TOKEN as i128) / count as i128;
        for index in 0..count {
            let token = MIN_TOKEN as i128 + step * (index as i128 + 1);
            topology = topology.with_token(token as Token, hosts[index % hosts.len()]);
        }
        topology
    }

    pub fn with_token(mut self, token: Token, address: IpAddr) -> Self {
        self.ring.push((token, address));
        self.ring.sort();
        self
    }

    pub fn with_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspaces.insert(keyspace.into());
        self
    }

    /// Simulates losing contact with the partition metadata.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn hosts(&self) -> BTreeSet<IpAddr> {
        self.ring.iter().map(|(_, address)| *address).collect()
    }

    /// Replica set of the storage partition holding `token`.
    pub fn replicas_for(&self, token: Token) -> BTreeSet<IpAddr> {
        let mut replicas = BTreeSet::new();
        if self.ring.is_empty() {
            return replicas;
        }
        let first = self
            .ring
            .partition_point(|(ring_token, _)| *ring_token < token)
            % self.ring.len();
        let wanted = self.replication_factor.min(self.hosts().len());
        for offset in 0..self.ring.len() {
            if replicas.len() == wanted {
                break;
            }
            let (_, address) = self.ring[(first + offset) % self.ring.len()];
            replicas.insert(address);
        }
        replicas
    }

    fn check(&self, keyspace: &str) -> Result<(), TopologyError> {
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(TopologyError::Unreachable("metadata request timed out".to_string()));
        }
        if !self.keyspaces.contains(keyspace) {
            return Err(TopologyError::UnknownKeyspace(keyspace.to_string()));
        }
        if self.ring.is_empty() {
            return Err(TopologyError::Unreachable("token ring is empty".to_string()));
        }
        Ok(())
    }
}

impl TopologyOracle for StaticTopology {
    fn owners_of(
        &self,
        range: &TokenRange,
        keyspace: &str,
    ) -> Result<BTreeSet<IpAddr>, TopologyError> {
        self.check(keyspace)?;
        Ok(self.replicas_for(range.end()))
    }

    fn member_count(&self, keyspace: &str) -> Result<usize, TopologyError> {
        self.check(keyspace)?;
        Ok(self.hosts().len())
    }
}
