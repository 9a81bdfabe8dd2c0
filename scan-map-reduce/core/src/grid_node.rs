// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::IpAddr;

pub type NodeId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// Runs jobs and hosts cache partitions
    Server,
    /// Client-only member, never scheduled
    Client,
}

/// An addressable member of the compute grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridNode {
    pub id: NodeId,
    pub addresses: BTreeSet<IpAddr>,
    pub role: NodeRole,
}

impl GridNode {
    pub fn server(id: NodeId, addresses: impl IntoIterator<Item = IpAddr>) -> Self {
        Self {
            id,
            addresses: addresses.into_iter().collect(),
            role: NodeRole::Server,
        }
    }

    pub fn client(id: NodeId, addresses: impl IntoIterator<Item = IpAddr>) -> Self {
        Self {
            id,
            addresses: addresses.into_iter().collect(),
            role: NodeRole::Client,
        }
    }

    pub fn is_server(&self) -> bool {
        self.role == NodeRole::Server
    }

    /// True when the node shares a network address with the given storage host.
    pub fn is_colocated_with(&self, address: &IpAddr) -> bool {
        self.addresses.contains(address)
    }
}
