// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use scan_map_reduce_core::{GridMembership, GridNode, NodeId};
use std::sync::{PoisonError, RwLock};

/// Membership view of a simulated grid.
pub struct InMemoryGrid {
    nodes: RwLock<Vec<GridNode>>,
}

impl InMemoryGrid {
    pub fn new(nodes: Vec<GridNode>) -> Self {
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    pub fn join(&self, node: GridNode) {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        nodes.retain(|existing| existing.id != node.id);
        nodes.push(node);
    }

    pub fn leave(&self, id: NodeId) {
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|node| node.id != id);
    }
}

impl GridMembership for InMemoryGrid {
    fn nodes(&self) -> Vec<GridNode> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
