// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::grid_node::GridNode;

/// The grid's current membership view.
pub trait GridMembership: Send + Sync {
    fn nodes(&self) -> Vec<GridNode>;

    /// Members able to run jobs and host cache partitions.
    fn server_nodes(&self) -> Vec<GridNode> {
        self.nodes()
            .into_iter()
            .filter(GridNode::is_server)
            .collect()
    }
}
