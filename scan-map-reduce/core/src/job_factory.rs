// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::grid_node::GridNode;

/// Creates the job a grid node runs during a scatter-gather task.
pub trait JobFactory<J>: Send {
    fn create_job(&mut self, node: &GridNode) -> J;
}

impl<F, J> JobFactory<J> for F
where
    F: FnMut(&GridNode) -> J + Send,
{
    fn create_job(&mut self, node: &GridNode) -> J {
        (self)(node)
    }
}
