// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{EngineConfig, GridMembership, Random, TopologyOracle};
use std::sync::Arc;

/// Handles to the storage tier and the compute grid, passed explicitly to
/// every component that needs them.
pub struct GridContext<D, M> {
    pub topology: Arc<dyn TopologyOracle>,
    pub membership: Arc<dyn GridMembership>,
    pub dispatcher: Arc<D>,
    pub caches: Arc<M>,
    pub random: Arc<dyn Random>,
    pub config: EngineConfig,
}

impl<D, M> GridContext<D, M> {
    pub fn new(
        topology: Arc<dyn TopologyOracle>,
        membership: Arc<dyn GridMembership>,
        dispatcher: Arc<D>,
        caches: Arc<M>,
        random: Arc<dyn Random>,
    ) -> Self {
        Self {
            topology,
            membership,
            dispatcher,
            caches,
            random,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
}

impl<D, M> Clone for GridContext<D, M> {
    fn clone(&self) -> Self {
        Self {
            topology: self.topology.clone(),
            membership: self.membership.clone(),
            dispatcher: self.dispatcher.clone(),
            caches: self.caches.clone(),
            random: self.random.clone(),
            config: self.config.clone(),
        }
    }
}
