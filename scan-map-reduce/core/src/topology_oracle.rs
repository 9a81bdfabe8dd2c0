// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{token_range::TokenRange, TopologyError};
use std::collections::BTreeSet;
use std::net::IpAddr;

/// Storage nodes holding a replica of a token range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionOwnership {
    pub range: TokenRange,
    pub owners: BTreeSet<IpAddr>,
}

/// Read-only view of the storage tier's token ring metadata.
///
/// Implementations are queried fresh on every scheduling call and must not
/// retry internally; a failure aborts the scheduling step.
pub trait TopologyOracle: Send + Sync {
    /// Addresses of the storage nodes owning `range` in `keyspace`.
    /// The set's iteration order is the scheduler's tie-break order.
    fn owners_of(&self, range: &TokenRange, keyspace: &str)
        -> Result<BTreeSet<IpAddr>, TopologyError>;

    /// Number of storage nodes serving `keyspace`.
    fn member_count(&self, keyspace: &str) -> Result<usize, TopologyError>;

    fn ownership(
        &self,
        range: &TokenRange,
        keyspace: &str,
    ) -> Result<PartitionOwnership, TopologyError> {
        Ok(PartitionOwnership {
            range: *range,
            owners: self.owners_of(range, keyspace)?,
        })
    }
}
