// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{
    token_range::{TokenRange, MAX_TOKEN, MIN_TOKEN},
    SchedulingError, TopologyOracle,
};

/// Largest number of ranges a single split may produce.
pub const MAX_SPLIT_RANGES: usize = 1 << 24;

/// Splits the full token ring into contiguous scan ranges.
pub struct RingPartitioner;

impl RingPartitioner {
    /// Splits `[MIN_TOKEN, MAX_TOKEN]` into `total_members * vnodes_per_member`
    /// ranges of (almost) equal width.
    ///
    /// The first range is `[MIN_TOKEN, e]`, every following range starts
    /// open on the previous end, and the last one is clamped to `MAX_TOKEN`
    /// so it absorbs the rounding remainder.
    pub fn split(
        total_members: usize,
        vnodes_per_member: usize,
    ) -> Result<Vec<TokenRange>, SchedulingError> {
        let invalid = SchedulingError::InvalidSplit {
            members: total_members,
            vnodes: vnodes_per_member,
        };
        let count = match total_members.checked_mul(vnodes_per_member) {
            Some(count) if count > 0 && count <= MAX_SPLIT_RANGES => count,
            _ => return Err(invalid),
        };

        let span = MAX_TOKEN as i128 - MIN_TOKEN as i128;
        let width = span / count as i128;

        let mut ranges = Vec::with_capacity(count);
        let mut start = MIN_TOKEN as i128;
        for index in 0..count {
            let end = if index + 1 == count {
                MAX_TOKEN as i128
            } else {
                start + width
            };
            let range = if index == 0 {
                TokenRange::closed(start as i64, end as i64)
            } else {
                TokenRange::open_closed(start as i64, end as i64)
            };
            ranges.push(range);
            start = end;
        }

        Ok(ranges)
    }

    /// Splits the ring using the storage tier's current member count.
    pub fn split_for(
        topology: &dyn TopologyOracle,
        keyspace: &str,
        vnodes_per_member: usize,
    ) -> Result<Vec<TokenRange>, SchedulingError> {
        let members = topology.member_count(keyspace)?;
        Self::split(members, vnodes_per_member)
    }
}
