// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{token_range::TokenRange, StorageError};

/// Ranged read against the storage tier.
pub trait StorageReader: Send + Sync + 'static {
    /// Typed record produced by the row mapping layer
    type Record: Send + 'static;

    /// Streams every record whose token lies in `range` to `on_record`.
    /// Returning `false` from the callback stops the scan.
    ///
    /// # Returns
    /// * `Ok(count)` - Number of records handed to the callback
    /// * `Err(StorageError)` - The read failed, no partial result is valid
    fn scan(
        &self,
        range: &TokenRange,
        on_record: &mut dyn FnMut(Self::Record) -> bool,
    ) -> Result<u64, StorageError>;
}
