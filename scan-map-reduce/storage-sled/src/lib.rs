// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Token-ordered record store on sled, readable by token range.

mod sled_storage;
pub use sled_storage::SledStorage;
