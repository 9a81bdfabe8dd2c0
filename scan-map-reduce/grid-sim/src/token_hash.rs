// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use scan_map_reduce_core::Token;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic token of a partition key.
pub fn token_for<K: Hash + ?Sized>(key: &K) -> Token {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish() as Token
}
