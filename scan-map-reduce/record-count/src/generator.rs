// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rand::Rng;

/// Lowercase string of 1 to `max_length` characters.
pub fn generate_random_string(rng: &mut impl Rng, max_length: usize) -> String {
    let length = rng.random_range(1..=max_length.max(1));
    generate_word(rng, length)
}

pub fn generate_word(rng: &mut impl Rng, length: usize) -> String {
    (0..length)
        .map(|_| rng.random_range(b'a'..=b'z') as char)
        .collect()
}
