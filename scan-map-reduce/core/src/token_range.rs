// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a partition key on the storage ring (Murmur3 token space).
pub type Token = i64;

pub const MIN_TOKEN: Token = i64::MIN;
pub const MAX_TOKEN: Token = i64::MAX;

/// A contiguous slice of the token ring.
///
/// The end boundary is always closed. The start boundary is open, except for
/// the first range of a ring split which closes on `MIN_TOKEN` so that the
/// extreme token is not lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenRange {
    start: Token,
    end: Token,
    start_inclusive: bool,
}

impl TokenRange {
    /// `[start, end]`
    pub fn closed(start: Token, end: Token) -> Self {
        Self {
            start,
            end,
            start_inclusive: true,
        }
    }

    /// `(start, end]`
    pub fn open_closed(start: Token, end: Token) -> Self {
        Self {
            start,
            end,
            start_inclusive: false,
        }
    }

    pub fn start(&self) -> Token {
        self.start
    }

    pub fn end(&self) -> Token {
        self.end
    }

    pub fn is_start_inclusive(&self) -> bool {
        self.start_inclusive
    }

    /// Lowest token that belongs to the range, if any.
    pub fn first_token(&self) -> Option<Token> {
        if self.start_inclusive {
            (self.start <= self.end).then_some(self.start)
        } else if self.start < self.end {
            Some(self.start + 1)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_token().is_none()
    }

    pub fn contains(&self, token: Token) -> bool {
        let above_start = if self.start_inclusive {
            token >= self.start
        } else {
            token > self.start
        };
        above_start && token <= self.end
    }

    /// Number of tokens covered by the range.
    pub fn width(&self) -> u128 {
        match self.first_token() {
            Some(first) => (self.end as i128 - first as i128) as u128 + 1,
            None => 0,
        }
    }
}

impl fmt::Display for TokenRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.start_inclusive { '[' } else { '(' };
        write!(f, "{}{}, {}]", open, self.start, self.end)
    }
}
