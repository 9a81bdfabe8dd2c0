// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(dead_code)]

use scan_map_reduce_core::{Emit, JobError, Random, ScanReducer, Transformer};
use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicU64, Ordering};

pub const KEYSPACE: &str = "events";

pub fn host(last: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
}

/// A stored row: record id plus the word it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u64,
    pub word: String,
}

impl Row {
    pub fn new(id: u64, word: &str) -> Self {
        Self {
            id,
            word: word.to_string(),
        }
    }
}

/// Run ids 1, 2, 3, ... and the first candidate for every random choice.
#[derive(Default)]
pub struct SequenceRandom {
    next: AtomicU64,
}

impl Random for SequenceRandom {
    fn usize(&self, range: std::ops::Range<usize>) -> usize {
        range.start
    }

    fn u64(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst) + 1
    }
}

// ============================================================
// Scan reducers
// ============================================================

/// Copies every row into the scan cache, keyed by id.
pub struct CopyRows;

impl ScanReducer for CopyRows {
    type Record = Row;
    type OutKey = u64;
    type OutValue = String;

    fn reduce(&self, record: Row, emitter: &mut dyn Emit<u64, String>) -> Result<bool, JobError> {
        emitter.emit(record.id, record.word)?;
        Ok(true)
    }
}

/// Emits `(word, 1)` per row, aggregating in the scan stage itself.
pub struct CountWordsWhileScanning;

impl ScanReducer for CountWordsWhileScanning {
    type Record = Row;
    type OutKey = String;
    type OutValue = u64;

    fn reduce(&self, record: Row, emitter: &mut dyn Emit<String, u64>) -> Result<bool, JobError> {
        emitter.emit(record.word, 1)?;
        Ok(true)
    }
}

/// Copies rows until it meets one carrying `stop_word`.
pub struct CopyUntil {
    pub stop_word: String,
}

impl ScanReducer for CopyUntil {
    type Record = Row;
    type OutKey = u64;
    type OutValue = String;

    fn reduce(&self, record: Row, emitter: &mut dyn Emit<u64, String>) -> Result<bool, JobError> {
        if record.word == self.stop_word {
            return Ok(false);
        }
        emitter.emit(record.id, record.word)?;
        Ok(true)
    }
}

/// Fails on the row carrying `poison`.
pub struct RejectWord {
    pub poison: String,
}

impl ScanReducer for RejectWord {
    type Record = Row;
    type OutKey = u64;
    type OutValue = String;

    fn reduce(&self, record: Row, emitter: &mut dyn Emit<u64, String>) -> Result<bool, JobError> {
        if record.word == self.poison {
            return Err(JobError::Transform(format!("poisoned row {}", record.id)));
        }
        emitter.emit(record.id, record.word)?;
        Ok(true)
    }
}

// ============================================================
// Transformers
// ============================================================

/// Emits `(true, 1)` for every entry.
pub struct CountEntries;

impl Transformer for CountEntries {
    type InKey = u64;
    type InValue = String;
    type OutKey = bool;
    type OutValue = u64;

    fn transform(
        &self,
        _key: &u64,
        _value: &String,
        emitter: &mut dyn Emit<bool, u64>,
    ) -> Result<(), JobError> {
        emitter.emit(true, 1)?;
        Ok(())
    }
}

/// Emits `(word, 1)` for every row.
pub struct WordCount;

impl Transformer for WordCount {
    type InKey = u64;
    type InValue = String;
    type OutKey = String;
    type OutValue = u64;

    fn transform(
        &self,
        _key: &u64,
        word: &String,
        emitter: &mut dyn Emit<String, u64>,
    ) -> Result<(), JobError> {
        emitter.emit(word.clone(), 1)?;
        Ok(())
    }
}

/// Inverts word counts into `count -> words`.
pub struct ByFrequency;

impl Transformer for ByFrequency {
    type InKey = String;
    type InValue = u64;
    type OutKey = u64;
    type OutValue = BTreeSet<String>;

    fn transform(
        &self,
        word: &String,
        count: &u64,
        emitter: &mut dyn Emit<u64, BTreeSet<String>>,
    ) -> Result<(), JobError> {
        emitter.emit(*count, BTreeSet::from([word.clone()]))?;
        Ok(())
    }
}

/// Fails on one key, copies every other entry.
pub struct FailOnKey<K> {
    pub key: K,
}

impl Transformer for FailOnKey<u64> {
    type InKey = u64;
    type InValue = String;
    type OutKey = u64;
    type OutValue = String;

    fn transform(
        &self,
        key: &u64,
        value: &String,
        emitter: &mut dyn Emit<u64, String>,
    ) -> Result<(), JobError> {
        if *key == self.key {
            return Err(JobError::Transform(format!("cannot transform {}", key)));
        }
        emitter.emit(*key, value.clone())?;
        Ok(())
    }
}

impl Transformer for FailOnKey<String> {
    type InKey = String;
    type InValue = u64;
    type OutKey = u64;
    type OutValue = BTreeSet<String>;

    fn transform(
        &self,
        key: &String,
        _value: &u64,
        _emitter: &mut dyn Emit<u64, BTreeSet<String>>,
    ) -> Result<(), JobError> {
        if *key == self.key {
            return Err(JobError::Transform(format!("cannot reduce {}", key)));
        }
        Ok(())
    }
}
