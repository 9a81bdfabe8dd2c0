// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use scan_map_reduce_core::{Emit, JobError, ScanReducer, Transformer};
use std::collections::BTreeSet;

/// A stored line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub id: u64,
    pub text: String,
}

/// Keeps the lines that contain at least one target, with the targets found.
pub struct MatchTargets {
    targets: Vec<String>,
}

impl MatchTargets {
    pub fn new(targets: Vec<String>) -> Self {
        Self { targets }
    }
}

impl ScanReducer for MatchTargets {
    type Record = Line;
    type OutKey = u64;
    type OutValue = Vec<String>;

    fn reduce(
        &self,
        line: Line,
        emitter: &mut dyn Emit<u64, Vec<String>>,
    ) -> Result<bool, JobError> {
        let found: Vec<String> = self
            .targets
            .iter()
            .filter(|target| line.text.contains(target.as_str()))
            .cloned()
            .collect();
        if !found.is_empty() {
            emitter.emit(line.id, found)?;
        }
        Ok(true)
    }
}

/// `(line, targets)` -> `(target, 1)` per target.
pub struct CountTargets;

impl Transformer for CountTargets {
    type InKey = u64;
    type InValue = Vec<String>;
    type OutKey = String;
    type OutValue = u64;

    fn transform(
        &self,
        _line: &u64,
        targets: &Vec<String>,
        emitter: &mut dyn Emit<String, u64>,
    ) -> Result<(), JobError> {
        for target in targets {
            emitter.emit(target.clone(), 1)?;
        }
        Ok(())
    }
}

/// `(target, count)` -> `(count, {target})`.
pub struct GroupByCount;

impl Transformer for GroupByCount {
    type InKey = String;
    type InValue = u64;
    type OutKey = u64;
    type OutValue = BTreeSet<String>;

    fn transform(
        &self,
        target: &String,
        count: &u64,
        emitter: &mut dyn Emit<u64, BTreeSet<String>>,
    ) -> Result<(), JobError> {
        emitter.emit(*count, BTreeSet::from([target.clone()]))?;
        Ok(())
    }
}
