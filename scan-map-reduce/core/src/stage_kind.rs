// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage descriptor of a pipeline. The identifier is stable and is used to
/// name the stage's output cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    Scan,
    Map,
    Reduce,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Scan => "scan",
            StageKind::Map => "map",
            StageKind::Reduce => "reduce",
        }
    }

    /// Name of an output cache for this stage: `job-<stage>-<run id>`.
    pub fn cache_name(&self, run_id: &str) -> String {
        format!("job-{}-{}", self.as_str(), run_id)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
