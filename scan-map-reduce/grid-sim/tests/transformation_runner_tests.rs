// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod common;

use common::{host, ByFrequency, CountEntries, FailOnKey, WordCount};
use scan_map_reduce_core::{
    CacheConfig, CacheManager, DispatchError, DistributedCache, GridNode, JobError,
    ReplaceCombiner, StageKind, SumCombiner, TransformStage, TransformationRunner, UnionCombiner,
};
use scan_map_reduce_grid_sim::{
    InMemoryCache, InMemoryCacheManager, InMemoryGrid, TokioDispatcher,
};
use std::collections::BTreeSet;
use std::sync::Arc;

const WORDS: [&str; 4] = ["red", "green", "blue", "red"];

struct Fixture {
    grid: Arc<InMemoryGrid>,
    caches: InMemoryCacheManager,
}

impl Fixture {
    fn new(servers: u64) -> Self {
        let nodes = (1..=servers)
            .map(|id| GridNode::server(id, [host(id as u8)]))
            .collect();
        let grid = Arc::new(InMemoryGrid::new(nodes));
        Self {
            caches: InMemoryCacheManager::new(grid.clone()),
            grid,
        }
    }

    fn runner(&self) -> TransformationRunner<TokioDispatcher> {
        TransformationRunner::new(Arc::new(TokioDispatcher::new()), self.grid.clone(), 0)
    }

    /// Input cache with `count` rows cycling through `WORDS`.
    fn rows(&self, count: u64) -> InMemoryCache<u64, String> {
        let cache = self
            .caches
            .get_or_create::<u64, String>("job-scan-1", &CacheConfig::default())
            .unwrap();
        for id in 0..count {
            cache
                .invoke(id, WORDS[id as usize % WORDS.len()].to_string(), &ReplaceCombiner)
                .unwrap();
        }
        cache
    }
}

#[tokio::test]
async fn test_safety_every_entry_is_transformed_once() {
    let fixture = Fixture::new(3);
    let input = fixture.rows(200);
    let output = fixture
        .caches
        .get_or_create::<bool, u64>("job-map-1", &CacheConfig::default())
        .unwrap();

    let stage = TransformStage::new(CountEntries).with_combiner(SumCombiner);
    let result = fixture
        .runner()
        .run(StageKind::Map, &input, &output, &stage)
        .await
        .unwrap();

    assert_eq!(result.total, 200);
    assert_eq!(output.get(&true).unwrap(), Some(200));
    assert_eq!(output.len().unwrap(), 1);
}

#[tokio::test]
async fn test_safety_server_leaving_before_the_run_loses_no_entries() {
    let fixture = Fixture::new(3);
    let input = fixture.rows(300);
    let output = fixture
        .caches
        .get_or_create::<bool, u64>("job-map-1", &CacheConfig::default())
        .unwrap();

    fixture.grid.leave(3);
    let stage = TransformStage::new(CountEntries).with_combiner(SumCombiner);
    let result = fixture
        .runner()
        .run(StageKind::Map, &input, &output, &stage)
        .await
        .unwrap();

    assert_eq!(result.total, 300);
    assert_eq!(output.entries().unwrap(), vec![(true, 300)]);
}

#[tokio::test]
async fn test_liveness_emits_to_one_key_are_combined() {
    let fixture = Fixture::new(2);
    let input = fixture.rows(8);
    let output = fixture
        .caches
        .get_or_create::<String, u64>("job-map-1", &CacheConfig::default())
        .unwrap();

    let stage = TransformStage::new(WordCount).with_combiner(SumCombiner);
    fixture
        .runner()
        .run(StageKind::Map, &input, &output, &stage)
        .await
        .unwrap();

    assert_eq!(output.get(&"red".to_string()).unwrap(), Some(4));
    assert_eq!(output.get(&"green".to_string()).unwrap(), Some(2));
    assert_eq!(output.get(&"blue".to_string()).unwrap(), Some(2));
}

#[tokio::test]
async fn test_liveness_reduce_inverts_counts() {
    let fixture = Fixture::new(2);
    let input = fixture
        .caches
        .get_or_create::<String, u64>("job-map-1", &CacheConfig::default())
        .unwrap();
    for (word, count) in [("red", 2), ("green", 1), ("blue", 1)] {
        input.invoke(word.to_string(), count, &ReplaceCombiner).unwrap();
    }
    let output = fixture
        .caches
        .get_or_create::<u64, BTreeSet<String>>("job-reduce-1", &CacheConfig::default())
        .unwrap();

    let stage = TransformStage::new(ByFrequency).with_combiner(UnionCombiner);
    let result = fixture
        .runner()
        .run(StageKind::Reduce, &input, &output, &stage)
        .await
        .unwrap();

    assert_eq!(result.total, 3);
    assert_eq!(
        output.get(&1).unwrap(),
        Some(BTreeSet::from(["blue".to_string(), "green".to_string()]))
    );
    assert_eq!(output.get(&2).unwrap(), Some(BTreeSet::from(["red".to_string()])));
}

#[tokio::test]
async fn test_safety_failing_entry_fails_the_run() {
    let fixture = Fixture::new(3);
    let input = fixture.rows(50);
    let output = fixture
        .caches
        .get_or_create::<u64, String>("job-map-1", &CacheConfig::default())
        .unwrap();

    let stage = TransformStage::new(FailOnKey { key: 17u64 });
    let result = fixture
        .runner()
        .run(StageKind::Map, &input, &output, &stage)
        .await;

    match result {
        Err(DispatchError::NodeFailed { node, source }) => {
            assert_eq!(node, input.primary_of(&17));
            assert_eq!(source, JobError::Transform("cannot transform 17".to_string()));
        }
        other => panic!("expected a node failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_safety_destroyed_input_fails_the_run() {
    let fixture = Fixture::new(2);
    let input = fixture.rows(10);
    let output = fixture
        .caches
        .get_or_create::<bool, u64>("job-map-1", &CacheConfig::default())
        .unwrap();
    fixture.caches.destroy("job-scan-1").unwrap();

    let stage = TransformStage::new(CountEntries).with_combiner(SumCombiner);
    let result = fixture
        .runner()
        .run(StageKind::Map, &input, &output, &stage)
        .await;

    assert!(matches!(
        result,
        Err(DispatchError::NodeFailed {
            source: JobError::Cache(_),
            ..
        })
    ));
}

#[tokio::test]
async fn test_safety_no_server_nodes() {
    let fixture = Fixture::new(1);
    let input = fixture.rows(5);
    let output = fixture
        .caches
        .get_or_create::<bool, u64>("job-map-1", &CacheConfig::default())
        .unwrap();
    let clients_only = Arc::new(InMemoryGrid::new(vec![GridNode::client(7, [host(7)])]));
    let runner = TransformationRunner::new(Arc::new(TokioDispatcher::new()), clients_only, 0);

    let stage = TransformStage::new(CountEntries).with_combiner(SumCombiner);
    let result = runner.run(StageKind::Map, &input, &output, &stage).await;

    assert_eq!(result, Err(DispatchError::NoNodes));
    assert!(output.is_empty().unwrap());
}

#[tokio::test]
async fn test_liveness_progress_interval_does_not_change_results() {
    let fixture = Fixture::new(2);
    let input = fixture.rows(25);
    let output = fixture
        .caches
        .get_or_create::<bool, u64>("job-map-1", &CacheConfig::default())
        .unwrap();
    let runner =
        TransformationRunner::new(Arc::new(TokioDispatcher::new()), fixture.grid.clone(), 3);

    let stage = TransformStage::new(CountEntries).with_combiner(SumCombiner);
    let result = runner
        .run(StageKind::Map, &input, &output, &stage)
        .await
        .unwrap();

    assert_eq!(result.total, 25);
    assert_eq!(output.get(&true).unwrap(), Some(25));
}
