// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod common;

use common::{host, CopyRows, CountEntries, Row, SequenceRandom, KEYSPACE};
use scan_map_reduce_core::{
    CacheConfig, CacheManager, DistributedCache, EngineConfig, GridMembership, GridNode,
    JobDispatcher, JobResult, PipelineOrchestrator, ReplaceCombiner, ScanJob, ScanScheduler,
    ScanStage, StageKind, SumCombiner, TokenRange, TransformStage, TransformationRunner,
};
use scan_map_reduce_grid_sim::{InMemoryStorage, SimCluster, StaticTopology};
use std::sync::Arc;

/// Hosts A and B own `[0, 50]` and `(50, 100]`; grid nodes 1 and 2 run
/// next to them.
fn two_range_cluster() -> SimCluster {
    let topology = StaticTopology::new(1)
        .with_token(50, host(1))
        .with_token(100, host(2))
        .with_keyspace(KEYSPACE);
    SimCluster::new(
        topology,
        vec![GridNode::server(1, [host(1)]), GridNode::server(2, [host(2)])],
    )
}

fn storage() -> Arc<InMemoryStorage<Row>> {
    let storage = InMemoryStorage::new();
    for token in 0..=100i64 {
        let copies = if token % 3 == 0 { 2 } else { 1 };
        for copy in 0..copies {
            let id = token as u64 * 10 + copy;
            storage.insert(token, Row::new(id, "event"));
        }
    }
    Arc::new(storage)
}

#[tokio::test]
async fn test_liveness_two_range_scan_then_count() {
    let cluster = two_range_cluster();
    let storage = storage();
    let lower = TokenRange::closed(0, 50);
    let upper = TokenRange::open_closed(50, 100);

    let scheduler =
        ScanScheduler::new(cluster.topology.clone(), Arc::new(SequenceRandom::default()));
    let assignments = scheduler
        .assignments(&[lower, upper], &cluster.grid.nodes(), KEYSPACE)
        .unwrap();
    let placement: Vec<_> = assignments.iter().map(|a| (a.range, a.node.id)).collect();
    assert_eq!(placement, vec![(lower, 1), (upper, 2)]);

    // Scan
    let scanned = cluster
        .caches
        .get_or_create::<u64, String>(&StageKind::Scan.cache_name("e2e"), &CacheConfig::default())
        .unwrap();
    let reducer = Arc::new(CopyRows);
    let jobs = assignments
        .into_iter()
        .map(|assignment| {
            let job = ScanJob::new(
                assignment.range,
                storage.clone(),
                reducer.clone(),
                Arc::new(ReplaceCombiner),
                scanned.clone(),
            );
            (assignment.node, job)
        })
        .collect();
    let results = cluster.dispatcher.execute(jobs).await.unwrap();

    let expected = (storage.count_in(&lower) + storage.count_in(&upper)) as u64;
    assert_eq!(JobResult::sum(&results).total, expected);
    assert_eq!(scanned.len().unwrap() as u64, expected);

    // Map
    let mapped = cluster
        .caches
        .get_or_create::<bool, u64>(&StageKind::Map.cache_name("e2e"), &CacheConfig::default())
        .unwrap();
    let runner = TransformationRunner::new(cluster.dispatcher.clone(), cluster.grid.clone(), 0);
    let stage = TransformStage::new(CountEntries).with_combiner(SumCombiner);
    let result = runner
        .run(StageKind::Map, &scanned, &mapped, &stage)
        .await
        .unwrap();

    assert_eq!(result.total, expected);
    assert_eq!(mapped.entries().unwrap(), vec![(true, expected)]);
}

#[tokio::test]
async fn test_liveness_pipeline_over_the_whole_ring() {
    let cluster = two_range_cluster();
    let storage = storage();
    let total = storage.len() as u64;
    let pipeline = PipelineOrchestrator::new(
        cluster.context(Arc::new(SequenceRandom::default()), EngineConfig::default()),
    );

    let scan = ScanStage::new(KEYSPACE, storage, CopyRows);
    let map = TransformStage::new(CountEntries).with_combiner(SumCombiner);
    let output = pipeline.scan_map(&scan, &map).await.unwrap();

    assert_eq!(output.scanned, total);
    assert_eq!(output.mapped, Some(total));
    assert_eq!(output.cache.entries().unwrap(), vec![(true, total)]);
    assert_eq!(cluster.caches.cache_names(), vec![output.cache.name().to_string()]);
}
