// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use scan_map_reduce_core::{RingPartitioner, StorageReader, TokenRange, MAX_TOKEN, MIN_TOKEN};
use scan_map_reduce_storage_sled::SledStorage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Reading {
    sensor: String,
    value: f64,
}

fn reading(sensor: &str, value: f64) -> Reading {
    Reading {
        sensor: sensor.to_string(),
        value,
    }
}

fn collect(storage: &SledStorage<Reading>, range: &TokenRange) -> Vec<Reading> {
    let mut records = Vec::new();
    storage
        .scan(range, &mut |record| {
            records.push(record);
            true
        })
        .unwrap();
    records
}

fn sensors(records: &[Reading]) -> Vec<&str> {
    records.iter().map(|r| r.sensor.as_str()).collect()
}

fn populated() -> SledStorage<Reading> {
    let storage = SledStorage::temporary().unwrap();
    storage.insert(-20, &reading("a", 1.0)).unwrap();
    storage.insert(-1, &reading("b", 2.0)).unwrap();
    storage.insert(0, &reading("c", 3.0)).unwrap();
    storage.insert(0, &reading("d", 4.0)).unwrap();
    storage.insert(7, &reading("e", 5.0)).unwrap();
    storage.insert(300, &reading("f", 6.0)).unwrap();
    storage
}

#[test]
fn test_liveness_scan_returns_records_in_token_order() {
    let storage = populated();

    let records = collect(&storage, &TokenRange::closed(MIN_TOKEN, MAX_TOKEN));
    assert_eq!(sensors(&records), vec!["a", "b", "c", "d", "e", "f"]);
    assert_eq!(records[4], reading("e", 5.0));
    assert_eq!(storage.len(), 6);
}

#[test]
fn test_safety_open_start_excludes_start_token() {
    let storage = populated();

    assert_eq!(sensors(&collect(&storage, &TokenRange::open_closed(0, 7))), vec!["e"]);
    assert_eq!(sensors(&collect(&storage, &TokenRange::closed(0, 7))), vec!["c", "d", "e"]);
    assert_eq!(sensors(&collect(&storage, &TokenRange::open_closed(-20, 0))), vec!["b", "c", "d"]);
}

#[test]
fn test_safety_extreme_tokens() {
    let storage = SledStorage::temporary().unwrap();
    storage.insert(MIN_TOKEN, &reading("min", 0.0)).unwrap();
    storage.insert(MAX_TOKEN, &reading("max", 0.0)).unwrap();

    assert_eq!(sensors(&collect(&storage, &TokenRange::closed(MIN_TOKEN, 0))), vec!["min"]);
    assert!(collect(&storage, &TokenRange::open_closed(MIN_TOKEN, 0)).is_empty());
    assert_eq!(sensors(&collect(&storage, &TokenRange::open_closed(0, MAX_TOKEN))), vec!["max"]);
}

#[test]
fn test_safety_empty_range_reads_nothing() {
    let storage = populated();

    let delivered = storage
        .scan(&TokenRange::open_closed(0, 0), &mut |_| panic!("no record expected"))
        .unwrap();
    assert_eq!(delivered, 0);
}

#[test]
fn test_liveness_scan_stops_when_asked() {
    let storage = populated();
    let mut seen = 0;

    let delivered = storage
        .scan(&TokenRange::closed(MIN_TOKEN, MAX_TOKEN), &mut |_| {
            seen += 1;
            seen < 2
        })
        .unwrap();
    assert_eq!(delivered, 2);
    assert_eq!(seen, 2);
}

#[test]
fn test_safety_ring_split_reads_every_record_once() {
    let storage = SledStorage::temporary().unwrap();
    let step = u64::MAX / 97;
    for i in 0..200u64 {
        let token = (i.wrapping_mul(step)) as i64;
        storage.insert(token, &reading(&i.to_string(), i as f64)).unwrap();
    }

    let mut total = 0;
    for range in RingPartitioner::split(3, 16).unwrap() {
        total += collect(&storage, &range).len();
    }
    assert_eq!(total, 200);
}

#[test]
fn test_liveness_open_on_disk() {
    let path = std::env::temp_dir().join(format!("scan-map-reduce-sled-{}", std::process::id()));
    let storage = SledStorage::<Reading>::open(&path).unwrap();
    storage.insert(42, &reading("kept", 1.5)).unwrap();
    storage.flush().unwrap();

    assert_eq!(collect(&storage, &TokenRange::closed(0, 100)), vec![reading("kept", 1.5)]);
    assert!(collect(&storage, &TokenRange::open_closed(42, 100)).is_empty());

    drop(storage);
    let _ = std::fs::remove_dir_all(&path);
}
