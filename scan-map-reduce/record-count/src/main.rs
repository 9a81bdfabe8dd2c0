// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod config;
mod generator;
mod word_match;

use clap::Parser;
use config::Config;
use generator::{generate_random_string, generate_word};
use scan_map_reduce_core::{
    CacheManager, DistributedCache, FastrandRandom, PipelineOrchestrator, ScanStage, SumCombiner,
    TransformStage, UnionCombiner,
};
use scan_map_reduce_grid_sim::{InMemoryStorage, SimCluster};
use std::error::Error;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};
use word_match::{CountTargets, GroupByCount, Line, MatchTargets};

const KEYSPACE: &str = "lines";

/// Counts target words across lines stored on a simulated token ring.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::builder()
        .with_default_directive(if verbose { Level::DEBUG.into() } else { Level::INFO.into() })
        .from_env()?;
    let subscriber = Registry::default()
        .with(fmt::Layer::default().compact())
        .with(filter);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose)?;
    let start_time = Instant::now();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %args.config.display(), error = %e, "using default configuration");
            Config::default()
        }
    };
    info!(?config, "configuration loaded");

    let mut rng = rand::rng();
    let storage = Arc::new(InMemoryStorage::new());
    for id in 0..config.num_strings as u64 {
        let text = generate_random_string(&mut rng, config.max_string_length);
        storage.insert_keyed(&id, Line { id, text });
    }
    let targets: Vec<String> = (0..config.num_target_words)
        .map(|_| generate_word(&mut rng, config.target_word_length))
        .collect();
    info!(lines = storage.len(), targets = targets.len(), "data generated");

    let hosts: Vec<IpAddr> = (1..=config.storage_hosts.max(1))
        .map(|last| IpAddr::V4(Ipv4Addr::new(10, 0, 0, last)))
        .collect();
    let cluster = SimCluster::colocated(
        KEYSPACE,
        &hosts,
        config.vnodes_per_host,
        config.replication_factor,
    );
    let pipeline = PipelineOrchestrator::new(
        cluster.context(Arc::new(FastrandRandom), config.engine.clone()),
    );

    let scan = ScanStage::new(KEYSPACE, storage, MatchTargets::new(targets));
    let map = TransformStage::new(CountTargets).with_combiner(SumCombiner);
    let reduce = TransformStage::new(GroupByCount).with_combiner(UnionCombiner);
    let output = pipeline.scan_map_reduce(&scan, &map, &reduce).await?;

    let mut by_count = output.cache.entries()?;
    by_count.sort_by(|a, b| b.0.cmp(&a.0));

    println!("\n=== RESULTS ===");
    let mut total_occurrences = 0;
    for (count, words) in &by_count {
        total_occurrences += count * words.len() as u64;
    }
    for (count, words) in by_count.iter().take(10) {
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        println!("{}: {}", count, words.join(", "));
    }
    if by_count.len() > 10 {
        println!("... ({} more counts)", by_count.len() - 10);
    }

    println!("\nLines scanned: {}", output.scanned);
    println!("Lines matching a target: {}", output.mapped.unwrap_or(0));
    println!("Total occurrences found: {}", total_occurrences);

    cluster.caches.destroy(output.cache.name())?;
    println!("Total time: {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}
