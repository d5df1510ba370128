//! Benchmarks for local-fallback search.
//!
//! Uses 2,000 synthetic match records by default. Set `BENCH_FULL_SCALE=1`
//! to run against 50,000 records, roughly the size of the full match
//! history across all competitions:
//!
//! ```bash
//! BENCH_FULL_SCALE=1 cargo bench -p golazo-vector
//! ```
//!
//! The engine is disabled throughout, so every query takes the brute-force
//! cosine path.

use std::time::Duration;

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use golazo_core::config::SearchConfig;
use golazo_core::types::{Competition, Match};
use golazo_vector::adapters::MatchFilter;
use golazo_vector::embedding::{Embedder, HashingEmbedder};
use golazo_vector::index::LocalIndex;
use golazo_vector::store::VectorStore;

const CI_RECORD_COUNT: usize = 2_000;
const FULL_SCALE_RECORD_COUNT: usize = 50_000;
const DIMENSION: usize = 384;

const TEAMS: [&str; 8] = [
    "Flamengo",
    "Palmeiras",
    "Corinthians",
    "Sao Paulo",
    "Santos",
    "Gremio",
    "Internacional",
    "Atletico Mineiro",
];

fn record_count() -> usize {
    if std::env::var("BENCH_FULL_SCALE").is_ok() {
        FULL_SCALE_RECORD_COUNT
    } else {
        CI_RECORD_COUNT
    }
}

fn synthetic_match(i: usize) -> Match {
    let competition = match i % 3 {
        0 => Competition::Brasileirao,
        1 => Competition::CopaDoBrasil,
        _ => Competition::Libertadores,
    };
    Match {
        match_date: NaiveDate::from_ymd_opt(2012 + (i % 12) as i32, 1 + (i % 12) as u32, 1 + (i % 28) as u32)
            .and_then(|d| d.and_hms_opt(16, 0, 0)),
        home_team: TEAMS[i % TEAMS.len()].to_string(),
        away_team: TEAMS[(i / TEAMS.len() + 1 + i) % TEAMS.len()].to_string(),
        home_goals: (i % 5) as u32,
        away_goals: (i % 3) as u32,
        season: Some(2012 + (i % 12) as i32),
        match_round: Some(1 + (i % 38) as u32),
        competition,
        ..Default::default()
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime")
}

fn build_store(rt: &tokio::runtime::Runtime, count: usize) -> VectorStore {
    let mut store = VectorStore::local(
        Embedder::Hashing(HashingEmbedder::new(DIMENSION)),
        &SearchConfig::default(),
    );
    let matches: Vec<Match> = (0..count).map(synthetic_match).collect();
    rt.block_on(store.index_matches(&matches))
        .expect("indexing failed");
    assert_eq!(store.len(), count);
    store
}

/// Raw ranking over the dense matrix, no embedding or filtering.
fn bench_rank(c: &mut Criterion) {
    let count = record_count();
    let rt = runtime();
    let store = build_store(&rt, count);

    let mut index = LocalIndex::new(DIMENSION);
    index
        .rebuild(store.entries().iter().map(|e| e.vector.as_slice()))
        .expect("rebuild failed");
    let query = store.entries()[count / 2].vector.clone();

    let mut group = c.benchmark_group("local_rank");
    group.measurement_time(Duration::from_secs(10));
    group.bench_function(format!("rank_{}records", count), |b| {
        b.iter(|| index.rank(black_box(&query)).expect("rank failed"));
    });
    group.finish();
}

/// Full store search: embed the query, rank, walk with a filter.
fn bench_store_search(c: &mut Criterion) {
    let count = record_count();
    let rt = runtime();
    let mut store = build_store(&rt, count);

    let mut group = c.benchmark_group("store_search");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function(format!("unfiltered_top10_{}records", count), |b| {
        b.iter(|| {
            let hits = rt
                .block_on(store.search("Flamengo vs Palmeiras", 10))
                .expect("search failed");
            assert_eq!(hits.len(), 10);
            hits
        });
    });

    let filter = MatchFilter {
        competition: Some(Competition::Libertadores),
        season: Some(2019),
    };
    group.bench_function(format!("filtered_top10_{}records", count), |b| {
        b.iter(|| {
            rt.block_on(store.search_matches("Gremio final", 10, &filter))
                .expect("search failed")
        });
    });

    group.finish();
}

criterion_group!(benches, bench_rank, bench_store_search);
criterion_main!(benches);
