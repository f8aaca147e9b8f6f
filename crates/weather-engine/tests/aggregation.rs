//! End-to-end aggregation tests against the in-memory store.
//!
//! Covers the documented scenario, the counter/average/extremum laws over
//! randomized streams, ranking determinism, and the inconsistency window
//! between the transactional increment and the average recompute.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use weather_engine::average::format_average;
use weather_engine::{AggregationEngine, EngineConfig};
use weather_store::{Increment, MemoryStore, MetricStore};
use weather_types::{ConditionVocabulary, ObservationEvent};

const REGIONS: [&str; 3] = ["mixco", "guatemala", "amatitlan"];
const CONDITIONS: [&str; 5] = ["sunny", "rainy", "cloudy", "foggy", "hail"];

fn engine() -> AggregationEngine<MemoryStore> {
    AggregationEngine::new(MemoryStore::new(), EngineConfig::default())
}

fn int(store: &MemoryStore, key: &str) -> i64 {
    store.peek(key).unwrap().parse().unwrap()
}

fn random_events(seed: u64, n: usize) -> Vec<ObservationEvent> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            ObservationEvent::new(
                REGIONS[rng.random_range(0..REGIONS.len())],
                rng.random_range(-40..=45),
                rng.random_range(-5..=105),
                CONDITIONS[rng.random_range(0..CONDITIONS.len())],
            )
        })
        .collect()
}

#[tokio::test]
async fn two_event_scenario() {
    let engine = engine();
    engine
        .apply(&ObservationEvent::new("X", 10, 50, "sunny"))
        .await;
    engine
        .apply(&ObservationEvent::new("X", 20, 70, "rainy"))
        .await;

    let store = engine.store();
    assert_eq!(int(store, "municipality:X:count"), 2);
    assert_eq!(int(store, "municipality:X:temperature_sum"), 30);
    assert_eq!(int(store, "municipality:X:humidity_sum"), 120);
    assert_eq!(store.peek("municipality:X:temperature:avg").as_deref(), Some("15.00"));
    assert_eq!(store.peek("municipality:X:humedad:avg").as_deref(), Some("60.00"));
    assert_eq!(int(store, "metrics:temperature:max"), 20);
    assert_eq!(int(store, "metrics:temperature:min"), 10);
    assert_eq!(int(store, "metrics:humedad:max"), 70);
    assert_eq!(int(store, "metrics:humedad:min"), 50);
    assert_eq!(int(store, "weather:X:condition:sunny"), 1);
    assert_eq!(int(store, "weather:X:condition:rainy"), 1);
    // sunny and rainy tie at 1; sunny comes first in the vocabulary.
    assert_eq!(
        store.peek("municipality:X:weather:most_common").as_deref(),
        Some("sunny")
    );
    assert_eq!(
        store.peek("municipality:X:weather:least_common").as_deref(),
        Some("cloudy")
    );
}

#[tokio::test]
async fn condition_counter_equals_event_count() {
    let engine = engine();
    let event = ObservationEvent::new("chinautla", 17, 80, "foggy");
    for _ in 0..250 {
        assert!(engine.apply(&event).await.is_clean());
    }
    let store = engine.store();
    assert_eq!(int(store, "weather:chinautla:condition:foggy"), 250);
    assert_eq!(int(store, "municipality:chinautla:count"), 250);
    assert_eq!(int(store, "clima:foggy:count"), 250);
}

#[tokio::test]
async fn randomized_stream_keeps_every_law() {
    for seed in [1_u64, 7, 42, 2024] {
        let engine = engine();
        let events = random_events(seed, 300);
        for event in &events {
            assert!(engine.apply(event).await.is_clean());
        }
        let store = engine.store();

        let max_t = events.iter().map(|e| i64::from(e.temperature)).max().unwrap();
        let min_t = events.iter().map(|e| i64::from(e.temperature)).min().unwrap();
        let max_h = events.iter().map(|e| i64::from(e.humidity)).max().unwrap();
        let min_h = events.iter().map(|e| i64::from(e.humidity)).min().unwrap();
        assert_eq!(int(store, "metrics:temperature:max"), max_t, "seed {seed}");
        assert_eq!(int(store, "metrics:temperature:min"), min_t, "seed {seed}");
        assert_eq!(int(store, "metrics:humedad:max"), max_h, "seed {seed}");
        assert_eq!(int(store, "metrics:humedad:min"), min_h, "seed {seed}");

        let mut pairs: BTreeMap<(&str, &str), i64> = BTreeMap::new();
        for event in &events {
            *pairs
                .entry((event.region.as_str(), event.condition.as_str()))
                .or_default() += 1;
        }
        for ((region, condition), expected) in pairs {
            assert_eq!(
                int(store, &format!("weather:{region}:condition:{condition}")),
                expected
            );
        }

        for region in REGIONS {
            let Some(count) = store.peek(&format!("municipality:{region}:count")) else {
                continue;
            };
            let count: i64 = count.parse().unwrap();
            let sum = int(store, &format!("municipality:{region}:temperature_sum"));
            assert_eq!(
                store.peek(&format!("municipality:{region}:temperature:avg")),
                format_average(sum, count),
                "seed {seed} region {region}"
            );
            let hum_sum = int(store, &format!("municipality:{region}:humidity_sum"));
            assert_eq!(
                store.peek(&format!("municipality:{region}:humedad:avg")),
                format_average(hum_sum, count),
            );
        }
    }
}

#[tokio::test]
async fn repeated_and_negative_extrema() {
    let engine = engine();
    for temperature in [-5, -5, -12, 3, -12, 3] {
        engine
            .apply(&ObservationEvent::new("mixco", temperature, 0, "rainy"))
            .await;
    }
    let store = engine.store();
    assert_eq!(int(store, "metrics:temperature:max"), 3);
    assert_eq!(int(store, "metrics:temperature:min"), -12);
    assert_eq!(int(store, "metrics:humedad:max"), 0);
    assert_eq!(int(store, "metrics:humedad:min"), 0);
}

#[tokio::test]
async fn ranking_tie_break_is_deterministic_across_runs() {
    let vocabulary = ConditionVocabulary::parse_list("rainy,sunny,cloudy").unwrap();
    for _ in 0..5 {
        let engine = AggregationEngine::new(
            MemoryStore::new(),
            EngineConfig::new(vocabulary.clone()),
        );
        engine.apply(&ObservationEvent::new("X", 1, 1, "sunny")).await;
        let report = engine.apply(&ObservationEvent::new("X", 1, 1, "rainy")).await;
        let ranking = report.ranking().unwrap();
        assert_eq!(ranking.most_common, "rainy");
        assert_eq!(ranking.least_common, "cloudy");
    }
}

#[tokio::test]
async fn ranking_recompute_is_idempotent() {
    let engine = engine();
    for condition in ["cloudy", "cloudy", "rainy", "hail", "hail", "hail"] {
        engine.apply(&ObservationEvent::new("X", 1, 1, condition)).await;
    }
    let first = engine.recompute_ranking("X").await.unwrap();
    let snapshot = engine.store().snapshot();
    let second = engine.recompute_ranking("X").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(snapshot, engine.store().snapshot());
    let ranking = second.unwrap();
    // hail is counted but outside the vocabulary.
    assert_eq!(ranking.most_common, "cloudy");
    assert_eq!(ranking.least_common, "sunny");
    assert_eq!(int(engine.store(), "weather:X:condition:hail"), 3);
}

#[tokio::test]
async fn unrelated_regions_are_isolated() {
    let engine = engine();
    engine.apply(&ObservationEvent::new("mixco", 30, 40, "sunny")).await;
    engine.apply(&ObservationEvent::new("guatemala", 10, 90, "rainy")).await;

    let store = engine.store();
    assert_eq!(int(store, "municipality:mixco:count"), 1);
    assert_eq!(store.peek("municipality:mixco:temperature:avg").as_deref(), Some("30.00"));
    assert_eq!(store.peek("municipality:guatemala:temperature:avg").as_deref(), Some("10.00"));
    assert_eq!(store.peek("weather:mixco:condition:rainy"), None);
}

#[tokio::test(start_paused = true)]
async fn average_lags_sum_and_count_during_recompute_window() {
    let store = MemoryStore::new();
    let config = EngineConfig::default().with_recompute_delay(Duration::from_millis(50));
    let engine = Arc::new(AggregationEngine::new(store.clone(), config));

    engine.apply(&ObservationEvent::new("X", 10, 50, "sunny")).await;
    assert_eq!(store.peek("municipality:X:temperature:avg").as_deref(), Some("10.00"));

    let task = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move {
            engine
                .apply(&ObservationEvent::new("X", 20, 70, "rainy"))
                .await
        }
    });

    // The spawned apply is parked in the window after its temperature
    // transaction and before the recompute.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(store.peek("municipality:X:temperature:sum").as_deref(), Some("30"));
    assert_eq!(store.peek("municipality:X:temperature:count").as_deref(), Some("2"));
    assert_eq!(store.peek("municipality:X:temperature:avg").as_deref(), Some("10.00"));

    let report = task.await.unwrap();
    assert!(report.is_clean());
    assert_eq!(store.peek("municipality:X:temperature:avg").as_deref(), Some("15.00"));
}

#[tokio::test(start_paused = true)]
async fn concurrent_writer_in_window_is_folded_into_recompute() {
    let store = MemoryStore::new();
    let config = EngineConfig::default().with_recompute_delay(Duration::from_millis(50));
    let engine = Arc::new(AggregationEngine::new(store.clone(), config));

    let task = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move {
            engine
                .apply(&ObservationEvent::new("X", 20, 70, "rainy"))
                .await
        }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    // A second writer commits its own pair inside the window.
    store
        .transaction(&[
            Increment::by("municipality:X:temperature:sum", 100),
            Increment::one("municipality:X:temperature:count"),
        ])
        .await
        .unwrap();

    task.await.unwrap();
    // The recompute sees both contributions, while the step-2 totals only
    // saw this engine's event: the documented best-effort window.
    assert_eq!(store.peek("municipality:X:temperature:avg").as_deref(), Some("60.00"));
    assert_eq!(int(&store, "municipality:X:temperature_sum"), 20);
    assert_eq!(int(&store, "municipality:X:count"), 1);
}

#[tokio::test]
async fn dashboard_keys_are_written() {
    let engine = engine();
    engine
        .apply(&ObservationEvent::new("mixco", 22, 65, "sunny"))
        .await;

    let store = engine.store();
    assert_eq!(int(store, "metrics:humedad:max"), 65);
    assert_eq!(int(store, "metrics:humedad:min"), 65);
    assert_eq!(store.peek("municipality:mixco:humedad:avg").as_deref(), Some("65.00"));
    assert_eq!(int(store, "temperatura:mixco:22"), 1);
    assert_eq!(int(store, "municipality:mixco:humidity_sum"), 65);
    assert_eq!(int(store, "municipality:mixco:humidity"), 65);
    assert_eq!(store.peek("metrics:humidity:max"), None);
}
