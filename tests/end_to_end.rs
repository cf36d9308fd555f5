//! End-to-end: a factory built from YAML emits its full label space on
//! the paused tokio clock, and construction failures never leave a
//! partially built factory behind.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;

use scrapegoat::{config, Error, Factory};

const GAUGE_ENDPOINT: &str = r#"
factories:
  - exposition_path: /metrics
    exposition_format: prometheus
    vectors:
      - type: gauge
        label_count: 1
        label_cardinality: 2
        distribution: uniform
        sample_interval_ms: 100
        sample_precision: 2
        sample_min: "0"
        sample_max: "1"
"#;

#[tokio::test(start_paused = true)]
async fn one_gauge_vector_emits_two_series_in_range_after_one_tick() {
    let cfg = config::load(GAUGE_ENDPOINT).expect("parse config");
    let mut rng = StdRng::seed_from_u64(7);
    let mut factory = Factory::with_rng(&cfg.factories[0], &mut rng).expect("build factory");
    let registry = factory.registry();

    let shutdown = CancellationToken::new();
    factory.run(&shutdown);

    // The paused clock auto-advances through the first tick.
    tokio::time::sleep(Duration::from_millis(10)).await;
    shutdown.cancel();
    tokio::time::sleep(Duration::from_millis(1)).await;

    let families = registry.gather();
    assert_eq!(families.len(), 1, "expected one metric family");
    let family = &families[0];
    assert_eq!(family.get_metric().len(), 2, "expected two time series");
    for metric in family.get_metric() {
        let value = metric.get_gauge().get_value();
        assert!((0.0..=1.0).contains(&value), "out of range: {value}");
        let scaled = value * 100.0;
        assert!(
            (scaled - scaled.round()).abs() < 1e-9,
            "more than 2 decimal digits: {value}"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn cancelled_runners_stop_emitting() {
    let cfg = config::load(GAUGE_ENDPOINT).expect("parse config");
    let mut rng = StdRng::seed_from_u64(7);
    let mut factory = Factory::with_rng(&cfg.factories[0], &mut rng).expect("build factory");
    let registry = factory.registry();

    let shutdown = CancellationToken::new();
    factory.run(&shutdown);
    tokio::time::sleep(Duration::from_millis(10)).await;
    shutdown.cancel();
    tokio::time::sleep(Duration::from_millis(1)).await;

    let before = prometheus::TextEncoder::new()
        .encode_to_string(&registry.gather())
        .expect("encode");
    // Several intervals later nothing new has been written.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let after = prometheus::TextEncoder::new()
        .encode_to_string(&registry.gather())
        .expect("encode");
    assert_eq!(before, after);
}

#[test]
fn invalid_vector_spec_prevents_factory_construction() {
    let input = r#"
factories:
  - vectors:
      - type: gauge
        label_count: 1
        label_cardinality: 2
        distribution: normal
        sample_std_dev: "1"
"#;
    let cfg = config::load(input).expect("parse config");
    let mut rng = StdRng::seed_from_u64(7);
    let err = Factory::with_rng(&cfg.factories[0], &mut rng).unwrap_err();
    match err {
        Error::Vector { index, source } => {
            assert_eq!(index, 0);
            assert!(matches!(
                *source,
                Error::InvalidParameter {
                    field: "sample_mean",
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}
