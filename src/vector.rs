//! Vector construction: one collector plus one periodic runner.
//!
//! A vector binds three things built at construction time: a label space
//! (unique names, unique values per name), a sample generator, and a
//! kind-specific collector registered by the enclosing factory. The
//! runner then re-walks the full cartesian product of the label space on
//! every tick, writing one fresh sample per assignment.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use prometheus::core::Collector;
use prometheus::{CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cartesian::for_each_assignment;
use crate::config::{MetricKind, VectorConfig};
use crate::error::Error;
use crate::labels;
use crate::sample::SampleGenerator;
use crate::summary::SummaryVec;

type EmitFn = Box<dyn Fn(&[&str]) + Send + Sync>;

/// A freshly built vector: the collector to register and the runner that
/// will drive it.
pub struct BuiltVector {
    pub collector: Box<dyn Collector>,
    pub runner: VectorRunner,
}

impl std::fmt::Debug for BuiltVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltVector")
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}

/// Periodic emission loop for one vector.
pub struct VectorRunner {
    name: String,
    interval: Duration,
    label_values: Vec<Vec<String>>,
    emit: EmitFn,
}

impl std::fmt::Debug for VectorRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorRunner")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("label_values", &self.label_values)
            .finish_non_exhaustive()
    }
}

impl VectorRunner {
    /// The metric identifier this runner feeds.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct series emitted per tick: the product of all dimension
    /// cardinalities.
    pub fn series_count(&self) -> usize {
        self.label_values
            .iter()
            .fold(1usize, |product, dimension| {
                product.saturating_mul(dimension.len())
            })
    }

    /// Run one full cartesian enumeration, emitting one sample per label
    /// assignment.
    pub fn emit_once(&self) {
        for_each_assignment(&self.label_values, |assignment| (self.emit)(assignment));
    }

    /// Emit on a fixed interval until `shutdown` fires.
    ///
    /// Cancellation is observed only at tick boundaries: an enumeration
    /// already in progress runs to completion, and after the token fires
    /// nothing is emitted again. If one tick's enumeration overruns the
    /// interval, missed ticks are skipped rather than queued, so two
    /// enumerations never overlap.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            vector = %self.name,
            interval_ms = self.interval.as_millis() as u64,
            series = self.series_count(),
            "vector runner started"
        );
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!(vector = %self.name, "vector runner stopped");
                    return;
                }
                _ = ticker.tick() => self.emit_once(),
            }
        }
    }
}

/// Build the label space, sample generator, collector and emit binding
/// for one vector spec.
pub fn build_vector<R: Rng + ?Sized>(cfg: &VectorConfig, rng: &mut R) -> Result<BuiltVector, Error> {
    let kind = MetricKind::from_str(&cfg.kind)?;
    if cfg.samples.interval_ms == 0 {
        return Err(Error::InvalidParameter {
            field: "sample_interval_ms",
            reason: "must be positive".to_string(),
        });
    }

    let label_names = labels::generate_unique_names(rng, cfg.label_count)
        .ok_or(Error::LabelGenerationExhausted("label names"))?;
    let mut label_values = Vec::with_capacity(cfg.label_count);
    for _ in 0..cfg.label_count {
        let values = labels::generate_unique_names(rng, cfg.label_cardinality)
            .ok_or(Error::LabelGenerationExhausted("label values"))?;
        label_values.push(values);
    }

    let generator = Arc::new(SampleGenerator::new(&cfg.samples, rng)?);

    let mut name = labels::random_name(rng);
    if !cfg.name_prefix.is_empty() {
        name = format!("{}_{}", cfg.name_prefix.trim_end_matches('_'), name);
    }
    if kind == MetricKind::Counter {
        name.push_str("_total");
    }

    // Constant labels record the shape knobs, so a scrape alone tells an
    // operator what load it represents.
    let const_labels: HashMap<String, String> = [
        ("type".to_string(), cfg.kind.clone()),
        ("precision".to_string(), cfg.samples.precision.to_string()),
        ("label_count".to_string(), cfg.label_count.to_string()),
        (
            "label_cardinality".to_string(),
            cfg.label_cardinality.to_string(),
        ),
    ]
    .into_iter()
    .collect();

    let label_refs: Vec<&str> = label_names.iter().map(String::as_str).collect();
    let (collector, emit): (Box<dyn Collector>, EmitFn) = match kind {
        MetricKind::Gauge => {
            let vec = GaugeVec::new(
                Opts::new(&name, "Arbitrarily-generated gauge metrics")
                    .const_labels(const_labels),
                &label_refs,
            )?;
            let writer = vec.clone();
            let generator = generator.clone();
            (
                Box::new(vec),
                Box::new(move |assignment| {
                    writer.with_label_values(assignment).set(generator.get());
                }),
            )
        }
        MetricKind::Counter => {
            let vec = CounterVec::new(
                Opts::new(&name, "Arbitrarily-generated counter metrics")
                    .const_labels(const_labels),
                &label_refs,
            )?;
            let writer = vec.clone();
            let generator = generator.clone();
            (
                Box::new(vec),
                Box::new(move |assignment| {
                    // Counters reject negative deltas.
                    writer
                        .with_label_values(assignment)
                        .inc_by(generator.get().max(0.0));
                }),
            )
        }
        MetricKind::Summary => {
            let vec = SummaryVec::new(
                Opts::new(&name, "Arbitrarily-generated summary metrics")
                    .const_labels(const_labels),
                &label_refs,
            )?;
            let writer = vec.clone();
            let generator = generator.clone();
            (
                Box::new(vec),
                Box::new(move |assignment| {
                    writer.observe(assignment, generator.get());
                }),
            )
        }
        MetricKind::Histogram => {
            let vec = HistogramVec::new(
                HistogramOpts::new(&name, "Arbitrarily-generated histogram metrics")
                    .const_labels(const_labels)
                    .buckets(resolve_buckets(&cfg.buckets)?),
                &label_refs,
            )?;
            let writer = vec.clone();
            let generator = generator.clone();
            (
                Box::new(vec),
                Box::new(move |assignment| {
                    writer.with_label_values(assignment).observe(generator.get());
                }),
            )
        }
    };

    info!(
        kind = %kind,
        name = %name,
        labels = ?label_names,
        cardinality = cfg.label_cardinality,
        precision = cfg.samples.precision,
        "vector constructed"
    );

    Ok(BuiltVector {
        collector,
        runner: VectorRunner {
            name,
            interval: cfg.samples.interval(),
            label_values,
            emit,
        },
    })
}

/// Parse configured bucket boundaries, or fall back to the default
/// ladder. Boundaries are sorted ascending and deduplicated, since the
/// collector rejects non-monotonic bucket lists.
fn resolve_buckets(raw: &[String]) -> Result<Vec<f64>, Error> {
    if raw.is_empty() {
        return Ok(prometheus::DEFAULT_BUCKETS.to_vec());
    }
    let mut buckets = Vec::with_capacity(raw.len());
    for value in raw {
        let boundary = value
            .parse::<Decimal>()
            .map_err(|err| Error::InvalidBucket {
                value: value.clone(),
                reason: err.to_string(),
            })?;
        buckets.push(boundary.to_f64().unwrap_or(f64::MAX));
    }
    buckets.sort_by(f64::total_cmp);
    buckets.dedup();
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SampleConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn vector_config(kind: &str) -> VectorConfig {
        VectorConfig {
            kind: kind.to_string(),
            label_count: 2,
            label_cardinality: 3,
            samples: SampleConfig {
                min: Some("0".to_string()),
                max: Some("1".to_string()),
                ..SampleConfig::default()
            },
            ..VectorConfig::default()
        }
    }

    #[test]
    fn gauge_emission_covers_the_label_space() {
        let mut rng = StdRng::seed_from_u64(7);
        let built = build_vector(&vector_config("gauge"), &mut rng).expect("build");
        assert_eq!(built.runner.series_count(), 9);

        built.runner.emit_once();
        let families = built.collector.collect();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].get_metric().len(), 9);
        for metric in families[0].get_metric() {
            let value = metric.get_gauge().get_value();
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn emission_is_idempotent_in_series_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let built = build_vector(&vector_config("summary"), &mut rng).expect("build");
        built.runner.emit_once();
        built.runner.emit_once();
        let families = built.collector.collect();
        assert_eq!(families[0].get_metric().len(), 9);
        for metric in families[0].get_metric() {
            assert_eq!(metric.get_summary().get_sample_count(), 2);
        }
    }

    #[test]
    fn counter_names_get_the_total_suffix() {
        let mut rng = StdRng::seed_from_u64(7);
        let built = build_vector(&vector_config("counter"), &mut rng).expect("build");
        assert!(built.runner.name().ends_with("_total"));
        let families = built.collector.collect();
        assert!(families[0].get_name().ends_with("_total"));
    }

    #[test]
    fn counter_never_decreases_on_negative_samples() {
        let mut cfg = vector_config("counter");
        cfg.samples.min = Some("-10".to_string());
        cfg.samples.max = Some("-5".to_string());
        let mut rng = StdRng::seed_from_u64(7);
        let built = build_vector(&cfg, &mut rng).expect("build");
        built.runner.emit_once();
        for metric in built.collector.collect()[0].get_metric() {
            assert_eq!(metric.get_counter().get_value(), 0.0);
        }
    }

    #[test]
    fn name_prefix_is_joined_with_one_underscore() {
        let mut cfg = vector_config("gauge");
        cfg.name_prefix = "synthetic_".to_string();
        let mut rng = StdRng::seed_from_u64(7);
        let built = build_vector(&cfg, &mut rng).expect("build");
        assert!(built.runner.name().starts_with("synthetic_"));
        assert!(!built.runner.name().starts_with("synthetic__"));
    }

    #[test]
    fn configured_buckets_are_parsed_and_sorted() {
        let mut cfg = vector_config("histogram");
        cfg.buckets = vec!["2.5".to_string(), "0.1".to_string(), "0.5".to_string()];
        let mut rng = StdRng::seed_from_u64(7);
        let built = build_vector(&cfg, &mut rng).expect("build");
        built.runner.emit_once();
        let families = built.collector.collect();
        let buckets = families[0].get_metric()[0].get_histogram().get_bucket();
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].get_upper_bound(), 0.1);
        assert_eq!(buckets[2].get_upper_bound(), 2.5);
    }

    #[test]
    fn unparsable_bucket_is_rejected() {
        let mut cfg = vector_config("histogram");
        cfg.buckets = vec!["tiny".to_string()];
        let mut rng = StdRng::seed_from_u64(7);
        let err = build_vector(&cfg, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InvalidBucket { value, .. } if value == "tiny"));
    }

    #[test]
    fn unknown_metric_type_is_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = build_vector(&vector_config("meter"), &mut rng).unwrap_err();
        assert!(matches!(err, Error::UnknownMetricType(kind) if kind == "meter"));
    }

    #[test]
    fn oversized_label_request_is_rejected() {
        let mut cfg = vector_config("gauge");
        cfg.label_count = 100_000;
        let mut rng = StdRng::seed_from_u64(7);
        let err = build_vector(&cfg, &mut rng).unwrap_err();
        assert!(matches!(err, Error::LabelGenerationExhausted(_)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut cfg = vector_config("gauge");
        cfg.samples.interval_ms = 0;
        let mut rng = StdRng::seed_from_u64(7);
        let err = build_vector(&cfg, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidParameter { field: "sample_interval_ms", .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn runner_stops_on_cancellation() {
        let mut rng = StdRng::seed_from_u64(7);
        let built = build_vector(&vector_config("gauge"), &mut rng).expect("build");
        let token = CancellationToken::new();
        let handle = tokio::spawn(built.runner.run(token.clone()));
        tokio::time::sleep(Duration::from_millis(1)).await;
        token.cancel();
        handle.await.expect("runner task");
    }
}
