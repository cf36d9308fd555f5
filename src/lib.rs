//! # scrapegoat: synthetic Prometheus metrics at configurable volume
//!
//! Generates plausible-looking gauges, counters, summaries and histograms
//! with randomized label dimensions and randomized values, on a periodic
//! schedule, for load-testing metrics-collection pipelines. It is a
//! traffic generator, not a monitoring system.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Factory                             │
//! │                                                             │
//! │  ┌──────────────┐   ┌──────────────┐   ┌────────────────┐   │
//! │  │ Label Space  │   │    Sample    │   │   Collector    │   │
//! │  │  (names ×    │──▶│   Generator  │──▶│ (gauge/counter │   │
//! │  │   values)    │   │ (cyclic pool)│   │  summary/hist) │   │
//! │  └──────────────┘   └──────────────┘   └────────────────┘   │
//! │          │                                     │            │
//! │          ▼                                     ▼            │
//! │  ┌──────────────┐                     ┌────────────────┐    │
//! │  │ VectorRunner │  one tokio task     │    Registry    │    │
//! │  │ (tick: full  │  per vector         │  one per       │    │
//! │  │  cartesian   │                     │  factory       │    │
//! │  │  product)    │                     └────────┬───────┘    │
//! │  └──────────────┘                              │            │
//! │                                         GET /metrics        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Key design points:
//!
//! 1. **Amortized sampling**: each vector draws a fixed pool of 4096
//!    high-precision samples once at construction and then serves them
//!    cyclically. Throughput over per-sample randomness, on purpose.
//!
//! 2. **Load is a product**: every tick emits the full cartesian product
//!    of the label space. Operators dial traffic with `label_count` and
//!    `label_cardinality`; emissions per tick grow as
//!    cardinality^label_count.
//!
//! 3. **All-or-nothing construction**: every config error (bad decimal,
//!    unknown kind, exhausted name space, registry conflict) surfaces
//!    before anything runs; a running factory has no failure modes.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use scrapegoat::{config, Factory};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), scrapegoat::Error> {
//! let cfg = config::load_file("scrapegoat.yaml".as_ref())?;
//! let shutdown = CancellationToken::new();
//! let mut factory = Factory::new(&cfg.factories[0])?;
//! let handler = factory.handler();
//! factory.run(&shutdown);
//! // mount `handler` on a router at cfg.factories[0].exposition_path
//! # Ok(())
//! # }
//! ```

pub mod cartesian;
pub mod config;
pub mod error;
pub mod factory;
pub mod labels;
pub mod sample;
pub mod summary;
pub mod vector;

pub use config::{
    Config, Distribution, ExpositionFormat, FactoryConfig, MetricKind, SampleConfig, VectorConfig,
};
pub use error::Error;
pub use factory::Factory;
pub use sample::{SampleGenerator, SAMPLE_POOL_SIZE};
pub use summary::SummaryVec;
pub use vector::{build_vector, BuiltVector, VectorRunner};
