//! Factory: many vectors, one registry, one lifecycle.
//!
//! Construction is all-or-nothing: every configured vector is built and
//! registered into a private registry, and the first failure aborts the
//! whole factory with the failing vector's index attached. Once built,
//! the registry is only ever read (scraped), so serving needs no
//! synchronization with construction.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, MethodRouter};
use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{ExpositionFormat, FactoryConfig};
use crate::error::Error;
use crate::vector::{build_vector, VectorRunner};

const OPENMETRICS_CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// An ordered collection of vectors sharing one exposition registry and
/// one shutdown signal.
pub struct Factory {
    registry: Registry,
    format: ExpositionFormat,
    runners: Vec<VectorRunner>,
    scrapes: Option<IntCounter>,
}

impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl Factory {
    /// Build every configured vector with the process random source.
    pub fn new(cfg: &FactoryConfig) -> Result<Self, Error> {
        Self::with_rng(cfg, &mut rand::rng())
    }

    /// Build every configured vector from an injected random source, so
    /// construction is reproducible under a fixed seed.
    pub fn with_rng<R: Rng + ?Sized>(cfg: &FactoryConfig, rng: &mut R) -> Result<Self, Error> {
        let format: ExpositionFormat = cfg.exposition_format.parse()?;
        let registry = Registry::new();
        let mut runners = Vec::with_capacity(cfg.vectors.len());
        for (index, vector_cfg) in cfg.vectors.iter().enumerate() {
            info!(index, total = cfg.vectors.len(), "constructing vector");
            let built = build_vector(vector_cfg, rng).map_err(|err| err.in_vector(index))?;
            registry
                .register(built.collector)
                .map_err(|err| Error::CollectorRegistration(err).in_vector(index))?;
            runners.push(built.runner);
        }

        let scrapes = if cfg.instrument_handler {
            let counter = IntCounter::with_opts(Opts::new(
                "metric_handler_requests_total",
                "Total scrapes served by this handler",
            ))?;
            registry.register(Box::new(counter.clone()))?;
            Some(counter)
        } else {
            None
        };

        Ok(Self {
            registry,
            format,
            runners,
            scrapes,
        })
    }

    /// The registry all of this factory's collectors live in.
    pub fn registry(&self) -> Registry {
        self.registry.clone()
    }

    /// Number of vectors not yet launched.
    pub fn vector_count(&self) -> usize {
        self.runners.len()
    }

    /// A GET handler serializing the registry's current state in the
    /// configured exposition format.
    pub fn handler(&self) -> MethodRouter {
        let registry = self.registry.clone();
        let format = self.format;
        let scrapes = self.scrapes.clone();
        get(move || {
            let registry = registry.clone();
            let scrapes = scrapes.clone();
            async move {
                if let Some(scrapes) = &scrapes {
                    scrapes.inc();
                }
                render(&registry, format)
            }
        })
    }

    /// Launch one independent scheduling loop per vector, all observing
    /// the same shutdown token. Does not block.
    pub fn run(&mut self, shutdown: &CancellationToken) {
        for runner in self.runners.drain(..) {
            tokio::spawn(runner.run(shutdown.clone()));
        }
    }
}

fn render(registry: &Registry, format: ExpositionFormat) -> Response {
    match encode(registry, format) {
        Ok((content_type, body)) => {
            ([(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

/// Serialize the registry in the requested exposition format.
///
/// The OpenMetrics body is the Prometheus text rendering plus the
/// mandatory `# EOF` terminator, not a full OpenMetrics encoding:
/// counter families keep their `_total` suffix in the `# TYPE` line,
/// which a strict OpenMetrics parser rejects even though Prometheus
/// accepts it.
fn encode(
    registry: &Registry,
    format: ExpositionFormat,
) -> Result<(&'static str, Vec<u8>), prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    let content_type = match format {
        ExpositionFormat::Prometheus => prometheus::TEXT_FORMAT,
        ExpositionFormat::OpenMetrics => {
            // The OpenMetrics text format is the Prometheus text format
            // plus a mandatory stream terminator.
            buffer.extend_from_slice(b"# EOF\n");
            OPENMETRICS_CONTENT_TYPE
        }
    };
    Ok((content_type, buffer))
}
