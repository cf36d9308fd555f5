//! Error types for scrapegoat.
//!
//! Every error here is surfaced synchronously from a construction-time
//! call (config load, vector build, factory build). Once a factory is
//! running there is nothing left to fail: all inputs were validated up
//! front and periodic emission always succeeds.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading configuration or building factories.
#[derive(Debug, Error)]
pub enum Error {
    /// A required decimal parameter is missing or failed to parse.
    #[error("invalid {field}: {reason}")]
    InvalidParameter {
        field: &'static str,
        reason: String,
    },

    /// The configured sample distribution is not one we know.
    #[error("unknown distribution {0:?}")]
    UnknownDistribution(String),

    /// The configured metric type is not one we know.
    #[error("unknown metric type {0:?}")]
    UnknownMetricType(String),

    /// The configured exposition format is not one we know.
    #[error("unknown exposition format {0:?}")]
    UnknownExpositionFormat(String),

    /// A configured histogram bucket boundary failed to parse.
    #[error("invalid bucket limit {value:?}: {reason}")]
    InvalidBucket { value: String, reason: String },

    /// Unique name generation ran out of retries before satisfying the
    /// requested count.
    #[error("label generation exhausted while drawing {0}; reduce label_count or label_cardinality")]
    LabelGenerationExhausted(&'static str),

    /// Error building a collector (bad descriptor, duplicate labels, ...).
    #[error("build collector: {0}")]
    Collector(#[from] prometheus::Error),

    /// Two vectors resolved to a colliding metric identity in one registry.
    #[error("register collector: {0}")]
    CollectorRegistration(prometheus::Error),

    /// A vector failed to build; carries the index so the operator can
    /// find the offending entry in the config.
    #[error("vector {index}: {source}")]
    Vector {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// A factory failed to build.
    #[error("factory {index}: {source}")]
    Factory {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// Error reading the config file.
    #[error("read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing the config file.
    #[error("parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// I/O error from the HTTP listener.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap an error with the index of the vector it occurred in.
    pub fn in_vector(self, index: usize) -> Self {
        Error::Vector {
            index,
            source: Box::new(self),
        }
    }

    /// Wrap an error with the index of the factory it occurred in.
    pub fn in_factory(self, index: usize) -> Self {
        Error::Factory {
            index,
            source: Box::new(self),
        }
    }
}
