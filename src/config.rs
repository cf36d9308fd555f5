//! YAML configuration for synthetic metric factories.
//!
//! The file schema mirrors what operators tune: one factory per exposed
//! endpoint, each with an ordered list of vector specs. Every field has a
//! default, so an empty file (or a missing one) yields a working single
//! gauge endpoint on `/metrics`.
//!
//! Enum-valued fields (`type`, `distribution`, `exposition_format`) stay
//! plain strings here and are parsed with `FromStr` at construction time,
//! so bad values surface as the typed errors in [`crate::error`] together
//! with the index of the offending vector.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Top-level config: one factory per exposed endpoint.
///
/// Unknown keys are rejected at the top and factory levels, so a typo'd
/// field name fails the load instead of silently falling back to its
/// default. Vector entries cannot get the same treatment: serde does not
/// support `deny_unknown_fields` on a struct with a flattened member,
/// and the sample fields are flattened into [`VectorConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_factories")]
    pub factories: Vec<FactoryConfig>,
}

/// One exposition endpoint and the vectors scraped through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactoryConfig {
    /// Path the handler is mounted at.
    #[serde(default = "default_exposition_path")]
    pub exposition_path: String,

    /// Wire encoding served to scrapers: "prometheus" or "openmetrics".
    #[serde(default = "default_exposition_format")]
    pub exposition_format: String,

    /// Register a scrape counter into the factory's own registry.
    #[serde(default)]
    pub instrument_handler: bool,

    #[serde(default = "default_vectors")]
    pub vectors: Vec<VectorConfig>,
}

/// One metric series family with periodic emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Metric kind: "gauge", "counter", "summary" or "histogram".
    #[serde(rename = "type", default = "default_metric_type")]
    pub kind: String,

    /// Optional prefix joined onto the randomly drawn metric name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name_prefix: String,

    /// Histogram bucket boundaries as decimal strings. Empty means the
    /// built-in default ladder.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buckets: Vec<String>,

    /// Number of label dimensions.
    #[serde(default = "default_label_count")]
    pub label_count: usize,

    /// Number of distinct values per label dimension. Emissions per tick
    /// grow as cardinality^label_count; this is the load knob.
    #[serde(default = "default_label_cardinality")]
    pub label_cardinality: usize,

    #[serde(flatten)]
    pub samples: SampleConfig,
}

/// Shape of the random samples a vector emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleConfig {
    /// "uniform" (alias "random"), "normal" or "exponential".
    #[serde(default = "default_distribution")]
    pub distribution: String,

    /// Emission period in milliseconds.
    #[serde(rename = "sample_interval_ms", default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Output decimal precision in digits.
    #[serde(rename = "sample_precision", default = "default_precision")]
    pub precision: u32,

    /// Lower bound as a decimal string. Unset means the widest
    /// representable range.
    #[serde(rename = "sample_min", default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,

    /// Upper bound as a decimal string.
    #[serde(rename = "sample_max", default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    /// Mean for the normal distribution.
    #[serde(rename = "sample_mean", default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<String>,

    /// Standard deviation for the normal distribution.
    #[serde(rename = "sample_std_dev", default, skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<String>,

    /// Rate parameter for the exponential distribution.
    #[serde(rename = "rate_parameter", default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            factories: default_factories(),
        }
    }
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            exposition_path: default_exposition_path(),
            exposition_format: default_exposition_format(),
            instrument_handler: false,
            vectors: default_vectors(),
        }
    }
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            kind: default_metric_type(),
            name_prefix: String::new(),
            buckets: Vec::new(),
            label_count: default_label_count(),
            label_cardinality: default_label_cardinality(),
            samples: SampleConfig::default(),
        }
    }
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            distribution: default_distribution(),
            interval_ms: default_interval_ms(),
            precision: default_precision(),
            min: None,
            max: None,
            mean: None,
            std_dev: None,
            rate: None,
        }
    }
}

impl SampleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_factories() -> Vec<FactoryConfig> {
    vec![FactoryConfig::default()]
}

fn default_exposition_path() -> String {
    "/metrics".to_string()
}

fn default_exposition_format() -> String {
    ExpositionFormat::Prometheus.to_string()
}

fn default_vectors() -> Vec<VectorConfig> {
    vec![VectorConfig::default()]
}

fn default_metric_type() -> String {
    MetricKind::Gauge.to_string()
}

fn default_label_count() -> usize {
    3
}

fn default_label_cardinality() -> usize {
    10
}

fn default_distribution() -> String {
    Distribution::Uniform.to_string()
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_precision() -> u32 {
    3
}

/// Parse YAML input into a [`Config`]. Empty input yields the defaults.
pub fn load(input: &str) -> Result<Config, Error> {
    if input.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(input)?)
}

/// Parse the given YAML file into a [`Config`].
///
/// A file that does not exist yields the default config, so the binary
/// runs usefully out of the box.
pub fn load_file(path: &Path) -> Result<Config, Error> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Config::default());
        }
        Err(err) => {
            return Err(Error::ConfigRead {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };
    load(&content)
}

/// Wire encoding served to scrapers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpositionFormat {
    Prometheus,
    OpenMetrics,
}

impl FromStr for ExpositionFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "prometheus" => Ok(Self::Prometheus),
            "openmetrics" => Ok(Self::OpenMetrics),
            other => Err(Error::UnknownExpositionFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExpositionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prometheus => f.write_str("prometheus"),
            Self::OpenMetrics => f.write_str("openmetrics"),
        }
    }
}

/// Kind of collector a vector drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
    Summary,
    Histogram,
}

impl FromStr for MetricKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "gauge" => Ok(Self::Gauge),
            "counter" => Ok(Self::Counter),
            "summary" => Ok(Self::Summary),
            "histogram" => Ok(Self::Histogram),
            other => Err(Error::UnknownMetricType(other.to_string())),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gauge => f.write_str("gauge"),
            Self::Counter => f.write_str("counter"),
            Self::Summary => f.write_str("summary"),
            Self::Histogram => f.write_str("histogram"),
        }
    }
}

/// Statistical distribution the samples are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    Uniform,
    Normal,
    Exponential,
}

impl FromStr for Distribution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            // "random" is the historical name for the uniform draw.
            "uniform" | "random" => Ok(Self::Uniform),
            "normal" => Ok(Self::Normal),
            "exponential" => Ok(Self::Exponential),
            other => Err(Error::UnknownDistribution(other.to_string())),
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => f.write_str("uniform"),
            Self::Normal => f.write_str("normal"),
            Self::Exponential => f.write_str("exponential"),
        }
    }
}
