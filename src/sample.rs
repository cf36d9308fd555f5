//! Bounded-precision random sample generation.
//!
//! A [`SampleGenerator`] eagerly draws a fixed pool of samples at
//! construction time and then serves them cyclically. High-precision
//! distribution math (decimal arithmetic, clamping, rounding) runs once
//! per pool slot instead of once per emission; a vector emitting millions
//! of samples per tick pays only an index advance per value. The pool is
//! therefore periodic: callers must not assume successive `get()` calls
//! are independent draws. That trade is deliberate and observable.
//!
//! All arithmetic is done in [`rust_decimal::Decimal`] so that rounding
//! to the configured precision is exact and does not drift the way
//! repeated binary floating-point rounding would.

use std::sync::Mutex;

use rand::Rng;
use rand_distr::{Exp1, StandardNormal};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::config::{Distribution, SampleConfig};
use crate::error::Error;

/// Number of samples drawn up front per generator.
pub const SAMPLE_POOL_SIZE: usize = 4096;

/// A fixed cyclic pool of pregenerated samples with a rotating cursor.
#[derive(Debug)]
pub struct SampleGenerator {
    samples: Vec<f64>,
    cursor: Mutex<usize>,
}

impl SampleGenerator {
    /// Resolve the distribution parameters and eagerly fill the pool.
    ///
    /// Fails with [`Error::InvalidParameter`] when a required decimal
    /// string is missing or unparsable, and [`Error::UnknownDistribution`]
    /// for an unrecognized distribution name. After construction no
    /// distribution computation happens again.
    pub fn new<R: Rng + ?Sized>(cfg: &SampleConfig, rng: &mut R) -> Result<Self, Error> {
        let sampler = Sampler::resolve(cfg)?;
        let samples = (0..SAMPLE_POOL_SIZE)
            .map(|_| sampler.draw(rng).to_f64().unwrap_or(0.0))
            .collect();
        Ok(Self {
            samples,
            cursor: Mutex::new(0),
        })
    }

    /// Advance the cursor and return the sample there, wrapping past the
    /// pool end. Safe for concurrent callers.
    pub fn get(&self) -> f64 {
        let mut cursor = self.cursor.lock().unwrap();
        *cursor += 1;
        if *cursor >= self.samples.len() {
            *cursor = 0;
        }
        self.samples[*cursor]
    }
}

/// Resolved distribution parameters, alive only while the pool is filled.
struct Sampler {
    kind: ResolvedDistribution,
    min: Decimal,
    max: Decimal,
    precision: u32,
}

enum ResolvedDistribution {
    Uniform,
    Normal { mean: Decimal, std_dev: Decimal },
    Exponential { rate: Decimal },
}

impl Sampler {
    fn resolve(cfg: &SampleConfig) -> Result<Self, Error> {
        let min = match &cfg.min {
            Some(raw) => parse_decimal(raw, "sample_min")?,
            None => Decimal::MIN,
        };
        let max = match &cfg.max {
            Some(raw) => parse_decimal(raw, "sample_max")?,
            None => Decimal::MAX,
        };
        let kind = match cfg.distribution.parse::<Distribution>()? {
            Distribution::Uniform => ResolvedDistribution::Uniform,
            Distribution::Normal => ResolvedDistribution::Normal {
                mean: parse_required(cfg.mean.as_deref(), "sample_mean")?,
                std_dev: parse_required(cfg.std_dev.as_deref(), "sample_std_dev")?,
            },
            Distribution::Exponential => {
                let rate = parse_required(cfg.rate.as_deref(), "rate_parameter")?;
                if rate.is_zero() {
                    return Err(Error::InvalidParameter {
                        field: "rate_parameter",
                        reason: "must be non-zero".to_string(),
                    });
                }
                ResolvedDistribution::Exponential { rate }
            }
        };
        Ok(Self {
            kind,
            min,
            max,
            precision: cfg.precision,
        })
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Decimal {
        let raw = match &self.kind {
            // min + U(0,1) * (max - min); in range by construction, no
            // clamp. Saturating ops keep the default (widest) bounds from
            // overflowing the decimal range.
            ResolvedDistribution::Uniform => {
                let u: f64 = rng.random();
                decimal(u)
                    .saturating_mul(self.max.saturating_sub(self.min))
                    .saturating_add(self.min)
            }
            ResolvedDistribution::Normal { mean, std_dev } => {
                let z: f64 = rng.sample(StandardNormal);
                let value = decimal(z).saturating_mul(*std_dev).saturating_add(*mean);
                self.clamp(value)
            }
            ResolvedDistribution::Exponential { rate } => {
                let e: f64 = rng.sample(Exp1);
                let value = decimal(e).checked_div(*rate).unwrap_or(Decimal::MAX);
                self.clamp(value)
            }
        };
        raw.round_dp(self.precision)
    }

    fn clamp(&self, value: Decimal) -> Decimal {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

fn decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

fn parse_decimal(raw: &str, field: &'static str) -> Result<Decimal, Error> {
    raw.parse::<Decimal>().map_err(|err| Error::InvalidParameter {
        field,
        reason: err.to_string(),
    })
}

fn parse_required(raw: Option<&str>, field: &'static str) -> Result<Decimal, Error> {
    match raw {
        Some(raw) => parse_decimal(raw, field),
        None => Err(Error::InvalidParameter {
            field,
            reason: "required but not set".to_string(),
        }),
    }
}
