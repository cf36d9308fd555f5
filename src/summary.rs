//! Quantile-less summary collector.
//!
//! The `prometheus` crate ships no summary type, but a summary metric
//! family is valid exposition with only its `_count` and `_sum` series.
//! [`SummaryVec`] keeps a count/sum pair per label assignment and renders
//! them through the crate's own collector protocol, so the text encoder
//! treats it like any built-in vector.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use prometheus::core::{Collector, Desc};
use prometheus::{proto, Opts};

#[derive(Default)]
struct Series {
    count: u64,
    sum: f64,
}

struct Inner {
    desc: Desc,
    series: Mutex<HashMap<Vec<String>, Series>>,
}

/// A labeled family of count/sum summaries.
///
/// Clones share the same underlying series, mirroring how the crate's own
/// metric vectors behave, so one clone can live in a registry while
/// another feeds observations.
#[derive(Clone)]
pub struct SummaryVec {
    inner: Arc<Inner>,
}

impl SummaryVec {
    /// Create a summary family described by `opts` with the given
    /// variable label names.
    pub fn new(opts: Opts, label_names: &[&str]) -> Result<Self, prometheus::Error> {
        let variable_labels = label_names.iter().map(|name| name.to_string()).collect();
        let desc = Desc::new(
            opts.fq_name(),
            opts.help.clone(),
            variable_labels,
            opts.const_labels.clone(),
        )?;
        Ok(Self {
            inner: Arc::new(Inner {
                desc,
                series: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Record one observation under the given label assignment. The
    /// series is created on first observation.
    pub fn observe(&self, label_values: &[&str], value: f64) {
        if label_values.len() != self.inner.desc.variable_labels.len() {
            return;
        }
        let key: Vec<String> = label_values.iter().map(|v| v.to_string()).collect();
        let mut series = self.inner.series.lock().unwrap();
        let entry = series.entry(key).or_default();
        entry.count += 1;
        entry.sum += value;
    }

    /// Number of live series, for introspection and tests.
    pub fn len(&self) -> usize {
        self.inner.series.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Collector for SummaryVec {
    fn desc(&self) -> Vec<&Desc> {
        vec![&self.inner.desc]
    }

    fn collect(&self) -> Vec<proto::MetricFamily> {
        let desc = &self.inner.desc;
        let series = self.inner.series.lock().unwrap();
        let mut metrics = Vec::with_capacity(series.len());
        for (label_values, entry) in series.iter() {
            let mut pairs: Vec<proto::LabelPair> = desc
                .variable_labels
                .iter()
                .zip(label_values)
                .map(|(name, value)| {
                    let mut pair = proto::LabelPair::default();
                    pair.set_name(name.clone());
                    pair.set_value(value.clone());
                    pair
                })
                .chain(desc.const_label_pairs.iter().cloned())
                .collect();
            pairs.sort_by(|a, b| a.get_name().cmp(b.get_name()));

            let mut summary = proto::Summary::default();
            summary.set_sample_count(entry.count);
            summary.set_sample_sum(entry.sum);

            let mut metric = proto::Metric::default();
            for pair in pairs {
                metric.mut_label().push(pair);
            }
            metric.set_summary(summary);
            metrics.push(metric);
        }

        let mut family = proto::MetricFamily::default();
        family.set_name(desc.fq_name.clone());
        family.set_help(desc.help.clone());
        family.set_field_type(proto::MetricType::SUMMARY);
        for metric in metrics {
            family.mut_metric().push(metric);
        }
        vec![family]
    }
}
