//! Throughput time KPI.
//!
//! Case throughput is the time between a case's first and last event. Per
//! activity, each event is charged the time until the next event of its case
//! (zero for the last event). Times are in seconds.

use chrono::Duration;
use serde::Serialize;
use std::collections::HashMap;

use super::{KpiFrame, KpiProvider, KpiValue};
use crate::error::Result;
use crate::flow::{FlowNode, Transition};
use crate::models::{CaseId, Trace};
use crate::view::DataView;

/// Identifier of [`ThroughputTime`].
pub const THROUGHPUT_TIME: &str = "ThroughputTime";

const STATISTICS: [&str; 6] = ["Min", "Max", "Mean", "Median", "Sum", "StDev"];

/// Descriptive statistics of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    /// Number of samples.
    pub count: usize,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (mean of the middle pair for even counts).
    pub median: f64,
    /// Sum of samples.
    pub sum: f64,
    /// Sample standard deviation; undefined below two samples.
    pub stdev: Option<f64>,
}

impl Statistics {
    /// Compute statistics; `None` for an empty sample.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();
        let mean = sum / count as f64;
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };
        let stdev = (count > 1).then(|| {
            let variance =
                sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        });

        Some(Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean,
            median,
            sum,
            stdev,
        })
    }

    /// Values in column order (Min, Max, Mean, Median, Sum, StDev).
    pub fn values(stats: Option<&Self>) -> Vec<Option<f64>> {
        match stats {
            Some(s) => vec![
                Some(s.min),
                Some(s.max),
                Some(s.mean),
                Some(s.median),
                Some(s.sum),
                s.stdev,
            ],
            None => vec![None; STATISTICS.len()],
        }
    }
}

fn seconds(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}

/// Seconds from each event of a trace to the next one (zero for the last).
fn waiting_times(trace: &Trace) -> Vec<f64> {
    let mut waits: Vec<f64> = trace
        .timestamps
        .windows(2)
        .map(|w| seconds(w[1] - w[0]))
        .collect();
    if !trace.is_empty() {
        waits.push(0.0);
    }
    waits
}

/// Time from first to last event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThroughputTime;

impl ThroughputTime {
    fn stat_columns(&self) -> Vec<String> {
        STATISTICS
            .iter()
            .map(|s| format!("{}{}", THROUGHPUT_TIME, s))
            .collect()
    }

    fn grouped_frame<K>(&self, groups: HashMap<K, Vec<f64>>) -> Result<KpiFrame<K>>
    where
        K: std::hash::Hash + Eq,
    {
        let mut frame = KpiFrame::new(self.stat_columns());
        for (key, samples) in groups {
            let stats = Statistics::from_samples(&samples);
            frame.insert(key, Statistics::values(stats.as_ref()))?;
        }
        Ok(frame)
    }

    fn case_times(view: &dyn DataView) -> HashMap<CaseId, f64> {
        view.event_log()
            .traces()
            .into_iter()
            .map(|t| {
                let time = seconds(t.duration());
                (t.case_id, time)
            })
            .collect()
    }
}

impl KpiProvider for ThroughputTime {
    fn id(&self) -> &str {
        THROUGHPUT_TIME
    }

    fn name(&self) -> &str {
        "Throughput time"
    }

    fn summary(&self, view: &dyn DataView) -> Result<Vec<KpiValue>> {
        let samples: Vec<f64> = Self::case_times(view).into_values().collect();
        let stats = Statistics::from_samples(&samples);
        Ok(STATISTICS
            .iter()
            .zip(Statistics::values(stats.as_ref()))
            .map(|(stat, value)| {
                KpiValue::new(
                    format!("{}{}", THROUGHPUT_TIME, stat),
                    format!("{} ({})", self.name(), stat),
                    value,
                )
            })
            .collect())
    }

    fn per_case(&self, view: &dyn DataView) -> Result<KpiFrame<CaseId>> {
        let mut frame = KpiFrame::single(self.id());
        for (case_id, time) in Self::case_times(view) {
            frame.insert_value(case_id, time)?;
        }
        Ok(frame)
    }

    fn per_activity(&self, view: &dyn DataView) -> Result<KpiFrame<String>> {
        let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
        for trace in view.event_log().traces() {
            for (activity, wait) in trace.activities.iter().zip(waiting_times(&trace)) {
                groups.entry(activity.clone()).or_default().push(wait);
            }
        }
        self.grouped_frame(groups)
    }

    fn per_variant(&self, view: &dyn DataView) -> Result<KpiFrame<String>> {
        let times = Self::case_times(view);
        let groups: HashMap<String, Vec<f64>> = view
            .variants()
            .iter()
            .map(|v| {
                let samples: Vec<f64> =
                    v.case_ids.iter().filter_map(|c| times.get(c).copied()).collect();
                (v.key.clone(), samples)
            })
            .collect();
        self.grouped_frame(groups)
    }

    fn per_transition(&self, view: &dyn DataView) -> Result<KpiFrame<Transition>> {
        let mut groups: HashMap<Transition, Vec<f64>> = HashMap::new();
        for trace in view.event_log().traces() {
            for (i, (from, to)) in trace.edges().enumerate() {
                let key = (FlowNode::activity(from), FlowNode::activity(to));
                let wait = seconds(trace.timestamps[i + 1] - trace.timestamps[i]);
                groups.entry(key).or_default().push(wait);
            }
        }
        self.grouped_frame(groups)
    }
}
