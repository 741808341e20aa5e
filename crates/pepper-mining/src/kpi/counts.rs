//! Counting KPIs.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::{KpiFrame, KpiProvider, KpiValue};
use crate::error::Result;
use crate::flow::{trace_transitions, Transition};
use crate::models::CaseId;
use crate::view::DataView;

/// Identifier of [`NumberOfEvents`].
pub const NUMBER_OF_EVENTS: &str = "NumberOfEvents";
/// Identifier of [`NumberOfCases`].
pub const NUMBER_OF_CASES: &str = "NumberOfCases";
/// Identifier of [`NumberOfActivities`].
pub const NUMBER_OF_ACTIVITIES: &str = "NumberOfActivities";
/// Identifier of [`AverageEventsPerCase`].
pub const AVERAGE_EVENTS_PER_CASE: &str = "AverageEventsPerCase";

/// Calendar bucket for time series counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// `2022`
    Year,
    /// `2022-02`
    Month,
    /// `2022-02-01`
    Day,
}

impl Period {
    /// Bucket label of a timestamp.
    pub fn label(&self, time: &NaiveDateTime) -> String {
        let format = match self {
            Period::Year => "%Y",
            Period::Month => "%Y-%m",
            Period::Day => "%Y-%m-%d",
        };
        time.format(format).to_string()
    }
}

fn single(id: &str, name: &str, value: Option<f64>) -> Vec<KpiValue> {
    vec![KpiValue::new(id, name, value)]
}

/// Number of events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberOfEvents;

impl NumberOfEvents {
    /// Events per calendar bucket.
    pub fn per_period(&self, view: &dyn DataView, period: Period) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for event in view.event_log().events() {
            *counts.entry(period.label(&event.event_time)).or_insert(0) += 1;
        }
        counts
    }
}

impl KpiProvider for NumberOfEvents {
    fn id(&self) -> &str {
        NUMBER_OF_EVENTS
    }

    fn name(&self) -> &str {
        "Number of events"
    }

    fn summary(&self, view: &dyn DataView) -> Result<Vec<KpiValue>> {
        Ok(single(
            self.id(),
            self.name(),
            Some(view.event_log().len() as f64),
        ))
    }

    fn per_case(&self, view: &dyn DataView) -> Result<KpiFrame<CaseId>> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for event in view.event_log().events() {
            *counts.entry(event.case_id.as_str()).or_insert(0) += 1;
        }
        let mut frame = KpiFrame::single(self.id());
        for (case_id, count) in counts {
            frame.insert_value(case_id.to_string(), count as f64)?;
        }
        Ok(frame)
    }

    fn per_activity(&self, view: &dyn DataView) -> Result<KpiFrame<String>> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for event in view.event_log().events() {
            *counts.entry(event.activity.as_str()).or_insert(0) += 1;
        }
        let mut frame = KpiFrame::single(self.id());
        for (activity, count) in counts {
            frame.insert_value(activity.to_string(), count as f64)?;
        }
        Ok(frame)
    }

    fn per_variant(&self, view: &dyn DataView) -> Result<KpiFrame<String>> {
        let mut frame = KpiFrame::single(self.id());
        for variant in view.variants().iter() {
            let events = variant.len() * variant.number_of_cases();
            frame.insert_value(variant.key.clone(), events as f64)?;
        }
        Ok(frame)
    }
}

/// Number of cases.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberOfCases;

impl NumberOfCases {
    /// Cases per calendar bucket of their first event.
    pub fn per_period(&self, view: &dyn DataView, period: Period) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for trace in view.event_log().traces() {
            if let Some(start) = trace.start_time() {
                *counts.entry(period.label(&start)).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl KpiProvider for NumberOfCases {
    fn id(&self) -> &str {
        NUMBER_OF_CASES
    }

    fn name(&self) -> &str {
        "Number of cases"
    }

    fn summary(&self, view: &dyn DataView) -> Result<Vec<KpiValue>> {
        Ok(single(self.id(), self.name(), Some(view.cases().len() as f64)))
    }

    fn per_activity(&self, view: &dyn DataView) -> Result<KpiFrame<String>> {
        let mut cases: HashMap<&str, HashSet<&str>> = HashMap::new();
        for event in view.event_log().events() {
            cases
                .entry(event.activity.as_str())
                .or_default()
                .insert(event.case_id.as_str());
        }
        let mut frame = KpiFrame::single(self.id());
        for (activity, members) in cases {
            frame.insert_value(activity.to_string(), members.len() as f64)?;
        }
        Ok(frame)
    }

    fn per_variant(&self, view: &dyn DataView) -> Result<KpiFrame<String>> {
        let mut frame = KpiFrame::single(self.id());
        for variant in view.variants().iter() {
            frame.insert_value(variant.key.clone(), variant.number_of_cases() as f64)?;
        }
        Ok(frame)
    }

    fn per_transition(&self, view: &dyn DataView) -> Result<KpiFrame<Transition>> {
        let mut counts: HashMap<Transition, usize> = HashMap::new();
        for trace in view.event_log().traces() {
            let distinct: HashSet<Transition> = trace_transitions(&trace).into_iter().collect();
            for transition in distinct {
                *counts.entry(transition).or_insert(0) += 1;
            }
        }
        let mut frame = KpiFrame::single(self.id());
        for (transition, count) in counts {
            frame.insert_value(transition, count as f64)?;
        }
        Ok(frame)
    }
}

/// Number of distinct activities.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberOfActivities;

impl KpiProvider for NumberOfActivities {
    fn id(&self) -> &str {
        NUMBER_OF_ACTIVITIES
    }

    fn name(&self) -> &str {
        "Number of activities"
    }

    fn summary(&self, view: &dyn DataView) -> Result<Vec<KpiValue>> {
        Ok(single(
            self.id(),
            self.name(),
            Some(view.activities().len() as f64),
        ))
    }

    fn per_case(&self, view: &dyn DataView) -> Result<KpiFrame<CaseId>> {
        let mut frame = KpiFrame::single(self.id());
        for trace in view.event_log().traces() {
            let distinct: BTreeSet<&str> = trace.activities.iter().map(String::as_str).collect();
            frame.insert_value(trace.case_id.clone(), distinct.len() as f64)?;
        }
        Ok(frame)
    }

    fn per_variant(&self, view: &dyn DataView) -> Result<KpiFrame<String>> {
        let mut frame = KpiFrame::single(self.id());
        for variant in view.variants().iter() {
            let distinct: BTreeSet<&str> = variant.activities.iter().map(String::as_str).collect();
            frame.insert_value(variant.key.clone(), distinct.len() as f64)?;
        }
        Ok(frame)
    }
}

/// Events divided by cases.
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageEventsPerCase;

impl KpiProvider for AverageEventsPerCase {
    fn id(&self) -> &str {
        AVERAGE_EVENTS_PER_CASE
    }

    fn name(&self) -> &str {
        "Average events per case"
    }

    fn summary(&self, view: &dyn DataView) -> Result<Vec<KpiValue>> {
        let cases = view.cases().len();
        let value = (cases > 0).then(|| view.event_log().len() as f64 / cases as f64);
        Ok(single(self.id(), self.name(), value))
    }
}
