//! Process trace definitions.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{CaseId, Event};

/// The ordered activity sequence of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    /// Case identifier.
    pub case_id: CaseId,
    /// Activities in execution order.
    pub activities: Vec<String>,
    /// Timestamp of each activity.
    pub timestamps: Vec<NaiveDateTime>,
}

impl Trace {
    /// Create a new empty trace.
    pub fn new(case_id: impl Into<CaseId>) -> Self {
        Self {
            case_id: case_id.into(),
            activities: Vec::new(),
            timestamps: Vec::new(),
        }
    }

    /// Add an activity to the trace.
    pub fn add_activity(&mut self, activity: impl Into<String>, timestamp: NaiveDateTime) {
        self.activities.push(activity.into());
        self.timestamps.push(timestamp);
    }

    /// Get trace length.
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// Check if trace is empty.
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// First activity.
    pub fn first_activity(&self) -> Option<&str> {
        self.activities.first().map(String::as_str)
    }

    /// Last activity.
    pub fn last_activity(&self) -> Option<&str> {
        self.activities.last().map(String::as_str)
    }

    /// First event timestamp.
    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.timestamps.first().copied()
    }

    /// Last event timestamp.
    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.timestamps.last().copied()
    }

    /// Time between first and last event.
    pub fn duration(&self) -> Duration {
        match (self.start_time(), self.end_time()) {
            (Some(start), Some(end)) => end - start,
            _ => Duration::zero(),
        }
    }

    /// Get edges (directly-follows pairs).
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.activities
            .windows(2)
            .map(|w| (w[0].as_str(), w[1].as_str()))
    }

    /// Count occurrences of an activity.
    pub fn count(&self, activity: &str) -> usize {
        self.activities.iter().filter(|a| *a == activity).count()
    }

    /// Stable sort by timestamp; ties keep insertion order.
    fn sort_by_time(&mut self) {
        let mut steps: Vec<(NaiveDateTime, String)> = self
            .timestamps
            .drain(..)
            .zip(self.activities.drain(..))
            .collect();
        steps.sort_by_key(|(time, _)| *time);
        for (time, activity) in steps {
            self.add_activity(activity, time);
        }
    }
}

/// Builder for constructing traces from events.
#[derive(Debug, Default)]
pub struct TraceBuilder {
    traces: Vec<Trace>,
    index: HashMap<CaseId, usize>,
}

impl TraceBuilder {
    /// Create a new trace builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an event and update the corresponding trace.
    pub fn process_event(&mut self, event: &Event) {
        let slot = match self.index.get(&event.case_id) {
            Some(&slot) => slot,
            None => {
                let slot = self.traces.len();
                self.index.insert(event.case_id.clone(), slot);
                self.traces.push(Trace::new(event.case_id.clone()));
                slot
            }
        };
        self.traces[slot].add_activity(event.activity.clone(), event.event_time);
    }

    /// Get trace by case id.
    pub fn get_trace(&self, case_id: &str) -> Option<&Trace> {
        self.index.get(case_id).map(|&slot| &self.traces[slot])
    }

    /// Take ownership of all traces, time-ordered, in first-appearance order.
    pub fn into_traces(self) -> Vec<Trace> {
        let mut traces = self.traces;
        for trace in &mut traces {
            trace.sort_by_time();
        }
        traces
    }

    /// Number of traces.
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}
