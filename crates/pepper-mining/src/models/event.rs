//! Event and event log definitions.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use super::{Trace, TraceBuilder};
use crate::error::{MiningError, Result};

/// Case identifier type.
pub type CaseId = String;

/// Case identifier column.
pub const CASE_ID: &str = "case_id";
/// Activity label column.
pub const ACTIVITY: &str = "activity";
/// Event timestamp column.
pub const EVENT_TIME: &str = "event_time";
/// Optional user column.
pub const USER: &str = "user";

/// Columns every event log must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = [CASE_ID, ACTIVITY, EVENT_TIME];

/// A single recorded activity execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Case the event belongs to.
    pub case_id: CaseId,
    /// Activity label.
    pub activity: String,
    /// Execution timestamp.
    pub event_time: NaiveDateTime,
    /// Optional attributes (e.g. `user`).
    pub attributes: BTreeMap<String, String>,
}

impl Event {
    /// Create a new event without attributes.
    pub fn new(
        case_id: impl Into<CaseId>,
        activity: impl Into<String>,
        event_time: NaiveDateTime,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            activity: activity.into(),
            event_time,
            attributes: BTreeMap::new(),
        }
    }

    /// Attach an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Attach the `user` attribute.
    pub fn with_user(self, user: impl Into<String>) -> Self {
        self.with_attribute(USER, user)
    }

    /// Get an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Validated collection of events.
///
/// A default (column-less) log represents "no data loaded".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    columns: Vec<String>,
    events: Vec<Event>,
}

impl EventLog {
    /// Build a log from typed events.
    ///
    /// Columns are the required ones followed by every attribute name seen,
    /// in first-appearance order.
    pub fn new(events: Vec<Event>) -> Result<Self> {
        let mut columns: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();

        for (row, event) in events.iter().enumerate() {
            if event.case_id.trim().is_empty() {
                return Err(MiningError::schema(format!(
                    "event {} ({}) has an empty case id",
                    row, event.activity
                )));
            }
            if event.activity.trim().is_empty() {
                return Err(MiningError::schema(format!(
                    "event {} of case '{}' has an empty activity",
                    row, event.case_id
                )));
            }
            for name in event.attributes.keys() {
                if REQUIRED_COLUMNS.contains(&name.as_str()) {
                    return Err(MiningError::schema(format!(
                        "attribute '{}' collides with a required column",
                        name
                    )));
                }
                if !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
        }

        Ok(Self { columns, events })
    }

    pub(crate) fn from_parts(columns: Vec<String>, events: Vec<Event>) -> Self {
        Self { columns, events }
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Check whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Fail with a schema error if any of `required` is missing.
    pub fn require_columns(&self, required: &[&str]) -> Result<()> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|c| !self.has_column(c))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MiningError::schema(format!(
                "event log is missing column(s): {}",
                missing.join(", ")
            )))
        }
    }

    /// Check whether data has been loaded.
    pub fn is_loaded(&self) -> bool {
        !self.columns.is_empty()
    }

    /// All events in row order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Distinct case ids in first-appearance order.
    pub fn case_ids(&self) -> Vec<CaseId> {
        let mut seen = HashSet::new();
        self.events
            .iter()
            .filter(|e| seen.insert(e.case_id.as_str()))
            .map(|e| e.case_id.clone())
            .collect()
    }

    /// One trace per case, time-ordered, in first-appearance order.
    pub fn traces(&self) -> Vec<Trace> {
        let mut builder = TraceBuilder::new();
        for event in &self.events {
            builder.process_event(event);
        }
        builder.into_traces()
    }

    /// Keep only the events of the given cases.
    pub fn retain_cases(&self, keep: &HashSet<CaseId>) -> Self {
        Self {
            columns: self.columns.clone(),
            events: self
                .events
                .iter()
                .filter(|e| keep.contains(&e.case_id))
                .cloned()
                .collect(),
        }
    }
}

/// Order case ids numerically when both are integers, otherwise lexicographically.
///
/// Numeric ids sort before non-numeric ones so the order stays total.
pub fn compare_case_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
