//! Filter by case start time.

use chrono::NaiveDateTime;
use std::collections::HashSet;

use super::{CaseSelector, FilterMode, Filtered};
use crate::error::{MiningError, Result};
use crate::models::{CaseId, CASE_ID, EVENT_TIME};
use crate::view::{DataView, SharedView};

/// Matches cases whose first event lies in `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindowSelector {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeWindowSelector {
    /// Create a selector; `start` must not be after `end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(MiningError::config(format!(
                "time window is empty: {} is after {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Inclusive bounds.
    pub fn window(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.start, self.end)
    }
}

impl CaseSelector for TimeWindowSelector {
    fn required_columns(&self) -> Vec<&'static str> {
        vec![CASE_ID, EVENT_TIME]
    }

    fn select(&self, upstream: &dyn DataView) -> Result<HashSet<CaseId>> {
        Ok(upstream
            .event_log()
            .traces()
            .into_iter()
            .filter(|trace| {
                trace
                    .start_time()
                    .is_some_and(|t| t >= self.start && t <= self.end)
            })
            .map(|trace| trace.case_id)
            .collect())
    }

    fn describe(&self, mode: FilterMode) -> String {
        format!(
            "Filter cases {}between {} and {}",
            mode.marker(),
            self.start.format("%Y-%m-%dT%H:%M:%S"),
            self.end.format("%Y-%m-%dT%H:%M:%S")
        )
    }
}

/// Keeps cases starting inside a time window.
pub type CaseBetweenTimeFilter = Filtered<TimeWindowSelector>;

impl Filtered<TimeWindowSelector> {
    /// Keep cases whose first event lies in `[start, end]`.
    pub fn new(upstream: SharedView, start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        Self::with_mode(
            upstream,
            TimeWindowSelector::new(start, end)?,
            FilterMode::Contain,
        )
    }
}
