//! Filters by activity, at any position or at the start/end of a case.

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

use super::{join_labels, CaseSelector, FilterMode, Filtered};
use crate::error::Result;
use crate::models::{CaseId, Trace, ACTIVITY, CASE_ID, EVENT_TIME};
use crate::view::{DataView, SharedView};

/// Where in a case an activity must occur.
pub trait Position: Send + Sync + fmt::Debug + 'static {
    /// Label used in descriptions.
    const LABEL: &'static str;

    /// Activities of the trace eligible for matching.
    fn candidates(trace: &Trace) -> &[String];
}

/// Anywhere in the case.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anywhere;

impl Position for Anywhere {
    const LABEL: &'static str = "activity";

    fn candidates(trace: &Trace) -> &[String] {
        &trace.activities
    }
}

/// First event of the case.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtStart;

impl Position for AtStart {
    const LABEL: &'static str = "START activity";

    fn candidates(trace: &Trace) -> &[String] {
        &trace.activities[..trace.len().min(1)]
    }
}

/// Last event of the case.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtEnd;

impl Position for AtEnd {
    const LABEL: &'static str = "END activity";

    fn candidates(trace: &Trace) -> &[String] {
        &trace.activities[trace.len().saturating_sub(1)..]
    }
}

/// Matches cases with one of the given activities at position `P`.
#[derive(Debug, Clone)]
pub struct ActivitySelector<P> {
    activities: Vec<String>,
    _position: PhantomData<P>,
}

impl<P: Position> ActivitySelector<P> {
    /// Create a selector.
    pub fn new<I, S>(activities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            activities: activities.into_iter().map(Into::into).collect(),
            _position: PhantomData,
        }
    }

    /// Selected activities.
    pub fn activities(&self) -> &[String] {
        &self.activities
    }
}

impl<P: Position> CaseSelector for ActivitySelector<P> {
    fn required_columns(&self) -> Vec<&'static str> {
        vec![CASE_ID, ACTIVITY, EVENT_TIME]
    }

    fn select(&self, upstream: &dyn DataView) -> Result<HashSet<CaseId>> {
        let wanted: HashSet<&str> = self.activities.iter().map(String::as_str).collect();
        Ok(upstream
            .event_log()
            .traces()
            .into_iter()
            .filter(|trace| {
                P::candidates(trace)
                    .iter()
                    .any(|a| wanted.contains(a.as_str()))
            })
            .map(|trace| trace.case_id)
            .collect())
    }

    fn describe(&self, mode: FilterMode) -> String {
        format!(
            "Filter by {} {}({})",
            P::LABEL,
            mode.marker(),
            join_labels(&self.activities)
        )
    }
}

/// Cases containing any of the activities.
pub type CaseActivityFilter = Filtered<ActivitySelector<Anywhere>>;
/// Cases starting with any of the activities.
pub type CaseStartActivityFilter = Filtered<ActivitySelector<AtStart>>;
/// Cases ending with any of the activities.
pub type CaseEndActivityFilter = Filtered<ActivitySelector<AtEnd>>;

impl<P: Position> Filtered<ActivitySelector<P>> {
    /// Filter `upstream` by activities at position `P`.
    pub fn new<I, S>(upstream: SharedView, activities: I, mode: FilterMode) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(upstream, ActivitySelector::new(activities), mode)
    }
}
