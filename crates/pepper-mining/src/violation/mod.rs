//! Violation detectors.
//!
//! A detector runs its rule once, at construction, over a view and keeps one
//! [`Violation`] record per offending activity, transition or user. Each
//! record lists the cases it was observed in; KPIs for a record are computed
//! over exactly those cases.

mod activity;
mod boundary;
mod connection;
mod same_user;

pub use activity::*;
pub use boundary::*;
pub use connection::*;
pub use same_user::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::filters::{CaseFilter, FilterMode};
use crate::kpi::KpiColumns;
use crate::models::CaseId;
use crate::view::{DataView, SharedView, WithKpis};

/// Rule that produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// Activity outside every model.
    UndesiredActivity,
    /// Case starting with an activity no model starts with.
    UndesiredStart,
    /// Case ending with an activity no model ends with.
    UndesiredEnd,
    /// Directly-follows pair no model contains.
    UndesiredConnection,
    /// One user executing several target activities of a case.
    RunBySameUser,
}

impl ViolationType {
    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            ViolationType::UndesiredActivity => "UndesiredActivity",
            ViolationType::UndesiredStart => "UndesiredStart",
            ViolationType::UndesiredEnd => "UndesiredEnd",
            ViolationType::UndesiredConnection => "UndesiredConnection",
            ViolationType::RunBySameUser => "RunBySameUser",
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a violation record is about.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationSubject {
    /// A single activity.
    Activity(String),
    /// A directly-follows pair.
    Transition {
        /// Preceding activity.
        from: String,
        /// Following activity.
        to: String,
    },
    /// A user.
    User(String),
}

impl fmt::Display for ViolationSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationSubject::Activity(activity) => f.write_str(activity),
            ViolationSubject::Transition { from, to } => write!(f, "{} -> {}", from, to),
            ViolationSubject::User(user) => f.write_str(user),
        }
    }
}

/// One violation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule that fired.
    pub violation_type: ViolationType,
    /// Human readable description.
    pub rule_name: String,
    /// Offending activity, transition or user.
    pub subject: ViolationSubject,
    /// Cases the violation was observed in, first appearance first.
    pub case_ids: Vec<CaseId>,
}

impl Violation {
    /// Number of affected cases.
    pub fn number_of_cases(&self) -> usize {
        self.case_ids.len()
    }
}

/// Common interface of the violation detectors.
pub trait ViolationDetector {
    /// Rule implemented by the detector.
    fn violation_type(&self) -> ViolationType;

    /// View the rule was evaluated on.
    fn view(&self) -> &SharedView;

    /// Detected violations ordered by subject.
    fn violations(&self) -> &[Violation];

    /// Violations joined with KPI summaries over their cases.
    fn get_violation(&self, kpis: &[&str]) -> Result<Vec<WithKpis<Violation>>> {
        self.view().kpi_registry().resolve_all(kpis)?;
        self.violations()
            .iter()
            .map(|violation| {
                let scoped = CaseFilter::new(
                    self.view().clone(),
                    violation.case_ids.iter().cloned(),
                    FilterMode::Contain,
                )?;
                let mut columns = KpiColumns::new();
                for value in scoped.summary(kpis)? {
                    columns.insert(value.id, value.value);
                }
                Ok(WithKpis {
                    row: violation.clone(),
                    kpis: columns,
                })
            })
            .collect()
    }
}

/// Cases grouped by violation subject.
#[derive(Debug)]
struct CaseGroups {
    groups: BTreeMap<ViolationSubject, Vec<CaseId>>,
}

impl CaseGroups {
    fn new() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }

    /// Record `case_id` under `subject`. Cases must arrive grouped.
    fn add(&mut self, subject: ViolationSubject, case_id: &str) {
        let cases = self.groups.entry(subject).or_default();
        if cases.last().map(String::as_str) != Some(case_id) {
            cases.push(case_id.to_string());
        }
    }

    fn into_violations(
        self,
        violation_type: ViolationType,
        rule_name: impl Fn(&ViolationSubject) -> String,
    ) -> Vec<Violation> {
        self.groups
            .into_iter()
            .map(|(subject, case_ids)| Violation {
                violation_type,
                rule_name: rule_name(&subject),
                subject,
                case_ids,
            })
            .collect()
    }
}
