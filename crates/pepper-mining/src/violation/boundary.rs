//! Cases starting or ending with an undeclared activity.

use tracing::info;

use super::{CaseGroups, Violation, ViolationDetector, ViolationSubject, ViolationType};
use crate::error::Result;
use crate::models::{ModelSet, ProcessModel, Trace, ACTIVITY, CASE_ID, EVENT_TIME};
use crate::view::SharedView;

/// Which end of a case a boundary rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Start,
    End,
}

impl Boundary {
    fn label(self) -> &'static str {
        match self {
            Boundary::Start => "START",
            Boundary::End => "END",
        }
    }

    fn violation_type(self) -> ViolationType {
        match self {
            Boundary::Start => ViolationType::UndesiredStart,
            Boundary::End => ViolationType::UndesiredEnd,
        }
    }

    fn activity(self, trace: &Trace) -> Option<&str> {
        match self {
            Boundary::Start => trace.first_activity(),
            Boundary::End => trace.last_activity(),
        }
    }

    fn detect<'a>(
        self,
        view: &SharedView,
        models: impl IntoIterator<Item = &'a ProcessModel>,
    ) -> Result<Vec<Violation>> {
        let models = ModelSet::new(models)?;
        view.event_log()
            .require_columns(&[CASE_ID, ACTIVITY, EVENT_TIME])?;

        let declared = match self {
            Boundary::Start => models.start_activities(),
            Boundary::End => models.end_activities(),
        };
        let mut groups = CaseGroups::new();
        for trace in view.event_log().traces() {
            if let Some(activity) = self.activity(&trace) {
                if !declared.contains(activity) {
                    groups.add(ViolationSubject::Activity(activity.to_string()), &trace.case_id);
                }
            }
        }
        let violations = groups.into_violations(self.violation_type(), |subject| {
            format!("\"{}\" executed as {} activity", subject, self.label())
        });
        info!("{}: {} violation(s)", self.violation_type(), violations.len());
        Ok(violations)
    }
}

/// Flags cases whose first activity is not the first activity of any model.
#[derive(Debug)]
pub struct UndesiredStart {
    view: SharedView,
    violations: Vec<Violation>,
}

impl UndesiredStart {
    /// Run the rule on `view`.
    pub fn new<'a>(
        view: SharedView,
        models: impl IntoIterator<Item = &'a ProcessModel>,
    ) -> Result<Self> {
        let violations = Boundary::Start.detect(&view, models)?;
        Ok(Self { view, violations })
    }
}

impl ViolationDetector for UndesiredStart {
    fn violation_type(&self) -> ViolationType {
        ViolationType::UndesiredStart
    }

    fn view(&self) -> &SharedView {
        &self.view
    }

    fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

/// Flags cases whose last activity is not the last activity of any model.
#[derive(Debug)]
pub struct UndesiredEnd {
    view: SharedView,
    violations: Vec<Violation>,
}

impl UndesiredEnd {
    /// Run the rule on `view`.
    pub fn new<'a>(
        view: SharedView,
        models: impl IntoIterator<Item = &'a ProcessModel>,
    ) -> Result<Self> {
        let violations = Boundary::End.detect(&view, models)?;
        Ok(Self { view, violations })
    }
}

impl ViolationDetector for UndesiredEnd {
    fn violation_type(&self) -> ViolationType {
        ViolationType::UndesiredEnd
    }

    fn view(&self) -> &SharedView {
        &self.view
    }

    fn violations(&self) -> &[Violation] {
        &self.violations
    }
}
