//! Activities outside every process model.

use tracing::info;

use super::{CaseGroups, Violation, ViolationDetector, ViolationSubject, ViolationType};
use crate::error::Result;
use crate::models::{ModelSet, ProcessModel, ACTIVITY, CASE_ID, EVENT_TIME};
use crate::view::SharedView;

/// Flags every activity that no model contains.
#[derive(Debug)]
pub struct UndesiredActivity {
    view: SharedView,
    violations: Vec<Violation>,
}

impl UndesiredActivity {
    /// Run the rule on `view`.
    pub fn new<'a>(
        view: SharedView,
        models: impl IntoIterator<Item = &'a ProcessModel>,
    ) -> Result<Self> {
        let models = ModelSet::new(models)?;
        view.event_log()
            .require_columns(&[CASE_ID, ACTIVITY, EVENT_TIME])?;

        let mut groups = CaseGroups::new();
        for trace in view.event_log().traces() {
            for activity in &trace.activities {
                if !models.contains_activity(activity) {
                    groups.add(ViolationSubject::Activity(activity.clone()), &trace.case_id);
                }
            }
        }
        let violations = groups.into_violations(ViolationType::UndesiredActivity, |subject| {
            format!("\"{}\" is an undesired activity", subject)
        });
        info!("UndesiredActivity: {} violation(s)", violations.len());

        Ok(Self { view, violations })
    }
}

impl ViolationDetector for UndesiredActivity {
    fn violation_type(&self) -> ViolationType {
        ViolationType::UndesiredActivity
    }

    fn view(&self) -> &SharedView {
        &self.view
    }

    fn violations(&self) -> &[Violation] {
        &self.violations
    }
}
