//! Directly-follows pairs that no model contains.

use tracing::info;

use super::{CaseGroups, Violation, ViolationDetector, ViolationSubject, ViolationType};
use crate::error::Result;
use crate::models::{ModelSet, ProcessModel, ACTIVITY, CASE_ID, EVENT_TIME};
use crate::view::SharedView;

/// Flags `x -> y` pairs of modelled activities that follow each other
/// directly in a case but never in a model.
///
/// Activities outside the models are skipped before pairing; they are the
/// concern of [`UndesiredActivity`](super::UndesiredActivity).
#[derive(Debug)]
pub struct UndesiredConnection {
    view: SharedView,
    violations: Vec<Violation>,
}

impl UndesiredConnection {
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
            let modelled: Vec<&str> = trace
                .activities
                .iter()
                .map(String::as_str)
                .filter(|a| models.contains_activity(a))
                .collect();
            for pair in modelled.windows(2) {
                let (from, to) = (pair[0], pair[1]);
                if !models.allows_transition(from, to) {
                    groups.add(
                        ViolationSubject::Transition {
                            from: from.to_string(),
                            to: to.to_string(),
                        },
                        &trace.case_id,
                    );
                }
            }
        }
        let violations = groups.into_violations(ViolationType::UndesiredConnection, |subject| {
            match subject {
                ViolationSubject::Transition { from, to } => {
                    format!("{} is followed by {}", from, to)
                }
                other => other.to_string(),
            }
        });
        info!("UndesiredConnection: {} violation(s)", violations.len());

        Ok(Self { view, violations })
    }
}

impl ViolationDetector for UndesiredConnection {
    fn violation_type(&self) -> ViolationType {
        ViolationType::UndesiredConnection
    }

    fn view(&self) -> &SharedView {
        &self.view
    }

    fn violations(&self) -> &[Violation] {
        &self.violations
    }
}
