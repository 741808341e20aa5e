//! Segregation of duties: one user executing several target activities.

use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{info, warn};

use super::{CaseGroups, Violation, ViolationDetector, ViolationSubject, ViolationType};
use crate::error::{MiningError, Result};
use crate::models::{ACTIVITY, CASE_ID, USER};
use crate::view::SharedView;

/// Flags users who executed at least two distinct target activities within
/// the same case.
#[derive(Debug)]
pub struct RunBySameUser {
    view: SharedView,
    activities: BTreeSet<String>,
    user_column: String,
    violations: Vec<Violation>,
}

impl RunBySameUser {
    /// Run the rule on `view` using the `user` column.
    pub fn new<I, S>(view: SharedView, activities: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_user_column(view, activities, USER)
    }

    /// Run the rule on `view` using a custom user column.
    pub fn with_user_column<I, S>(
        view: SharedView,
        activities: I,
        user_column: impl Into<String>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let activities: BTreeSet<String> = activities.into_iter().map(Into::into).collect();
        if activities.len() < 2 {
            return Err(MiningError::config(format!(
                "RunBySameUser needs at least two distinct activities, got {}",
                activities.len()
            )));
        }
        let user_column = user_column.into();
        view.event_log()
            .require_columns(&[CASE_ID, ACTIVITY, user_column.as_str()])?;

        let violations = Self::detect(&view, &activities, &user_column);
        info!("RunBySameUser: {} violation(s)", violations.len());

        Ok(Self {
            view,
            activities,
            user_column,
            violations,
        })
    }

    fn detect(view: &SharedView, targets: &BTreeSet<String>, user_column: &str) -> Vec<Violation> {
        let mut performed: HashMap<(&str, &str), HashSet<&str>> = HashMap::new();
        let mut order: Vec<(&str, &str)> = Vec::new();
        let mut missing = 0usize;

        for event in view.event_log().events() {
            if !targets.contains(&event.activity) {
                continue;
            }
            let Some(user) = event.attribute(user_column) else {
                missing += 1;
                continue;
            };
            let key = (event.case_id.as_str(), user);
            performed
                .entry(key)
                .or_insert_with(|| {
                    order.push(key);
                    HashSet::new()
                })
                .insert(event.activity.as_str());
        }
        if missing > 0 {
            warn!(
                "RunBySameUser: skipped {} target event(s) without a value in column {}",
                missing, user_column
            );
        }

        let mut groups = CaseGroups::new();
        for key in order {
            if performed.get(&key).is_some_and(|acts| acts.len() >= 2) {
                let (case_id, user) = key;
                groups.add(ViolationSubject::User(user.to_string()), case_id);
            }
        }
        groups.into_violations(ViolationType::RunBySameUser, |subject| {
            format!("\"{}\" executed two different activities", subject)
        })
    }

    /// Target activities.
    pub fn activities(&self) -> &BTreeSet<String> {
        &self.activities
    }

    /// Column identifying the user.
    pub fn user_column(&self) -> &str {
        &self.user_column
    }
}

impl ViolationDetector for RunBySameUser {
    fn violation_type(&self) -> ViolationType {
        ViolationType::RunBySameUser
    }

    fn view(&self) -> &SharedView {
        &self.view
    }

    fn violations(&self) -> &[Violation] {
        &self.violations
    }
}
