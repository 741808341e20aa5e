//! Rework KPI: repeated executions of an activity within a case.

use std::collections::HashMap;

use super::{KpiFrame, KpiProvider, KpiValue};
use crate::error::Result;
use crate::models::CaseId;
use crate::view::DataView;

/// Identifier of [`Rework`].
pub const REWORK: &str = "Rework";

/// Occurrences of an activity in a case beyond the first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rework;

impl Rework {
    /// Rework count per (case, activity).
    fn counts(view: &dyn DataView) -> HashMap<(&str, &str), usize> {
        let mut counts = HashMap::new();
        for event in view.event_log().events() {
            *counts
                .entry((event.case_id.as_str(), event.activity.as_str()))
                .or_insert(0usize) += 1;
        }
        counts.values_mut().for_each(|c| *c -= 1);
        counts
    }
}

impl KpiProvider for Rework {
    fn id(&self) -> &str {
        REWORK
    }

    fn name(&self) -> &str {
        "Rework"
    }

    fn summary(&self, view: &dyn DataView) -> Result<Vec<KpiValue>> {
        let total: usize = Self::counts(view).values().sum();
        Ok(vec![KpiValue::new(self.id(), self.name(), Some(total as f64))])
    }

    fn per_case(&self, view: &dyn DataView) -> Result<KpiFrame<CaseId>> {
        let mut per_case: HashMap<&str, usize> = HashMap::new();
        for ((case_id, _), count) in Self::counts(view) {
            *per_case.entry(case_id).or_insert(0) += count;
        }
        let mut frame = KpiFrame::single(self.id());
        for (case_id, count) in per_case {
            frame.insert_value(case_id.to_string(), count as f64)?;
        }
        Ok(frame)
    }

    fn per_activity(&self, view: &dyn DataView) -> Result<KpiFrame<String>> {
        let mut per_activity: HashMap<&str, usize> = HashMap::new();
        for ((_, activity), count) in Self::counts(view) {
            *per_activity.entry(activity).or_insert(0) += count;
        }
        let mut frame = KpiFrame::single(self.id());
        for (activity, count) in per_activity {
            frame.insert_value(activity.to_string(), count as f64)?;
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProcessData;
    use crate::models::{Event, EventLog};
    use chrono::NaiveDate;

    #[test]
    fn test_rework() {
        let t = NaiveDate::from_ymd_opt(2022, 2, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut data = ProcessData::new();
        data.set_event_log(
            EventLog::new(vec![
                Event::new("1", "a", t),
                Event::new("1", "b", t),
                Event::new("1", "b", t),
                Event::new("1", "b", t),
                Event::new("2", "a", t),
                Event::new("2", "a", t),
            ])
            .unwrap(),
        )
        .unwrap();

        assert_eq!(Rework.summary(&data).unwrap()[0].value, Some(3.0));

        let per_case = Rework.per_case(&data).unwrap();
        assert_eq!(per_case.value("1", REWORK), Some(2.0));
        assert_eq!(per_case.value("2", REWORK), Some(1.0));

        let per_activity = Rework.per_activity(&data).unwrap();
        assert_eq!(per_activity.value("a", REWORK), Some(1.0));
        assert_eq!(per_activity.value("b", REWORK), Some(2.0));

        assert!(Rework.per_variant(&data).is_err());
    }
}
