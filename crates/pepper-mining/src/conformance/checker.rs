//! Per-case conformance against a set of models.

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::SequenceDiff;
use crate::error::Result;
use crate::filters::{CaseFilter, FilterMode};
use crate::kpi::KpiValue;
use crate::models::{compare_case_ids, Case, CaseId, ModelSet, ProcessModel, REQUIRED_COLUMNS};
use crate::view::{DataView, SharedView, WithKpis};

/// Diff of a case against one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDiff {
    /// Model the case was compared with.
    pub model_id: Uuid,
    /// Differences found.
    pub diff: SequenceDiff,
}

/// Deviations of a non-conformant case, one entry per model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Per-model diffs in model order.
    pub deviations: Vec<ModelDiff>,
}

impl Diagnostic {
    /// Diff against a given model.
    pub fn against(&self, model_id: Uuid) -> Option<&SequenceDiff> {
        self.deviations
            .iter()
            .find(|d| d.model_id == model_id)
            .map(|d| &d.diff)
    }

    /// Total number of differences across models.
    pub fn len(&self) -> usize {
        self.deviations.iter().map(|d| d.diff.len()).sum()
    }

    /// Check if no difference was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Conformance result of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseConformance {
    /// Case identifier.
    pub case_id: CaseId,
    /// Ordered activity sequence of the case.
    pub activities: Vec<String>,
    /// True unless the case matches some model exactly.
    pub has_violation: bool,
    /// Per-model diffs; `None` for conformant cases.
    pub diagnostic: Option<Diagnostic>,
}

/// Compares every case of a view with a set of process models.
///
/// Results are computed once at construction. KPI accessors are evaluated
/// over the conformant cases only.
#[derive(Debug)]
pub struct ConformanceChecker {
    view: SharedView,
    model_ids: Vec<Uuid>,
    results: Vec<CaseConformance>,
    conformant: SharedView,
}

impl ConformanceChecker {
    /// Check `view` against `models`.
    pub fn new<'a>(
        view: SharedView,
        models: impl IntoIterator<Item = &'a ProcessModel>,
    ) -> Result<Self> {
        let models = ModelSet::new(models)?;
        view.event_log().require_columns(&REQUIRED_COLUMNS)?;

        let sequences: Vec<Vec<&str>> = models.models().iter().map(|m| m.activities()).collect();
        let mut results: Vec<CaseConformance> = view
            .event_log()
            .traces()
            .into_iter()
            .map(|trace| {
                let diffs: Vec<ModelDiff> = models
                    .models()
                    .iter()
                    .zip(&sequences)
                    .map(|(model, sequence)| ModelDiff {
                        model_id: model.id(),
                        diff: SequenceDiff::compute(sequence, &trace.activities),
                    })
                    .collect();
                let conformant = diffs.iter().any(|d| d.diff.is_empty());
                CaseConformance {
                    case_id: trace.case_id,
                    activities: trace.activities,
                    has_violation: !conformant,
                    diagnostic: (!conformant).then_some(Diagnostic { deviations: diffs }),
                }
            })
            .collect();
        results.sort_by(|a, b| compare_case_ids(&a.case_id, &b.case_id));

        let conformant_ids = results
            .iter()
            .filter(|r| !r.has_violation)
            .map(|r| r.case_id.clone());
        let conformant =
            CaseFilter::new(view.clone(), conformant_ids, FilterMode::Contain)?.into_shared();

        info!(
            "Conformance: {} of {} cases conform to {} model(s)",
            conformant.cases().len(),
            results.len(),
            models.len()
        );
        debug!("Conformance view: {}", conformant.filter_description());

        Ok(Self {
            view,
            model_ids: models.models().iter().map(|m| m.id()).collect(),
            results,
            conformant,
        })
    }

    /// Checked view.
    pub fn view(&self) -> &SharedView {
        &self.view
    }

    /// Ids of the models, in the order they were supplied.
    pub fn model_ids(&self) -> &[Uuid] {
        &self.model_ids
    }

    /// Result per case, ordered by case id.
    pub fn results(&self) -> &[CaseConformance] {
        &self.results
    }

    /// Result of one case.
    pub fn result(&self, case_id: &str) -> Option<&CaseConformance> {
        self.results.iter().find(|r| r.case_id == case_id)
    }

    /// `(case_id, diagnostic)` for every case; `None` for conformant cases.
    pub fn diagnostics(&self) -> impl Iterator<Item = (&str, Option<&Diagnostic>)> + '_ {
        self.results
            .iter()
            .map(|r| (r.case_id.as_str(), r.diagnostic.as_ref()))
    }

    /// Ids of conformant cases.
    pub fn conformant_case_ids(&self) -> impl Iterator<Item = &CaseId> + '_ {
        self.results
            .iter()
            .filter(|r| !r.has_violation)
            .map(|r| &r.case_id)
    }

    /// The view narrowed to conformant cases.
    pub fn conformant_view(&self) -> &SharedView {
        &self.conformant
    }

    /// Share of conformant cases; `None` without cases.
    pub fn conformance_rate(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        let conformant = self.results.iter().filter(|r| !r.has_violation).count();
        Some(conformant as f64 / self.results.len() as f64)
    }

    /// Conformant cases joined with per-case KPI columns.
    pub fn get_cases(&self, kpis: &[&str]) -> Result<Vec<WithKpis<Case>>> {
        self.conformant.cases_with_kpis(kpis)
    }

    /// KPI summary over the conformant cases.
    pub fn get_summary(&self, kpis: &[&str]) -> Result<Vec<KpiValue>> {
        self.conformant.summary(kpis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProcessData;
    use crate::error::MiningError;
    use crate::models::{Event, EventLog};
    use chrono::NaiveDate;

    fn view() -> SharedView {
        let t = |h: u32| {
            NaiveDate::from_ymd_opt(2022, 2, 1)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap()
        };
        let mut data = ProcessData::new();
        data.set_event_log(
            EventLog::new(vec![
                Event::new("10", "a", t(1)),
                Event::new("10", "c", t(2)),
                Event::new("2", "a", t(1)),
                Event::new("2", "b", t(2)),
                Event::new("2", "c", t(3)),
                Event::new("3", "c", t(1)),
                Event::new("3", "a", t(2)),
            ])
            .unwrap(),
        )
        .unwrap();
        data.into_shared()
    }

    #[test]
    fn test_single_model() {
        let model = ProcessModel::from_activities(["a", "b", "c"]).unwrap();
        let checker = ConformanceChecker::new(view(), [&model]).unwrap();

        let ids: Vec<&str> = checker.results().iter().map(|r| r.case_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "10"]);

        let case_2 = checker.result("2").unwrap();
        assert!(!case_2.has_violation);
        assert!(case_2.diagnostic.is_none());

        let case_10 = checker.result("10").unwrap();
        assert!(case_10.has_violation);
        let diff = case_10.diagnostic.as_ref().unwrap().against(model.id()).unwrap();
        assert_eq!(diff.deleted().collect::<Vec<_>>(), vec!["b"]);

        assert_eq!(checker.conformant_case_ids().collect::<Vec<_>>(), vec!["2"]);
        assert_eq!(checker.conformance_rate(), Some(1.0 / 3.0));
    }

    #[test]
    fn test_matching_any_model_is_conformant() {
        let full = ProcessModel::from_activities(["a", "b", "c"]).unwrap();
        let short = ProcessModel::from_activities(["a", "c"]).unwrap();
        let checker = ConformanceChecker::new(view(), [&full, &short]).unwrap();

        assert!(!checker.result("10").unwrap().has_violation);
        assert!(!checker.result("2").unwrap().has_violation);

        let case_3 = checker.result("3").unwrap();
        let diagnostic = case_3.diagnostic.as_ref().unwrap();
        assert_eq!(diagnostic.deviations.len(), 2);
        assert_eq!(diagnostic.deviations[0].model_id, full.id());
        assert_eq!(diagnostic.deviations[1].model_id, short.id());
        assert_eq!(checker.diagnostics().filter(|(_, d)| d.is_some()).count(), 1);
    }

    #[test]
    fn test_kpis_over_conformant_cases() {
        let model = ProcessModel::from_activities(["a", "b", "c"]).unwrap();
        let checker = ConformanceChecker::new(view(), [&model]).unwrap();

        let summary = checker.get_summary(&["NumberOfEvents", "NumberOfCases"]).unwrap();
        assert_eq!(summary[0].value, Some(3.0));
        assert_eq!(summary[1].value, Some(1.0));

        let cases = checker.get_cases(&["NumberOfEvents"]).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].kpi("NumberOfEvents"), Some(3.0));

        assert!(matches!(
            checker.get_summary(&["Nope"]),
            Err(MiningError::UnknownKpi(_))
        ));
    }

    #[test]
    fn test_invalid_model_set() {
        assert!(matches!(
            ConformanceChecker::new(view(), Vec::<&ProcessModel>::new()),
            Err(MiningError::Config(_))
        ));
        let empty = ProcessModel::new();
        assert!(matches!(
            ConformanceChecker::new(view(), [&empty]),
            Err(MiningError::Config(_))
        ));
    }

    #[test]
    fn test_results_serialize() {
        let model = ProcessModel::from_activities(["a", "b", "c"]).unwrap();
        let checker = ConformanceChecker::new(view(), [&model]).unwrap();
        let json = serde_json::to_string(checker.results()).unwrap();
        assert!(json.contains("\"has_violation\":true"));
    }
}
