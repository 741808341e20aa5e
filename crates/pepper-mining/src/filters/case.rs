//! Filter by case id.

use std::collections::HashSet;

use super::{CaseSelector, FilterMode, Filtered};
use crate::error::Result;
use crate::models::CaseId;
use crate::view::{DataView, SharedView};

/// Matches an explicit list of case ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseIdSelector {
    case_ids: Vec<CaseId>,
}

impl CaseIdSelector {
    /// Create a selector; duplicate ids are ignored.
    pub fn new<I, S>(case_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CaseId>,
    {
        let mut seen = HashSet::new();
        let case_ids = case_ids
            .into_iter()
            .map(Into::into)
            .filter(|id: &CaseId| seen.insert(id.clone()))
            .collect();
        Self { case_ids }
    }

    /// Selected case ids.
    pub fn case_ids(&self) -> &[CaseId] {
        &self.case_ids
    }
}

impl CaseSelector for CaseIdSelector {
    fn select(&self, _upstream: &dyn DataView) -> Result<HashSet<CaseId>> {
        Ok(self.case_ids.iter().cloned().collect())
    }

    fn describe(&self, mode: FilterMode) -> String {
        format!(
            "Filter by case {}({} cases)",
            mode.marker(),
            self.case_ids.len()
        )
    }
}

/// Keeps (or drops) the listed cases.
pub type CaseFilter = Filtered<CaseIdSelector>;

impl Filtered<CaseIdSelector> {
    /// Filter `upstream` by case ids.
    pub fn new<I, S>(upstream: SharedView, case_ids: I, mode: FilterMode) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<CaseId>,
    {
        Self::with_mode(upstream, CaseIdSelector::new(case_ids), mode)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sample;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_contain() {
        let filter = CaseFilter::new(sample(), ["3", "1", "1"], FilterMode::Contain).unwrap();
        assert_eq!(filter.cases().case_ids().collect::<Vec<_>>(), vec!["1", "3"]);
        assert_eq!(filter.event_log().len(), 7);
        assert_eq!(filter.filter_description(), "[None] [Filter by case (2 cases)]");
    }

    #[test]
    fn test_not_contain() {
        let filter = CaseFilter::new(sample(), ["1"], FilterMode::NotContain).unwrap();
        assert_eq!(
            filter.cases().case_ids().collect::<Vec<_>>(),
            vec!["2", "3", "4"]
        );
        assert_eq!(
            filter.filter_description(),
            "[None] [Filter by case not (1 cases)]"
        );
    }

    #[test]
    fn test_full_list_is_identity() {
        let root = sample();
        let all: Vec<CaseId> = root.cases().case_ids().cloned().collect();
        let filter = CaseFilter::new(root.clone(), all, FilterMode::Contain).unwrap();

        assert_eq!(filter.event_log().events(), root.event_log().events());
        assert_eq!(filter.cases(), root.cases());
    }

    #[test]
    fn test_unknown_ids_match_nothing() {
        let filter = CaseFilter::new(sample(), ["42"], FilterMode::Contain).unwrap();
        assert!(filter.cases().is_empty());
        assert!(filter.event_log().is_empty());
        assert!(filter.variants().is_empty());
    }
}
