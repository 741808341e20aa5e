//! Filter by number of events per case.

use std::collections::{HashMap, HashSet};

use super::{CaseSelector, FilterMode, Filtered};
use crate::error::{MiningError, Result};
use crate::models::CaseId;
use crate::view::{DataView, SharedView};

/// Matches cases whose event count lies in `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseSizeSelector {
    min: usize,
    max: usize,
}

impl CaseSizeSelector {
    /// Create a selector; `min` must not exceed `max`.
    pub fn new(min: usize, max: usize) -> Result<Self> {
        if min > max {
            return Err(MiningError::config(format!(
                "case size range is empty: min {} > max {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// Inclusive bounds.
    pub fn bounds(&self) -> (usize, usize) {
        (self.min, self.max)
    }
}

impl CaseSelector for CaseSizeSelector {
    fn select(&self, upstream: &dyn DataView) -> Result<HashSet<CaseId>> {
        let mut sizes: HashMap<&str, usize> = HashMap::new();
        for event in upstream.event_log().events() {
            *sizes.entry(event.case_id.as_str()).or_insert(0) += 1;
        }
        Ok(sizes
            .into_iter()
            .filter(|(_, size)| (self.min..=self.max).contains(size))
            .map(|(case_id, _)| case_id.to_string())
            .collect())
    }

    fn describe(&self, mode: FilterMode) -> String {
        format!(
            "Filter by case size {}({}, {})",
            mode.marker(),
            self.min,
            self.max
        )
    }
}

/// Keeps cases with a bounded number of events.
pub type CaseSizeFilter = Filtered<CaseSizeSelector>;

impl Filtered<CaseSizeSelector> {
    /// Keep cases with `min..=max` events.
    pub fn new(upstream: SharedView, min: usize, max: usize) -> Result<Self> {
        Self::with_mode(upstream, CaseSizeSelector::new(min, max)?, FilterMode::Contain)
    }

    /// Keep cases with at least `min` events.
    pub fn at_least(upstream: SharedView, min: usize) -> Result<Self> {
        Self::new(upstream, min, usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sample;
    use super::*;

    #[test]
    fn test_size_range() {
        let filter = CaseSizeFilter::new(sample(), 3, 3).unwrap();
        assert_eq!(
            filter.cases().case_ids().collect::<Vec<_>>(),
            vec!["1", "4"]
        );
        assert_eq!(filter.filter_description(), "[None] [Filter by case size (3, 3)]");

        let filter = CaseSizeFilter::at_least(sample(), 4).unwrap();
        assert_eq!(filter.cases().case_ids().collect::<Vec<_>>(), vec!["3"]);
    }

    #[test]
    fn test_invalid_range() {
        let err = CaseSizeFilter::new(sample(), 5, 2).unwrap_err();
        assert!(matches!(err, MiningError::Config(_)));
    }
}
