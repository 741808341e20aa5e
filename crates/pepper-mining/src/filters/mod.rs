//! Filter chain.
//!
//! A filter wraps an upstream [`SharedView`], selects a set of case ids from
//! it, and materializes the narrowed event log and case table once at
//! construction. Every filter narrows by case id membership, so a chain of
//! filters is the AND of its layers regardless of application order.
//!
//! ```ignore
//! let root = data.into_shared();
//! let f1: SharedView = CaseSizeFilter::new(root, 3, 10)?.into_shared();
//! let f2 = CaseEndActivityFilter::new(f1, ["reject request"], FilterMode::NotContain)?;
//! println!("{}", f2.filter_description());
//! ```

mod activity;
mod case;
mod size;
mod time;
mod variant;

pub use activity::*;
pub use case::*;
pub use size::*;
pub use time::*;
pub use variant::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::kpi::KpiRegistry;
use crate::models::{CaseId, CaseTable, EventLog, CASE_ID};
use crate::view::{DataView, SharedView, ViewCache};

/// Whether matched cases are kept or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterMode {
    /// Keep matched cases.
    #[default]
    Contain,
    /// Drop matched cases.
    NotContain,
}

impl FilterMode {
    /// Check if a case is kept.
    pub fn keeps(self, matched: bool) -> bool {
        match self {
            FilterMode::Contain => matched,
            FilterMode::NotContain => !matched,
        }
    }

    /// Description marker (`""` or `"not "`).
    pub fn marker(self) -> &'static str {
        match self {
            FilterMode::Contain => "",
            FilterMode::NotContain => "not ",
        }
    }
}

/// Selects the cases a filter matches.
pub trait CaseSelector: Send + Sync + fmt::Debug + 'static {
    /// Event log columns the selector reads.
    fn required_columns(&self) -> Vec<&'static str> {
        vec![CASE_ID]
    }

    /// Case ids of `upstream` matching the selector.
    fn select(&self, upstream: &dyn DataView) -> Result<HashSet<CaseId>>;

    /// Description of this layer, without brackets.
    fn describe(&self, mode: FilterMode) -> String;
}

/// A filter layer over an upstream view.
#[derive(Debug)]
pub struct Filtered<S> {
    upstream: SharedView,
    selector: S,
    mode: FilterMode,
    event_log: EventLog,
    cases: CaseTable,
    cache: ViewCache,
}

impl<S: CaseSelector> Filtered<S> {
    /// Apply `selector` to `upstream` in the given mode.
    pub fn with_mode(upstream: SharedView, selector: S, mode: FilterMode) -> Result<Self> {
        upstream
            .event_log()
            .require_columns(&selector.required_columns())?;

        let matched = selector.select(upstream.as_ref())?;
        let keep: HashSet<CaseId> = upstream
            .cases()
            .case_ids()
            .filter(|id| mode.keeps(matched.contains(*id)))
            .cloned()
            .collect();

        let event_log = upstream.event_log().retain_cases(&keep);
        let cases = upstream.cases().retain_cases(&keep);
        debug!(
            "Filter [{}] kept {} of {} cases",
            selector.describe(mode),
            cases.len(),
            upstream.cases().len()
        );

        Ok(Self {
            upstream,
            selector,
            mode,
            event_log,
            cases,
            cache: ViewCache::new(),
        })
    }

    /// Wrapped view.
    pub fn upstream(&self) -> &SharedView {
        &self.upstream
    }

    /// Case selector.
    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// Filter mode.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Freeze into a shared view for further chaining.
    pub fn into_shared(self) -> SharedView {
        Arc::new(self)
    }
}

impl<S: CaseSelector> DataView for Filtered<S> {
    fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    fn cases(&self) -> &CaseTable {
        &self.cases
    }

    fn filter_description(&self) -> String {
        format!(
            "{} [{}]",
            self.upstream.filter_description(),
            self.selector.describe(self.mode)
        )
    }

    fn kpi_registry(&self) -> &KpiRegistry {
        self.upstream.kpi_registry()
    }

    fn cache(&self) -> &ViewCache {
        &self.cache
    }

    fn as_view(&self) -> &dyn DataView {
        self
    }
}

/// Comma separated list for descriptions.
fn join_labels<S: AsRef<str>>(labels: &[S]) -> String {
    labels
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}


#[cfg(test)]
mod tests {
    use super::test_support::sample;
    use super::*;

    #[test]
    fn test_filter_mode() {
        assert!(FilterMode::Contain.keeps(true));
        assert!(!FilterMode::Contain.keeps(false));
        assert!(FilterMode::NotContain.keeps(false));
        assert_eq!(FilterMode::default(), FilterMode::Contain);
    }

    #[test]
    fn test_chain_description_and_registry() {
        let root = sample();
        let f1 = CaseFilter::new(root, ["1", "2", "3"], FilterMode::Contain)
            .unwrap()
            .into_shared();
        let f2 = CaseStartActivityFilter::new(f1, ["b"], FilterMode::NotContain).unwrap();

        assert_eq!(
            f2.filter_description(),
            "[None] [Filter by case (3 cases)] [Filter by START activity not (b)]"
        );
        assert_eq!(f2.cases().case_ids().collect::<Vec<_>>(), vec!["1", "2"]);
        assert!(f2.kpi_registry().contains("NumberOfEvents"));
    }

    #[test]
    fn test_upstream_untouched() {
        let root = sample();
        let filtered = CaseFilter::new(root.clone(), ["2"], FilterMode::Contain).unwrap();

        assert_eq!(filtered.event_log().len(), 2);
        assert_eq!(root.event_log().len(), 12);
        assert_eq!(root.variants().len(), 3);
        assert_eq!(filtered.variants().len(), 1);
    }

    #[test]
    fn test_filter_over_unloaded_view() {
        let root = crate::data::ProcessData::new().into_shared();
        let err = CaseFilter::new(root, ["1"], FilterMode::Contain).unwrap_err();
        assert!(matches!(err, crate::error::MiningError::Schema(_)));
    }
}
