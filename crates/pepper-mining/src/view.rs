//! The read contract shared by every view of process data.
//!
//! The root [`ProcessData`](crate::data::ProcessData) and every filter layer
//! implement [`DataView`]. Views are shared as [`SharedView`] so independent
//! filter chains can derive from the same upstream; once wrapped in an `Arc`
//! a view is never mutated again.

use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::kpi::{KpiColumns, KpiRegistry, KpiValue};
use crate::models::{Case, CaseTable, EventLog, Variant, VariantSet};

/// Filter description of a view with no filter applied.
pub const NO_FILTER: &str = "[None]";

/// Shared, immutable handle to a view.
pub type SharedView = Arc<dyn DataView>;

/// Lazily computed derivations of one view instance.
#[derive(Debug, Default)]
pub struct ViewCache {
    activities: OnceCell<Vec<String>>,
    variants: OnceCell<VariantSet>,
}

impl ViewCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct activities in first-appearance order.
    pub fn activities(&self, log: &EventLog) -> &[String] {
        self.activities.get_or_init(|| {
            let mut seen = HashSet::new();
            log.events()
                .iter()
                .filter(|e| seen.insert(e.activity.as_str()))
                .map(|e| e.activity.clone())
                .collect()
        })
    }

    /// Variants of the log.
    pub fn variants(&self, log: &EventLog) -> &VariantSet {
        self.variants.get_or_init(|| VariantSet::discover(log))
    }

    /// Check whether anything has been computed.
    pub fn is_populated(&self) -> bool {
        self.activities.get().is_some() || self.variants.get().is_some()
    }

    /// Drop every cached derivation.
    pub fn reset(&mut self) {
        self.activities.take();
        self.variants.take();
    }
}

/// A row left-joined with one column per KPI output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithKpis<T> {
    /// The joined row.
    pub row: T,
    /// KPI columns; `None` where the KPI has no value for the row.
    pub kpis: KpiColumns,
}

impl<T> WithKpis<T> {
    /// Get a KPI column value.
    pub fn kpi(&self, column: &str) -> Option<f64> {
        self.kpis.get(column).copied().flatten()
    }
}

/// Read access to an event log and case table in some scope.
pub trait DataView: Send + Sync + fmt::Debug {
    /// All events in scope.
    fn event_log(&self) -> &EventLog;

    /// Case table in scope.
    fn cases(&self) -> &CaseTable;

    /// Filters applied so far, root first.
    fn filter_description(&self) -> String;

    /// Registry used to resolve KPI names.
    fn kpi_registry(&self) -> &KpiRegistry;

    /// Per-instance cache backing [`activities`](Self::activities) and
    /// [`variants`](Self::variants).
    fn cache(&self) -> &ViewCache;

    /// This view as a trait object.
    fn as_view(&self) -> &dyn DataView;

    /// Distinct activities in first-appearance order.
    fn activities(&self) -> &[String] {
        self.cache().activities(self.event_log())
    }

    /// Variants in key order.
    fn variants(&self) -> &VariantSet {
        self.cache().variants(self.event_log())
    }

    /// Summary values of the named KPIs.
    fn summary(&self, kpis: &[&str]) -> Result<Vec<KpiValue>> {
        let mut values = Vec::new();
        for provider in self.kpi_registry().resolve_all(kpis)? {
            values.extend(provider.summary(self.as_view())?);
        }
        Ok(values)
    }

    /// Case table joined with per-case KPI columns.
    fn cases_with_kpis(&self, kpis: &[&str]) -> Result<Vec<WithKpis<Case>>> {
        let frames = self
            .kpi_registry()
            .resolve_all(kpis)?
            .iter()
            .map(|p| p.per_case(self.as_view()))
            .collect::<Result<Vec<_>>>()?;

        Ok(self
            .cases()
            .cases()
            .iter()
            .map(|case| {
                let mut columns = KpiColumns::new();
                for frame in &frames {
                    frame.join_into(case.case_id.as_str(), &mut columns);
                }
                WithKpis {
                    row: case.clone(),
                    kpis: columns,
                }
            })
            .collect())
    }

    /// Activities joined with per-activity KPI columns.
    fn activities_with_kpis(&self, kpis: &[&str]) -> Result<Vec<WithKpis<String>>> {
        let frames = self
            .kpi_registry()
            .resolve_all(kpis)?
            .iter()
            .map(|p| p.per_activity(self.as_view()))
            .collect::<Result<Vec<_>>>()?;

        Ok(self
            .activities()
            .iter()
            .map(|activity| {
                let mut columns = KpiColumns::new();
                for frame in &frames {
                    frame.join_into(activity.as_str(), &mut columns);
                }
                WithKpis {
                    row: activity.clone(),
                    kpis: columns,
                }
            })
            .collect())
    }

    /// Variants joined with per-variant KPI columns.
    fn variants_with_kpis(&self, kpis: &[&str]) -> Result<Vec<WithKpis<Variant>>> {
        let frames = self
            .kpi_registry()
            .resolve_all(kpis)?
            .iter()
            .map(|p| p.per_variant(self.as_view()))
            .collect::<Result<Vec<_>>>()?;

        Ok(self
            .variants()
            .iter()
            .map(|variant| {
                let mut columns = KpiColumns::new();
                for frame in &frames {
                    frame.join_into(variant.key.as_str(), &mut columns);
                }
                WithKpis {
                    row: variant.clone(),
                    kpis: columns,
                }
            })
            .collect())
    }
}
