//! KPI capability interface and registry.
//!
//! A KPI is a named aggregate computable at one or more granularities. KPIs
//! are resolved by identifier through an explicit [`KpiRegistry`]; asking a
//! KPI for a granularity it does not provide fails with
//! [`MiningError::KpiNotImplemented`] instead of yielding empty data.

mod counts;
mod rework;
mod throughput;

pub use counts::*;
pub use rework::*;
pub use throughput::*;

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

use crate::error::{MiningError, Result};
use crate::flow::Transition;
use crate::models::CaseId;
use crate::view::DataView;

/// KPI columns of one joined row, keyed by column id.
pub type KpiColumns = BTreeMap<String, Option<f64>>;

/// Level at which a KPI is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// One or more values for the whole view.
    Summary,
    /// One row per case.
    Case,
    /// One row per activity.
    Activity,
    /// One row per variant.
    Variant,
    /// One row per directly-follows transition.
    Transition,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Granularity::Summary => "summary",
            Granularity::Case => "per case",
            Granularity::Activity => "per activity",
            Granularity::Variant => "per variant",
            Granularity::Transition => "per transition",
        };
        f.write_str(label)
    }
}

/// One summary value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiValue {
    /// Column id (e.g. `ThroughputTimeMean`).
    pub id: String,
    /// Display name (e.g. `Throughput time (Mean)`).
    pub name: String,
    /// Value; `None` when undefined for the data.
    pub value: Option<f64>,
}

impl KpiValue {
    /// Create a summary value.
    pub fn new(id: impl Into<String>, name: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value,
        }
    }
}

/// KPI values keyed by row (case, activity, variant key or transition).
#[derive(Debug, Clone, PartialEq)]
pub struct KpiFrame<K: Hash + Eq> {
    columns: Vec<String>,
    rows: HashMap<K, Vec<Option<f64>>>,
}

impl<K: Hash + Eq> KpiFrame<K> {
    /// Create an empty frame with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: HashMap::new(),
        }
    }

    /// Create an empty single-column frame.
    pub fn single(column: impl Into<String>) -> Self {
        Self::new(vec![column.into()])
    }

    /// Insert a row; `values` must align with the columns.
    pub fn insert(&mut self, key: K, values: Vec<Option<f64>>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(MiningError::config(format!(
                "KPI row has {} values for {} columns ({})",
                values.len(),
                self.columns.len(),
                self.columns.join(", ")
            )));
        }
        self.rows.insert(key, values);
        Ok(())
    }

    /// Insert a single-column value.
    pub fn insert_value(&mut self, key: K, value: f64) -> Result<()> {
        self.insert(key, vec![Some(value)])
    }

    /// Column ids.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values of a row.
    pub fn get<Q>(&self, key: &Q) -> Option<&[Option<f64>]>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.rows.get(key).map(Vec::as_slice)
    }

    /// Value of a row in a column.
    pub fn value<Q>(&self, key: &Q, column: &str) -> Option<f64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.columns.iter().position(|c| c == column)?;
        self.get(key).and_then(|row| row.get(index).copied().flatten())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Left-join this frame's columns for `key` into `target`.
    pub fn join_into<Q>(&self, key: &Q, target: &mut KpiColumns)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let row = self.get(key);
        for (i, column) in self.columns.iter().enumerate() {
            target.insert(column.clone(), row.and_then(|r| r.get(i).copied().flatten()));
        }
    }
}

/// A pluggable KPI.
///
/// Every granularity defaults to [`MiningError::KpiNotImplemented`].
pub trait KpiProvider: Send + Sync {
    /// Identifier used for lookup and as the base column id.
    fn id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str;

    /// Summary values over the whole view.
    fn summary(&self, _view: &dyn DataView) -> Result<Vec<KpiValue>> {
        Err(self.not_implemented(Granularity::Summary))
    }

    /// Values per case.
    fn per_case(&self, _view: &dyn DataView) -> Result<KpiFrame<CaseId>> {
        Err(self.not_implemented(Granularity::Case))
    }

    /// Values per activity.
    fn per_activity(&self, _view: &dyn DataView) -> Result<KpiFrame<String>> {
        Err(self.not_implemented(Granularity::Activity))
    }

    /// Values per variant key.
    fn per_variant(&self, _view: &dyn DataView) -> Result<KpiFrame<String>> {
        Err(self.not_implemented(Granularity::Variant))
    }

    /// Values per directly-follows transition.
    fn per_transition(&self, _view: &dyn DataView) -> Result<KpiFrame<Transition>> {
        Err(self.not_implemented(Granularity::Transition))
    }

    /// Error for an unsupported granularity.
    fn not_implemented(&self, granularity: Granularity) -> MiningError {
        MiningError::KpiNotImplemented {
            kpi: self.id().to_string(),
            granularity,
        }
    }
}

/// Constructor of a KPI provider.
pub type KpiFactory = Arc<dyn Fn() -> Box<dyn KpiProvider> + Send + Sync>;

/// Mapping from KPI identifier to provider constructor.
#[derive(Clone)]
pub struct KpiRegistry {
    factories: HashMap<String, KpiFactory>,
}

impl fmt::Debug for KpiRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KpiRegistry")
            .field("kpis", &self.ids())
            .finish()
    }
}

impl Default for KpiRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KpiRegistry {
    /// Registry without any KPI.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in KPIs.
    pub fn builtin() -> Self {
        Self::empty()
            .with(NUMBER_OF_EVENTS, || Box::new(NumberOfEvents))
            .with(NUMBER_OF_CASES, || Box::new(NumberOfCases))
            .with(NUMBER_OF_ACTIVITIES, || Box::new(NumberOfActivities))
            .with(AVERAGE_EVENTS_PER_CASE, || Box::new(AverageEventsPerCase))
            .with(THROUGHPUT_TIME, || Box::new(ThroughputTime))
            .with(REWORK, || Box::new(Rework))
    }

    /// Register a KPI, replacing any previous one with the same id.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn KpiProvider> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Arc::new(factory));
        self
    }

    /// Register a KPI, consuming and returning the registry.
    pub fn with<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn KpiProvider> + Send + Sync + 'static,
    {
        self.register(id, factory);
        self
    }

    /// Resolve a KPI by id.
    pub fn resolve(&self, id: &str) -> Result<Box<dyn KpiProvider>> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| MiningError::unknown_kpi(id))?;
        debug!("Resolved KPI {}", id);
        Ok(factory())
    }

    /// Resolve several KPIs; fails on the first unknown id.
    pub fn resolve_all(&self, ids: &[&str]) -> Result<Vec<Box<dyn KpiProvider>>> {
        ids.iter().map(|id| self.resolve(id)).collect()
    }

    /// Check if a KPI is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered KPIs.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
