//! Root view over loaded process data.

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::MiningConfig;
use crate::error::{MiningError, Result};
use crate::ingest::RawTable;
use crate::kpi::{KpiRegistry, KpiValue};
use crate::models::{Case, CaseTable, EventLog};
use crate::rca::{root_cause_analysis, RootCause};
use crate::view::{DataView, SharedView, ViewCache, NO_FILTER};

/// Loaded event log and case table; the unfiltered root of every view chain.
///
/// Data is populated once. Replacing it requires an explicit
/// [`clear_data`](Self::clear_data) (or [`clear_cases`](Self::clear_cases)
/// for custom case attributes). A failed load leaves the previous state
/// untouched.
#[derive(Debug, Default)]
pub struct ProcessData {
    config: MiningConfig,
    event_log: EventLog,
    cases: CaseTable,
    custom_cases: bool,
    registry: KpiRegistry,
    cache: ViewCache,
}

impl ProcessData {
    /// Create an empty root with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty root with the given configuration.
    pub fn with_config(config: MiningConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Replace the KPI registry.
    pub fn with_kpi_registry(mut self, registry: KpiRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    /// Mutable KPI registry, for registering custom KPIs.
    pub fn kpi_registry_mut(&mut self) -> &mut KpiRegistry {
        &mut self.registry
    }

    /// Check whether an event log is loaded.
    pub fn is_loaded(&self) -> bool {
        self.event_log.is_loaded()
    }

    /// Check whether custom case attributes are loaded.
    pub fn has_custom_cases(&self) -> bool {
        self.custom_cases
    }

    /// Load an event log; an attribute-less case table is derived from it.
    pub fn set_event_log(&mut self, event_log: EventLog) -> Result<()> {
        self.ensure_unloaded()?;
        event_log.require_columns(&crate::models::REQUIRED_COLUMNS)?;
        self.cases = CaseTable::from_event_log(&event_log);
        self.event_log = event_log;
        self.custom_cases = false;
        self.cache.reset();
        info!(
            "Loaded event log: {} events, {} cases",
            self.event_log.len(),
            self.cases.len()
        );
        Ok(())
    }

    /// Validate and load an event table using the configured time format.
    pub fn load_event_table(&mut self, table: &RawTable) -> Result<()> {
        self.ensure_unloaded()?;
        let log = EventLog::from_table(table, self.config.ingest.time_format.as_deref())?;
        self.set_event_log(log)
    }

    /// Attach case attributes to the loaded event log.
    pub fn set_cases(&mut self, cases: Vec<Case>) -> Result<()> {
        self.ensure_cases_settable()?;
        let table = CaseTable::with_attributes(&self.event_log, cases)?;
        self.install_cases(table);
        Ok(())
    }

    /// Validate and attach a case table.
    pub fn load_case_table(&mut self, table: &RawTable) -> Result<()> {
        self.ensure_cases_settable()?;
        let table = CaseTable::from_table(table, &self.event_log)?;
        self.install_cases(table);
        Ok(())
    }

    /// Drop all loaded data.
    pub fn clear_data(&mut self) {
        self.event_log = EventLog::default();
        self.cases = CaseTable::default();
        self.custom_cases = false;
        self.cache.reset();
        debug!("Cleared process data");
    }

    /// Drop custom case attributes, keeping the event log.
    pub fn clear_cases(&mut self) {
        self.cases = if self.event_log.is_loaded() {
            CaseTable::from_event_log(&self.event_log)
        } else {
            CaseTable::default()
        };
        self.custom_cases = false;
        self.cache.reset();
        debug!("Cleared case attributes");
    }

    /// Freeze into a shared view for building filter chains.
    pub fn into_shared(self) -> SharedView {
        Arc::new(self)
    }

    /// Summary of the configured overview KPIs.
    pub fn overview(&self) -> Result<Vec<KpiValue>> {
        let kpis: Vec<&str> = self
            .config
            .analysis
            .summary_kpis
            .iter()
            .map(String::as_str)
            .collect();
        self.summary(&kpis)
    }

    /// Root cause analysis with the configured number of values per column.
    pub fn root_causes(&self) -> Vec<RootCause> {
        root_cause_analysis(self, self.config.analysis.root_cause_top)
    }

    fn ensure_unloaded(&self) -> Result<()> {
        if self.event_log.is_loaded() {
            return Err(MiningError::state(
                "event log already loaded; call clear_data first",
            ));
        }
        Ok(())
    }

    fn ensure_cases_settable(&self) -> Result<()> {
        if !self.event_log.is_loaded() {
            return Err(MiningError::state(
                "cases require a loaded event log",
            ));
        }
        if self.custom_cases {
            return Err(MiningError::state(
                "cases already loaded; call clear_cases first",
            ));
        }
        Ok(())
    }

    fn install_cases(&mut self, table: CaseTable) {
        info!(
            "Loaded case table: {} cases, {} attribute columns",
            table.len(),
            table.attribute_columns().len()
        );
        self.cases = table;
        self.custom_cases = true;
        self.cache.reset();
    }
}

impl DataView for ProcessData {
    fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    fn cases(&self) -> &CaseTable {
        &self.cases
    }

    fn filter_description(&self) -> String {
        NO_FILTER.to_string()
    }

    fn kpi_registry(&self) -> &KpiRegistry {
        &self.registry
    }

    fn cache(&self) -> &ViewCache {
        &self.cache
    }

    fn as_view(&self) -> &dyn DataView {
        self
    }
}
