//! # Pepper Mining
//!
//! Process mining over in-memory event logs.
//!
//! This crate provides tools for analyzing business processes through:
//!
//! - **Views and filters**: Narrow an event log by case, activity, size, time or variant
//! - **Variant discovery**: Group cases by their ordered activity sequence
//! - **KPIs**: Pluggable metrics at summary, case, activity, variant and transition level
//! - **Conformance checking**: Diff cases against reference process models
//! - **Violation detection**: Undesired activities, starts, ends, connections and
//!   segregation-of-duty breaches
//! - **Root cause analysis**: Most frequent case attributes of a view
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌────────────────┐
//! │    Ingestion    │────▶│   ProcessData    │────▶│  Filter chain  │
//! │   (RawTable)    │     │   (root view)    │     │ (SharedView)   │
//! └─────────────────┘     └──────────────────┘     └────────────────┘
//!                                  │                       │
//!                                  ▼                       ▼
//!                         ┌──────────────────┐     ┌────────────────┐
//!                         │  KPI registry    │     │ Conformance    │
//!                         │  Process flow    │     │ Violations     │
//!                         │  Variants        │     │ Root causes    │
//!                         └──────────────────┘     └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pepper_mining::prelude::*;
//!
//! let mut data = ProcessData::new();
//! data.load_event_table(&events)?;
//! let root = data.into_shared();
//!
//! let long_cases = CaseSizeFilter::new(root.clone(), 5, 50)?;
//! println!("{}", long_cases.filter_description());
//! let summary = long_cases.summary(&["NumberOfCases", "ThroughputTime"])?;
//!
//! let model = ProcessModel::from_activities(["register", "check ticket", "decide"])?;
//! let checker = ConformanceChecker::new(root.clone(), [&model])?;
//! let sod = RunBySameUser::new(root, ["check ticket", "decide"])?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod conformance;
pub mod data;
pub mod error;
pub mod filters;
pub mod flow;
pub mod ingest;
pub mod kpi;
pub mod models;
pub mod rca;
pub mod view;
pub mod violation;

/// Prelude for convenient imports.
pub mod prelude {
    // Core types
    pub use crate::error::{MiningError, Result};
    pub use crate::models::{
        Case, CaseId, CaseTable, Event, EventLog, ModelSet, ModelStep, ProcessModel, Trace,
        Variant, VariantSet,
    };

    // Configuration and ingestion
    pub use crate::config::{load_config, load_config_from_str, MiningConfig};
    pub use crate::ingest::RawTable;

    // Views
    pub use crate::data::ProcessData;
    pub use crate::filters::{
        CaseActivityFilter, CaseBetweenTimeFilter, CaseEndActivityFilter, CaseFilter,
        CaseSizeFilter, CaseStartActivityFilter, FilterMode, VariantFilter,
    };
    pub use crate::view::{DataView, SharedView, WithKpis};

    // KPIs
    pub use crate::kpi::{Granularity, KpiFrame, KpiProvider, KpiRegistry, KpiValue};

    // Analysis
    pub use crate::conformance::{CaseConformance, ConformanceChecker, Diagnostic, SequenceDiff};
    pub use crate::flow::{FlowNode, ProcessFlow};
    pub use crate::rca::{root_cause_analysis, RootCause};
    pub use crate::violation::{
        RunBySameUser, UndesiredActivity, UndesiredConnection, UndesiredEnd, UndesiredStart,
        Violation, ViolationDetector, ViolationType,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
