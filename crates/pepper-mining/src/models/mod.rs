//! Core data structures for process mining.
//!
//! Event logs, case tables, traces, variants and reference process models.

mod case;
mod event;
mod process_model;
mod trace;
mod variant;

pub use case::*;
pub use event::*;
pub use process_model::*;
pub use trace::*;
pub use variant::*;
