//! Conformance checking against reference process models.
//!
//! Each case's ordered activity sequence is diffed against every supplied
//! model. A case is conformant when it matches at least one model exactly;
//! otherwise its diagnostic holds the diff against each model.

mod checker;
mod diff;

pub use checker::*;
pub use diff::*;
