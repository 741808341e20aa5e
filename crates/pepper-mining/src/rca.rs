//! Root cause analysis over case attributes.
//!
//! For every case attribute column, counts how many cases carry each value
//! and keeps the most frequent ones. Typically run on a filtered view (for
//! example the cases of a violation) to see which attributes they share.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::view::DataView;

/// Frequency of one attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueFrequency {
    /// Attribute value.
    pub value: String,
    /// Cases carrying the value.
    pub number_of_cases: usize,
    /// Share of all cases in the view, in percent.
    pub percent_of_cases: f64,
}

/// Most frequent values of one case attribute column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootCause {
    /// Attribute column.
    pub column: String,
    /// Values, most frequent first.
    pub frequencies: Vec<ValueFrequency>,
}

/// Analyze every attribute column of the view's case table.
///
/// Columns keep the case table order. Null values are not counted; ties are
/// broken by value.
pub fn root_cause_analysis(view: &dyn DataView, top: usize) -> Vec<RootCause> {
    let cases = view.cases();
    let total = cases.len();

    let results: Vec<RootCause> = cases
        .attribute_columns()
        .iter()
        .map(|column| {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for case in cases.cases() {
                if let Some(value) = case.attribute(column) {
                    *counts.entry(value).or_insert(0) += 1;
                }
            }

            let mut frequencies: Vec<ValueFrequency> = counts
                .into_iter()
                .map(|(value, number_of_cases)| ValueFrequency {
                    value: value.to_string(),
                    number_of_cases,
                    percent_of_cases: number_of_cases as f64 * 100.0 / total as f64,
                })
                .collect();
            frequencies.sort_by(|a, b| {
                b.number_of_cases
                    .cmp(&a.number_of_cases)
                    .then_with(|| a.value.cmp(&b.value))
            });
            frequencies.truncate(top);

            RootCause {
                column: column.clone(),
                frequencies,
            }
        })
        .collect();

    debug!(
        "Root cause analysis: {} column(s) over {} cases",
        results.len(),
        total
    );
    results
}
