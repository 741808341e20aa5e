//! Filter by variant.

use std::collections::HashSet;

use super::{CaseSelector, FilterMode, Filtered};
use crate::error::Result;
use crate::models::{CaseId, ACTIVITY, CASE_ID, EVENT_TIME};
use crate::view::{DataView, SharedView};

/// Matches the cases of the given variant keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSelector {
    keys: Vec<String>,
}

impl VariantSelector {
    /// Create a selector.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Selected variant keys.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl CaseSelector for VariantSelector {
    fn required_columns(&self) -> Vec<&'static str> {
        vec![CASE_ID, ACTIVITY, EVENT_TIME]
    }

    fn select(&self, upstream: &dyn DataView) -> Result<HashSet<CaseId>> {
        let keys: HashSet<&str> = self.keys.iter().map(String::as_str).collect();
        Ok(upstream
            .variants()
            .iter()
            .filter(|v| keys.contains(v.key.as_str()))
            .flat_map(|v| v.case_ids.iter().cloned())
            .collect())
    }

    fn describe(&self, mode: FilterMode) -> String {
        format!(
            "Filter by variant {}({} variants)",
            mode.marker(),
            self.keys.len()
        )
    }
}

/// Keeps (or drops) the cases of some variants.
pub type VariantFilter = Filtered<VariantSelector>;

impl Filtered<VariantSelector> {
    /// Filter `upstream` by variant keys.
    pub fn new<I, S>(upstream: SharedView, keys: I, mode: FilterMode) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_mode(upstream, VariantSelector::new(keys), mode)
    }
}
