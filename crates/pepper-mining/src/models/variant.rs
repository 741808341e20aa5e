//! Variant discovery.
//!
//! A variant is the class of cases sharing an identical ordered activity
//! sequence, repeats included. Variants are keyed by a string encoding of the
//! sequence that joins activities with [`VARIANT_CONNECTOR`]; backslashes and
//! dashes inside activity names are escaped so keys never collide and can be
//! decoded back into the sequence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::{compare_case_ids, CaseId, EventLog};

/// Separator between activities in a variant key.
pub const VARIANT_CONNECTOR: &str = "->";

/// Encode an activity sequence as a variant key.
pub fn encode_variant_key<S: AsRef<str>>(activities: &[S]) -> String {
    let mut key = String::new();
    for (i, activity) in activities.iter().enumerate() {
        if i > 0 {
            key.push_str(VARIANT_CONNECTOR);
        }
        for ch in activity.as_ref().chars() {
            if ch == '\\' || ch == '-' {
                key.push('\\');
            }
            key.push(ch);
        }
    }
    key
}

/// Decode a variant key back into its activity sequence.
pub fn decode_variant_key(key: &str) -> Vec<String> {
    if key.is_empty() {
        return Vec::new();
    }

    let mut activities = Vec::new();
    let mut current = String::new();
    let mut chars = key.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '-' if chars.peek() == Some(&'>') => {
                chars.next();
                activities.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    activities.push(current);
    activities
}

/// A group of cases with the same activity sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Encoded activity sequence.
    pub key: String,
    /// Activity sequence.
    pub activities: Vec<String>,
    /// Member cases, sorted.
    pub case_ids: Vec<CaseId>,
}

impl Variant {
    /// Number of member cases.
    pub fn number_of_cases(&self) -> usize {
        self.case_ids.len()
    }

    /// Length of the activity sequence.
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// Check if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Sequence joined for display (`a->b->c`).
    pub fn display_sequence(&self) -> String {
        self.activities.join(VARIANT_CONNECTOR)
    }
}

/// All variants of an event log, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSet {
    variants: Vec<Variant>,
}

impl VariantSet {
    /// Discover the variants of an event log.
    pub fn discover(log: &EventLog) -> Self {
        let mut groups: BTreeMap<String, Variant> = BTreeMap::new();
        for trace in log.traces() {
            let key = encode_variant_key(&trace.activities);
            groups
                .entry(key.clone())
                .or_insert_with(|| Variant {
                    key,
                    activities: trace.activities.clone(),
                    case_ids: Vec::new(),
                })
                .case_ids
                .push(trace.case_id);
        }

        let mut variants: Vec<Variant> = groups.into_values().collect();
        for variant in &mut variants {
            variant.case_ids.sort_by(|a, b| compare_case_ids(a, b));
        }
        debug!(
            "Discovered {} variants over {} events",
            variants.len(),
            log.len()
        );
        Self { variants }
    }

    /// Variants in key order.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Iterate variants.
    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter()
    }

    /// Look up a variant by key.
    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.key == key)
    }

    /// Variant containing a case.
    pub fn variant_of(&self, case_id: &str) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|v| v.case_ids.iter().any(|c| c == case_id))
    }

    /// Number of variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
