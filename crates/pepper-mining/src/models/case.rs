//! Case table definitions.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::{CaseId, EventLog, CASE_ID};
use crate::error::{MiningError, Result};

/// One process instance with its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Case identifier.
    pub case_id: CaseId,
    /// Case attributes; `None` is a missing value.
    pub attributes: BTreeMap<String, Option<String>>,
}

impl Case {
    /// Create a case without attributes.
    pub fn new(case_id: impl Into<CaseId>) -> Self {
        Self {
            case_id: case_id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Attach an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), Some(value.into()));
        self
    }

    /// Get an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|v| v.as_deref())
    }
}

/// One row per case id of an event log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseTable {
    columns: Vec<String>,
    cases: Vec<Case>,
}

impl CaseTable {
    /// Attribute-less case table for every case of `log`.
    pub fn from_event_log(log: &EventLog) -> Self {
        Self {
            columns: vec![CASE_ID.to_string()],
            cases: log.case_ids().into_iter().map(Case::new).collect(),
        }
    }

    /// Attach attributed case rows to `log`.
    ///
    /// Cases of the log without a row are created with missing attributes.
    /// Rows for unknown case ids and duplicate rows are rejected.
    pub fn with_attributes(log: &EventLog, cases: Vec<Case>) -> Result<Self> {
        let mut columns = vec![CASE_ID.to_string()];
        for case in &cases {
            for name in case.attributes.keys() {
                if name == CASE_ID {
                    return Err(MiningError::schema(format!(
                        "case '{}' has an attribute named '{}'",
                        case.case_id, CASE_ID
                    )));
                }
                if !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
        }

        let known: HashSet<CaseId> = log.case_ids().into_iter().collect();
        let mut supplied: HashMap<CaseId, Case> = HashMap::with_capacity(cases.len());
        for case in cases {
            if !known.contains(&case.case_id) {
                return Err(MiningError::state(format!(
                    "case '{}' does not exist in the event log",
                    case.case_id
                )));
            }
            if supplied.contains_key(&case.case_id) {
                return Err(MiningError::state(format!(
                    "case '{}' appears more than once",
                    case.case_id
                )));
            }
            supplied.insert(case.case_id.clone(), case);
        }

        let cases = log
            .case_ids()
            .into_iter()
            .map(|case_id| {
                let mut case = supplied.remove(&case_id).unwrap_or_else(|| Case::new(case_id));
                for name in &columns[1..] {
                    case.attributes.entry(name.clone()).or_insert(None);
                }
                case
            })
            .collect();

        Ok(Self { columns, cases })
    }

    pub(crate) fn from_parts(columns: Vec<String>, cases: Vec<Case>) -> Self {
        Self { columns, cases }
    }

    /// Column names, `case_id` first.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Attribute columns (all but `case_id`).
    pub fn attribute_columns(&self) -> &[String] {
        self.columns.get(1..).unwrap_or(&[])
    }

    /// Case rows.
    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    /// Look up a case row.
    pub fn get(&self, case_id: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.case_id == case_id)
    }

    /// Case ids in row order.
    pub fn case_ids(&self) -> impl Iterator<Item = &CaseId> + '_ {
        self.cases.iter().map(|c| &c.case_id)
    }

    /// Number of cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Keep only the given cases.
    pub fn retain_cases(&self, keep: &HashSet<CaseId>) -> Self {
        Self {
            columns: self.columns.clone(),
            cases: self
                .cases
                .iter()
                .filter(|c| keep.contains(&c.case_id))
                .cloned()
                .collect(),
        }
    }
}
