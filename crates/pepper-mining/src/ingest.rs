//! Tabular ingestion boundary.
//!
//! File formats stay outside the crate: readers hand over a [`RawTable`] of
//! string cells, and the functions here validate columns and coerce values
//! into an [`EventLog`], [`CaseTable`] or [`ProcessModel`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{MiningError, Result};
use crate::models::{
    Case, CaseTable, Event, EventLog, ModelStep, ProcessModel, ACTIVITY, CASE_ID, EVENT_TIME,
    REQUIRED_COLUMNS,
};

/// Process model activity column.
pub const MODEL_ACTIVITY: &str = "activity";
/// Process model ordering columns, in lookup order.
pub const MODEL_SORT_COLUMNS: [&str; 2] = ["sorting", "sort_key"];

/// Formats tried when no explicit time format is configured.
const FALLBACK_TIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

/// String-cell table; an empty cell is a missing value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a table with the given header. Duplicate columns are rejected.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(|c| c.into().trim().to_string()).collect();
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(MiningError::schema(format!("duplicate column '{}'", column)));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Append a row; its arity must match the header.
    pub fn push_row<I, S>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = row.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(MiningError::schema(format!(
                "row {} has {} cells, expected {}",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a row, consuming and returning the table.
    pub fn with_row<I, S>(mut self, row: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_row(row)?;
        Ok(self)
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn require(&self, name: &str, table: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            MiningError::schema(format!(
                "column '{}' is mandatory in the {}",
                name, table
            ))
        })
    }
}

fn cell(row: &[String], index: usize) -> Option<&str> {
    let value = row[index].trim();
    (!value.is_empty()).then_some(value)
}

/// Parse an event timestamp, with an explicit format or the fallbacks.
pub fn parse_event_time(raw: &str, format: Option<&str>) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Some(format) = format {
        return NaiveDateTime::parse_from_str(raw, format)
            .or_else(|_| {
                NaiveDate::parse_from_str(raw, format).map(|d| d.and_time(NaiveTime::default()))
            })
            .map_err(|e| {
                MiningError::schema(format!(
                    "cannot parse '{}' as {} with format '{}': {}",
                    raw, EVENT_TIME, format, e
                ))
            });
    }

    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Ok(time.naive_utc());
    }
    for format in FALLBACK_TIME_FORMATS {
        if let Ok(time) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(time);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::default()));
    }
    Err(MiningError::schema(format!(
        "cannot parse '{}' as {}",
        raw, EVENT_TIME
    )))
}

impl EventLog {
    /// Validate and coerce an event table.
    ///
    /// Requires `case_id`, `activity` and `event_time`; any other column
    /// becomes an optional event attribute.
    pub fn from_table(table: &RawTable, time_format: Option<&str>) -> Result<Self> {
        let case_col = table.require(CASE_ID, "event log")?;
        let activity_col = table.require(ACTIVITY, "event log")?;
        let time_col = table.require(EVENT_TIME, "event log")?;

        let attribute_cols: Vec<(usize, &String)> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| !REQUIRED_COLUMNS.contains(&c.as_str()))
            .collect();

        let mut events = Vec::with_capacity(table.len());
        for (line, row) in table.rows().iter().enumerate() {
            let case_id = cell(row, case_col).ok_or_else(|| {
                MiningError::schema(format!("row {} has no {}", line, CASE_ID))
            })?;
            let activity = cell(row, activity_col).ok_or_else(|| {
                MiningError::schema(format!("row {} has no {}", line, ACTIVITY))
            })?;
            let raw_time = cell(row, time_col).ok_or_else(|| {
                MiningError::schema(format!("row {} has no {}", line, EVENT_TIME))
            })?;
            let event_time = parse_event_time(raw_time, time_format)
                .map_err(|e| match e {
                    MiningError::Schema(msg) => MiningError::schema(format!("row {}: {}", line, msg)),
                    other => other,
                })?;

            let attributes: BTreeMap<String, String> = attribute_cols
                .iter()
                .filter_map(|&(i, name)| cell(row, i).map(|v| (name.clone(), v.to_string())))
                .collect();

            events.push(Event {
                case_id: case_id.to_string(),
                activity: activity.to_string(),
                event_time,
                attributes,
            });
        }

        let columns: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(attribute_cols.iter().map(|(_, c)| (*c).clone()))
            .collect();
        debug!(
            "Ingested {} events with {} columns",
            events.len(),
            columns.len()
        );
        Ok(Self::from_parts(columns, events))
    }
}

impl CaseTable {
    /// Validate a case table against an event log.
    pub fn from_table(table: &RawTable, log: &EventLog) -> Result<Self> {
        let case_col = table.require(CASE_ID, "case table")?;
        let attribute_cols: Vec<(usize, &String)> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != case_col)
            .collect();

        let mut cases = Vec::with_capacity(table.len());
        for (line, row) in table.rows().iter().enumerate() {
            let case_id = cell(row, case_col).ok_or_else(|| {
                MiningError::schema(format!("row {} has no {}", line, CASE_ID))
            })?;
            let attributes = attribute_cols
                .iter()
                .map(|&(i, name)| (name.clone(), cell(row, i).map(str::to_string)))
                .collect();
            cases.push(Case {
                case_id: case_id.to_string(),
                attributes,
            });
        }

        // Keep the header order of the source table.
        let columns: Vec<String> = std::iter::once(CASE_ID.to_string())
            .chain(attribute_cols.iter().map(|(_, c)| (*c).clone()))
            .collect();
        let cases = Self::with_attributes(log, cases)?
            .cases()
            .iter()
            .cloned()
            .map(|mut case| {
                for name in &columns[1..] {
                    case.attributes.entry(name.clone()).or_insert(None);
                }
                case
            })
            .collect();
        Ok(Self::from_parts(columns, cases))
    }
}

impl ProcessModel {
    /// Populate the model from a table with `activity` and `sorting` columns.
    pub fn set_from_table(&mut self, table: &RawTable) -> Result<()> {
        if !self.is_empty() {
            return Err(MiningError::state(
                "process model is already populated; clear it first",
            ));
        }
        let activity_col = table.require(MODEL_ACTIVITY, "process model")?;
        let sort_col = MODEL_SORT_COLUMNS
            .iter()
            .find_map(|c| table.column_index(c))
            .ok_or_else(|| {
                MiningError::schema("column 'sorting' is mandatory in the process model")
            })?;

        let mut steps = Vec::with_capacity(table.len());
        for (line, row) in table.rows().iter().enumerate() {
            let activity = cell(row, activity_col).ok_or_else(|| {
                MiningError::schema(format!("process model row {} has no activity", line))
            })?;
            let raw_key = cell(row, sort_col).unwrap_or_default();
            let sort_key = raw_key.parse::<i64>().map_err(|_| {
                MiningError::schema(format!(
                    "process model row {} has a non-integer sort key '{}'",
                    line, raw_key
                ))
            })?;
            steps.push(ModelStep::new(activity, sort_key));
        }
        self.set_sequence(steps)
    }

    /// Build a model from a table.
    pub fn from_table(table: &RawTable) -> Result<Self> {
        let mut model = Self::new();
        model.set_from_table(table)?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::USER;

    fn event_table() -> RawTable {
        RawTable::new(["case_id", "activity", "event_time", "user"])
            .unwrap()
            .with_row(["1", "register request", "2022-02-01 11:02:00", "Pete"])
            .unwrap()
            .with_row(["1", "check ticket", "2022-02-02 10:06:00", ""])
            .unwrap()
            .with_row(["2", "register request", "2022-02-01 11:32:00", "Mike"])
            .unwrap()
    }

    #[test]
    fn test_event_log_from_table() {
        let log = EventLog::from_table(&event_table(), None).unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log.columns(), &["case_id", "activity", "event_time", "user"]);
        assert_eq!(log.events()[0].attribute(USER), Some("Pete"));
        assert_eq!(log.events()[1].attribute(USER), None);
    }

    #[test]
    fn test_missing_required_column() {
        let table = RawTable::new(["case_id", "activity"]).unwrap();
        let err = EventLog::from_table(&table, None).unwrap_err();
        assert!(matches!(err, MiningError::Schema(_)));
        assert!(err.to_string().contains("event_time"));
    }

    #[test]
    fn test_unparseable_time() {
        let table = RawTable::new(["case_id", "activity", "event_time"])
            .unwrap()
            .with_row(["1", "a", "yesterday"])
            .unwrap();
        let err = EventLog::from_table(&table, None).unwrap_err();
        assert!(err.to_string().contains("row 0"));
    }

    #[test]
    fn test_time_formats() {
        let expected = NaiveDate::from_ymd_opt(2022, 2, 3)
            .unwrap()
            .and_hms_opt(14, 24, 0)
            .unwrap();
        assert_eq!(
            parse_event_time("03/02/2022 14:24", Some("%d/%m/%Y %H:%M")).unwrap(),
            expected
        );
        assert_eq!(parse_event_time("2022-02-03T14:24:00", None).unwrap(), expected);
        assert_eq!(parse_event_time("2022-02-03T14:24:00Z", None).unwrap(), expected);
        assert_eq!(
            parse_event_time("2022-02-03", None).unwrap(),
            NaiveDate::from_ymd_opt(2022, 2, 3).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        assert!(parse_event_time("2022-02-03", Some("%d/%m/%Y")).is_err());
    }

    #[test]
    fn test_row_arity_checked() {
        let mut table = RawTable::new(["case_id", "activity"]).unwrap();
        assert!(table.push_row(["1"]).is_err());
        assert!(RawTable::new(["a", "a"]).is_err());
    }

    #[test]
    fn test_case_table_from_table() {
        let log = EventLog::from_table(&event_table(), None).unwrap();
        let cases = RawTable::new(["region", "case_id"])
            .unwrap()
            .with_row(["north", "2"])
            .unwrap();

        let table = CaseTable::from_table(&cases, &log).unwrap();
        assert_eq!(table.columns(), &["case_id", "region"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("2").unwrap().attribute("region"), Some("north"));
        assert_eq!(table.get("1").unwrap().attribute("region"), None);

        let orphan = RawTable::new(["case_id"]).unwrap().with_row(["7"]).unwrap();
        assert!(matches!(
            CaseTable::from_table(&orphan, &log),
            Err(MiningError::State(_))
        ));
    }

    #[test]
    fn test_process_model_from_table() {
        let table = RawTable::new(["activity", "sorting"])
            .unwrap()
            .with_row(["decide", "3"])
            .unwrap()
            .with_row(["register request", "1"])
            .unwrap()
            .with_row(["check ticket", "2"])
            .unwrap();

        let model = ProcessModel::from_table(&table).unwrap();
        assert_eq!(
            model.activities(),
            vec!["register request", "check ticket", "decide"]
        );

        let no_sort = RawTable::new(["activity"]).unwrap();
        assert!(matches!(
            ProcessModel::from_table(&no_sort),
            Err(MiningError::Schema(_))
        ));

        let bad_key = RawTable::new(["activity", "sort_key"])
            .unwrap()
            .with_row(["a", "first"])
            .unwrap();
        assert!(matches!(
            ProcessModel::from_table(&bad_key),
            Err(MiningError::Schema(_))
        ));
    }
}
