//! Error types for process mining.

use thiserror::Error;

use crate::kpi::Granularity;

/// Result type for mining operations.
pub type Result<T> = std::result::Result<T, MiningError>;

/// Errors raised while loading, filtering or analyzing process data.
///
/// Every failure is detected eagerly when the object whose invariant would
/// be broken is constructed. No partially built state survives an error.
#[derive(Debug, Error)]
pub enum MiningError {
    /// Required column missing, or a value of the wrong type.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Data already populated, or case/event-log referential integrity broken.
    #[error("State error: {0}")]
    State(String),

    /// Invalid caller-supplied parameters.
    #[error("Configuration error: {0}")]
    Config(String),

    /// KPI name not present in the registry.
    #[error("Unknown KPI: {0}")]
    UnknownKpi(String),

    /// KPI does not provide the requested granularity.
    #[error("{granularity} not implemented for this KPI [{kpi}]")]
    KpiNotImplemented {
        /// KPI identifier.
        kpi: String,
        /// Requested granularity.
        granularity: Granularity,
    },
}

impl MiningError {
    /// Create a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a state error.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unknown-KPI error.
    pub fn unknown_kpi(name: impl Into<String>) -> Self {
        Self::UnknownKpi(name.into())
    }
}

impl From<config::ConfigError> for MiningError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MiningError::schema("missing column 'activity'");
        assert_eq!(err.to_string(), "Schema error: missing column 'activity'");

        let err = MiningError::KpiNotImplemented {
            kpi: "AverageEventsPerCase".to_string(),
            granularity: Granularity::Case,
        };
        assert_eq!(
            err.to_string(),
            "per case not implemented for this KPI [AverageEventsPerCase]"
        );
    }
}
