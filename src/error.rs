//! Error taxonomy surfaced to the UI layer.

use thiserror::Error;
use timesheet_api::{ApiError, WorklogAck};

pub type Result<T> = std::result::Result<T, TimesheetError>;

#[derive(Debug, Error)]
pub enum TimesheetError {
    /// Missing secret or unusable setting.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A remote response did not have the expected shape.
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(#[source] ApiError),
    /// A week submission stopped at entry `failed_index`; `committed` entries before it already exist remotely.
    #[error("submission stopped at entry {} of {total} ({} already recorded): {source}", .failed_index + 1, .committed.len())]
    Aborted {
        committed: Vec<WorklogAck>,
        failed_index: usize,
        total: usize,
        #[source]
        source: ApiError,
    },
}

impl From<ApiError> for TimesheetError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation(message) => TimesheetError::Validation(message),
            ApiError::Configuration(message) => TimesheetError::Configuration(message),
            other => TimesheetError::Transport(other),
        }
    }
}

impl TimesheetError {
    pub fn configuration(message: impl Into<String>) -> Self {
        TimesheetError::Configuration(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        TimesheetError::InvalidInput(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_onto_taxonomy() {
        assert!(matches!(
            TimesheetError::from(ApiError::Validation("x".into())),
            TimesheetError::Validation(_)
        ));
        assert!(matches!(
            TimesheetError::from(ApiError::Configuration("x".into())),
            TimesheetError::Configuration(_)
        ));
        assert!(matches!(
            TimesheetError::from(ApiError::Timeout("x".into())),
            TimesheetError::Transport(ApiError::Timeout(_))
        ));
    }

    #[test]
    fn aborted_message_reports_position() {
        let err = TimesheetError::Aborted {
            committed: Vec::new(),
            failed_index: 2,
            total: 7,
            source: ApiError::Network("connection reset".into()),
        };
        assert_eq!(
            err.to_string(),
            "submission stopped at entry 3 of 7 (0 already recorded): network error: connection reset"
        );
    }
}
