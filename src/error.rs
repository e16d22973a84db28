use chrono::NaiveDate;

/// Reasons a caller-supplied window is refused before any computation runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("window start date is required")]
    MissingStart,

    #[error("window end date is required")]
    MissingEnd,

    #[error("window start {start} is after window end {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },

    #[error("window covers {days} days, at most {max} can be shown")]
    TooLong { days: u32, max: u32 },
}

/// Error type for everything that can fail while loading or querying the roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("invalid window: {0}")]
    InvalidWindow(#[from] WindowError),

    #[error("invalid date or timestamp: {value:?}")]
    InvalidDate { value: String },

    #[error("unknown department: {value:?}")]
    UnknownDepartment { value: String },

    #[error("invalid sort: key {key:?}, order {order:?}")]
    InvalidSort { key: String, order: String },

    #[error("failed to read ordering config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RosterError {
    /// True when the caller sent bad input, as opposed to a storage failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RosterError::InvalidWindow(_)
                | RosterError::InvalidDate { .. }
                | RosterError::UnknownDepartment { .. }
                | RosterError::InvalidSort { .. }
        )
    }
}
