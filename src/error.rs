use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error("Already checked in: {person_id} on {date}")]
    AlreadyCheckedIn { person_id: String, date: NaiveDate },

    #[error("No open session for {person_id} on {date}")]
    NoOpenSession { person_id: String, date: NaiveDate },

    #[error("Already checked out: {person_id} on {date}")]
    AlreadyCheckedOut { person_id: String, date: NaiveDate },

    #[error("Check-out at {check_out} is not after check-in at {check_in}")]
    InvalidOrdering {
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    },

    #[error("Person not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid attendance action: {0}")]
    InvalidAction(String),

    #[error("Invalid report filter: {0}")]
    InvalidFilter(String),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] anyhow::Error),
}

pub type AttendanceResult<T> = Result<T, AttendanceError>;
