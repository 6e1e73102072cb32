use crate::error::{AttendanceError, AttendanceResult};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

pub fn validate_check_out_order(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> AttendanceResult<()> {
    if check_out <= check_in {
        return Err(AttendanceError::InvalidOrdering {
            check_in,
            check_out,
        });
    }
    Ok(())
}

pub fn validate_date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> AttendanceResult<()> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(AttendanceError::InvalidFilter(format!(
                "start date {} is after end date {}",
                from, to
            )));
        }
    }
    Ok(())
}

pub fn validate_person_fields(id: &str, name: &str, department: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(anyhow::anyhow!("Person id cannot be empty"));
    }

    if id.chars().any(char::is_whitespace) {
        return Err(anyhow::anyhow!("Person id cannot contain whitespace: '{}'", id));
    }

    if name.trim().is_empty() {
        return Err(anyhow::anyhow!("Person name cannot be empty"));
    }

    if department.trim().is_empty() {
        return Err(anyhow::anyhow!("Department cannot be empty"));
    }

    Ok(())
}
