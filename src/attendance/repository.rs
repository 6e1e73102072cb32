use crate::attendance::report::ReportFilter;
use crate::database::models::{AttendanceRecord, Person, ReportRow};
use crate::error::AttendanceResult;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Storage for attendance records.
/// Infrastructure layer (e.g. the SQLite store) implements this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Insert the record unless one already exists for `(person_id, date)`.
    /// Returns `false` when the key was taken, including by a concurrent insert.
    async fn insert_if_absent(&self, record: &AttendanceRecord) -> AttendanceResult<bool>;

    async fn find_record(
        &self,
        person_id: &str,
        date: NaiveDate,
    ) -> AttendanceResult<Option<AttendanceRecord>>;

    /// Set `check_out_time` only if it is still unset.
    /// Returns `false` when no open record matched.
    async fn complete_record(
        &self,
        person_id: &str,
        date: NaiveDate,
        check_out_time: DateTime<Utc>,
    ) -> AttendanceResult<bool>;

    /// All records for one person, newest date first.
    async fn list_for_person(&self, person_id: &str) -> AttendanceResult<Vec<AttendanceRecord>>;

    /// Records joined with person name and department.
    async fn list_report_rows(&self, filter: &ReportFilter) -> AttendanceResult<Vec<ReportRow>>;
}

/// Read-only view of the external identity store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonDirectory: Send + Sync {
    async fn get_person(&self, person_id: &str) -> AttendanceResult<Option<Person>>;
}
