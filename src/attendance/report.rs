use crate::attendance::repository::AttendanceRepository;
use crate::database::models::ReportRow;
use crate::error::AttendanceResult;
use crate::utils::time::{format_time_local, local_date, start_of_month, start_of_week};
use crate::utils::validation::validate_date_range;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const CSV_HEADER: [&str; 6] = ["name", "department", "date", "check_in", "check_out", "status"];
pub const MISSING_TIME_PLACEHOLDER: &str = "-";

/// Optional narrowing of the admin report. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub person_id: Option<String>,
    pub department: Option<String>,
}

impl ReportFilter {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        }
    }

    pub fn today(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let today = local_date(now, offset);
        Self::between(today, today)
    }

    /// Monday of the current week through today.
    pub fn this_week(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let today = local_date(now, offset);
        Self::between(start_of_week(today), today)
    }

    pub fn this_month(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let today = local_date(now, offset);
        Self::between(start_of_month(today), today)
    }

    pub fn for_person(mut self, person_id: impl Into<String>) -> Self {
        self.person_id = Some(person_id.into());
        self
    }

    pub fn for_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn validate(&self) -> AttendanceResult<()> {
        validate_date_range(self.from, self.to)
    }
}

/// Date descending, then name ascending, then person id for equal names.
pub fn report_order(a: &ReportRow, b: &ReportRow) -> Ordering {
    b.record
        .date
        .cmp(&a.record.date)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.record.person_id.cmp(&b.record.person_id))
}

/// Read-only administrative view over the whole ledger.
/// Callers are expected to have passed an admin check before reaching it.
pub struct ReportAggregator {
    repository: Arc<dyn AttendanceRepository>,
    offset: FixedOffset,
}

impl ReportAggregator {
    pub fn new(repository: Arc<dyn AttendanceRepository>, offset: FixedOffset) -> Self {
        Self { repository, offset }
    }

    pub async fn all_records(
        &self,
        filter: Option<&ReportFilter>,
    ) -> AttendanceResult<Vec<ReportRow>> {
        let default_filter = ReportFilter::default();
        let filter = filter.unwrap_or(&default_filter);
        filter.validate()?;

        debug!(?filter, "Compiling attendance report");

        let mut rows = self.repository.list_report_rows(filter).await?;
        rows.sort_by(report_order);

        info!(count = rows.len(), "Compiled attendance report");
        Ok(rows)
    }

    pub async fn export_csv(&self, filter: Option<&ReportFilter>) -> AttendanceResult<Vec<u8>> {
        let rows = self.all_records(filter).await?;
        self.render_csv(&rows)
    }

    pub fn render_csv(&self, rows: &[ReportRow]) -> AttendanceResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;

        for row in rows {
            let check_in = format_time_local(row.record.check_in_time, self.offset);
            let check_out = row
                .record
                .check_out_time
                .map(|out| format_time_local(out, self.offset))
                .unwrap_or_else(|| MISSING_TIME_PLACEHOLDER.to_string());
            let date = row.record.date.format("%Y-%m-%d").to_string();

            writer.write_record([
                row.name.as_str(),
                row.department.as_str(),
                date.as_str(),
                check_in.as_str(),
                check_out.as_str(),
                row.record.status.as_str(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(bytes)
    }
}

/// Suggested download name for an export generated on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("attendance_report_{}.csv", date.format("%Y-%m-%d"))
}
