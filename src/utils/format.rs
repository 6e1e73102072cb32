use crate::database::models::{AttendanceRecord, ReportRow, TodayStatus};
use crate::utils::time::{format_duration_minutes, format_time_local};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

const OPEN_TIME_PLACEHOLDER: &str = "--:--";

fn format_optional_time(timestamp: Option<DateTime<Utc>>, offset: FixedOffset) -> String {
    timestamp
        .map(|ts| format_time_local(ts, offset))
        .unwrap_or_else(|| OPEN_TIME_PLACEHOLDER.to_string())
}

pub fn format_today_status(person_name: &str, date: NaiveDate, status: TodayStatus) -> String {
    let description = match status {
        TodayStatus::NotCheckedIn => "has not checked in yet",
        TodayStatus::CheckedIn => "is checked in",
        TodayStatus::CheckedOut => "has finished for the day",
    };

    format!(
        "{} {} ({}, {})",
        person_name,
        description,
        date.format("%Y-%m-%d (%a)"),
        status
    )
}

pub fn format_history(records: &[AttendanceRecord], offset: FixedOffset) -> String {
    if records.is_empty() {
        return "No attendance history yet".to_string();
    }

    let mut summary = String::new();
    let mut total_minutes = 0i64;

    for record in records {
        summary.push_str(&format!(
            "{}  in {}  out {}  {}",
            record.date.format("%Y-%m-%d (%a)"),
            format_time_local(record.check_in_time, offset),
            format_optional_time(record.check_out_time, offset),
            record.status
        ));

        if let Some(minutes) = record.worked_minutes() {
            summary.push_str(&format!("  ({})", format_duration_minutes(minutes)));
            total_minutes += minutes;
        }
        summary.push('\n');
    }

    if total_minutes > 0 {
        summary.push_str(&format!(
            "Total worked: {}",
            format_duration_minutes(total_minutes)
        ));
    }

    summary
}

pub fn format_report_table(rows: &[ReportRow], offset: FixedOffset) -> String {
    if rows.is_empty() {
        return "No attendance records for this period".to_string();
    }

    let name_width = rows
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());
    let department_width = rows
        .iter()
        .map(|row| row.department.chars().count())
        .max()
        .unwrap_or(0)
        .max("Department".len());

    let mut table = format!(
        "{:<name_width$}  {:<department_width$}  {:<10}  {:<5}  {:<5}  {}\n",
        "Name", "Department", "Date", "In", "Out", "Status"
    );

    for row in rows {
        table.push_str(&format!(
            "{:<name_width$}  {:<department_width$}  {:<10}  {:<5}  {:<5}  {}\n",
            row.name,
            row.department,
            row.record.date.format("%Y-%m-%d").to_string(),
            format_time_local(row.record.check_in_time, offset),
            format_optional_time(row.record.check_out_time, offset),
            row.record.status
        ));
    }

    table
}

pub fn format_error_message(error: &str) -> String {
    format!("error: {}", error)
}

pub fn format_success_message(message: &str) -> String {
    format!("ok: {}", message)
}
