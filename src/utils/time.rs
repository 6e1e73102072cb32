use anyhow::Result;
use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, Utc};

/// Asia/Jakarta has no daylight saving time, so a fixed +07:00 offset is exact.
pub const JAKARTA_OFFSET_SECONDS: i32 = 7 * 3600;

pub fn jakarta_offset() -> FixedOffset {
    FixedOffset::east_opt(JAKARTA_OFFSET_SECONDS).expect("+07:00 is a valid offset")
}

pub fn parse_time_string(time_str: &str) -> Result<NaiveTime> {
    let time_str = time_str.trim();

    if let Ok(time) = NaiveTime::parse_from_str(time_str, "%H:%M") {
        return Ok(time);
    }

    if let Ok(time) = NaiveTime::parse_from_str(time_str, "%H:%M:%S") {
        return Ok(time);
    }

    Err(anyhow::anyhow!("Invalid time format. Use HH:MM or HH:MM:SS"))
}

pub fn parse_datetime_utc(datetime_str: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(datetime_str.trim())
        .map_err(|e| anyhow::anyhow!("Invalid RFC 3339 timestamp '{}': {}", datetime_str, e))?;
    Ok(parsed.to_utc())
}

pub fn local_datetime(timestamp: DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    timestamp.with_timezone(&offset)
}

/// Calendar day of `timestamp` in the given zone.
pub fn local_date(timestamp: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    local_datetime(timestamp, offset).date_naive()
}

pub fn local_time(timestamp: DateTime<Utc>, offset: FixedOffset) -> NaiveTime {
    local_datetime(timestamp, offset).time()
}

pub fn format_time_local(timestamp: DateTime<Utc>, offset: FixedOffset) -> String {
    local_datetime(timestamp, offset).format("%H:%M").to_string()
}

pub fn format_datetime_local(timestamp: DateTime<Utc>, offset: FixedOffset) -> String {
    local_datetime(timestamp, offset)
        .format("%Y-%m-%d %H:%M:%S %:z")
        .to_string()
}

pub fn format_duration_minutes(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let days_since_monday = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(days_since_monday))
        .unwrap_or(date)
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}
