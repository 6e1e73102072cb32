use crate::attendance::report::ReportFilter;
use crate::attendance::repository::{AttendanceRepository, PersonDirectory};
use crate::database::models::{AttendanceRecord, AttendanceStatus, Person, ReportRow, Role};
use crate::error::AttendanceResult;
use crate::utils::validation::validate_person_fields;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

fn record_from_row(row: &SqliteRow) -> Result<AttendanceRecord> {
    let status: String = row.try_get("status")?;

    Ok(AttendanceRecord {
        person_id: row.try_get("person_id")?,
        date: row.try_get("date")?,
        check_in_time: row.try_get("check_in_time")?,
        check_out_time: row.try_get("check_out_time")?,
        status: status.parse::<AttendanceStatus>()?,
    })
}

fn person_from_row(row: &SqliteRow) -> Result<Person> {
    let role: String = row.try_get("role")?;

    Ok(Person {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        department: row.try_get("department")?,
        role: role.parse::<Role>()?,
    })
}

// Person queries
pub async fn upsert_person(pool: &SqlitePool, person: &Person) -> Result<()> {
    validate_person_fields(&person.id, &person.name, &person.department)?;

    sqlx::query(
        "INSERT INTO persons (id, name, department, role) VALUES (?, ?, ?, ?)
         ON CONFLICT (id) DO UPDATE SET
             name = excluded.name,
             department = excluded.department,
             role = excluded.role,
             updated_at = CURRENT_TIMESTAMP",
    )
    .bind(&person.id)
    .bind(&person.name)
    .bind(&person.department)
    .bind(person.role.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_person_by_id(pool: &SqlitePool, person_id: &str) -> Result<Option<Person>> {
    let row = sqlx::query("SELECT id, name, department, role FROM persons WHERE id = ?")
        .bind(person_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(person_from_row).transpose()
}

pub async fn list_persons(pool: &SqlitePool) -> Result<Vec<Person>> {
    let rows =
        sqlx::query("SELECT id, name, department, role FROM persons ORDER BY name ASC, id ASC")
            .fetch_all(pool)
            .await?;

    rows.iter().map(person_from_row).collect()
}

// Attendance record queries
pub async fn insert_record_if_absent(pool: &SqlitePool, record: &AttendanceRecord) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO attendance_records (person_id, date, check_in_time, check_out_time, status)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT (person_id, date) DO NOTHING",
    )
    .bind(&record.person_id)
    .bind(record.date)
    .bind(record.check_in_time)
    .bind(record.check_out_time)
    .bind(record.status.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn get_record(
    pool: &SqlitePool,
    person_id: &str,
    date: NaiveDate,
) -> Result<Option<AttendanceRecord>> {
    let row = sqlx::query(
        "SELECT person_id, date, check_in_time, check_out_time, status
         FROM attendance_records WHERE person_id = ? AND date = ?",
    )
    .bind(person_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(record_from_row).transpose()
}

pub async fn complete_record(
    pool: &SqlitePool,
    person_id: &str,
    date: NaiveDate,
    check_out_time: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE attendance_records
         SET check_out_time = ?, updated_at = CURRENT_TIMESTAMP
         WHERE person_id = ? AND date = ? AND check_out_time IS NULL",
    )
    .bind(check_out_time)
    .bind(person_id)
    .bind(date)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn get_records_for_person(
    pool: &SqlitePool,
    person_id: &str,
) -> Result<Vec<AttendanceRecord>> {
    let rows = sqlx::query(
        "SELECT person_id, date, check_in_time, check_out_time, status
         FROM attendance_records WHERE person_id = ?
         ORDER BY date DESC",
    )
    .bind(person_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}

pub async fn get_report_rows(pool: &SqlitePool, filter: &ReportFilter) -> Result<Vec<ReportRow>> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT r.person_id, r.date, r.check_in_time, r.check_out_time, r.status,
                p.name, p.department
         FROM attendance_records r
         JOIN persons p ON p.id = r.person_id
         WHERE 1 = 1",
    );

    if let Some(from) = filter.from {
        builder.push(" AND r.date >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        builder.push(" AND r.date <= ").push_bind(to);
    }
    if let Some(person_id) = &filter.person_id {
        builder.push(" AND r.person_id = ").push_bind(person_id.clone());
    }
    if let Some(department) = &filter.department {
        builder.push(" AND p.department = ").push_bind(department.clone());
    }
    builder.push(" ORDER BY r.date DESC, p.name ASC, r.person_id ASC");

    let rows = builder.build().fetch_all(pool).await?;

    rows.iter()
        .map(|row| -> Result<ReportRow> {
            Ok(ReportRow {
                name: row.try_get("name")?,
                department: row.try_get("department")?,
                record: record_from_row(row)?,
            })
        })
        .collect()
}

/// SQLite-backed ledger storage and person directory.
#[derive(Clone)]
pub struct SqliteAttendanceStore {
    pool: SqlitePool,
}

impl SqliteAttendanceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert_person(&self, person: &Person) -> Result<()> {
        debug!(person_id = %person.id, "Upserting person");
        upsert_person(&self.pool, person).await
    }

    pub async fn list_persons(&self) -> Result<Vec<Person>> {
        list_persons(&self.pool).await
    }
}

#[async_trait]
impl AttendanceRepository for SqliteAttendanceStore {
    async fn insert_if_absent(&self, record: &AttendanceRecord) -> AttendanceResult<bool> {
        Ok(insert_record_if_absent(&self.pool, record).await?)
    }

    async fn find_record(
        &self,
        person_id: &str,
        date: NaiveDate,
    ) -> AttendanceResult<Option<AttendanceRecord>> {
        Ok(get_record(&self.pool, person_id, date).await?)
    }

    async fn complete_record(
        &self,
        person_id: &str,
        date: NaiveDate,
        check_out_time: DateTime<Utc>,
    ) -> AttendanceResult<bool> {
        Ok(complete_record(&self.pool, person_id, date, check_out_time).await?)
    }

    async fn list_for_person(&self, person_id: &str) -> AttendanceResult<Vec<AttendanceRecord>> {
        Ok(get_records_for_person(&self.pool, person_id).await?)
    }

    async fn list_report_rows(&self, filter: &ReportFilter) -> AttendanceResult<Vec<ReportRow>> {
        Ok(get_report_rows(&self.pool, filter).await?)
    }
}

#[async_trait]
impl PersonDirectory for SqliteAttendanceStore {
    async fn get_person(&self, person_id: &str) -> AttendanceResult<Option<Person>> {
        Ok(get_person_by_id(&self.pool, person_id).await?)
    }
}
