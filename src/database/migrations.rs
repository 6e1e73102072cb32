use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    create_persons_table(pool).await?;
    create_attendance_records_table(pool).await?;
    create_attendance_date_index(pool).await?;

    info!("Database migrations completed successfully");
    Ok(())
}

async fn create_persons_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS persons (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            department TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('EMPLOYEE', 'ADMIN')),
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

// One row per (person_id, date); the unique key is what serializes concurrent check-ins.
async fn create_attendance_records_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance_records (
            id INTEGER PRIMARY KEY,
            person_id TEXT NOT NULL,
            date DATE NOT NULL,
            check_in_time DATETIME NOT NULL,
            check_out_time DATETIME,
            status TEXT NOT NULL CHECK (status IN ('ON_TIME', 'LATE', 'ABSENT')),
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (person_id, date),
            FOREIGN KEY (person_id) REFERENCES persons (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_attendance_date_index(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_attendance_records_date ON attendance_records (date)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
