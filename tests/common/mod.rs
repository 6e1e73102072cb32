#![allow(dead_code)]

use attendance_ledger::database::create_connection;
use attendance_ledger::utils::time::jakarta_offset;
use attendance_ledger::{
    AttendanceLedger, LedgerPolicy, Person, ReportAggregator, Role, SqliteAttendanceStore,
};
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use std::sync::Arc;

pub struct TestContext {
    pub store: Arc<SqliteAttendanceStore>,
    pub ledger: Arc<AttendanceLedger>,
    pub reports: ReportAggregator,
}

impl TestContext {
    /// In-memory ledger with a 09:00 Jakarta cutoff.
    pub async fn new() -> Self {
        Self::with_policy(LedgerPolicy::new(
            jakarta_offset(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        ))
        .await
    }

    pub async fn with_policy(policy: LedgerPolicy) -> Self {
        Self::open("sqlite::memory:", policy).await
    }

    pub async fn open(database_url: &str, policy: LedgerPolicy) -> Self {
        let pool = create_connection(database_url)
            .await
            .expect("Failed to create database");
        let store = Arc::new(SqliteAttendanceStore::new(pool));

        let ledger = Arc::new(AttendanceLedger::new(store.clone(), store.clone(), policy));
        let reports = ReportAggregator::new(store.clone(), jakarta_offset());

        Self {
            store,
            ledger,
            reports,
        }
    }

    pub async fn add_person(&self, id: &str, name: &str, department: &str, role: Role) {
        self.store
            .upsert_person(&Person {
                id: id.to_string(),
                name: name.to_string(),
                department: department.to_string(),
                role,
            })
            .await
            .expect("Failed to add person");
    }
}

/// Jakarta wall-clock time as UTC.
pub fn jakarta(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    jakarta_offset()
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
        .to_utc()
}
