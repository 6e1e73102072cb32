//! Daily attendance ledger: one check-in/check-out pair per person per day,
//! bucketed by calendar date in a fixed reporting zone, plus the admin report
//! and CSV export built on top of it.

pub mod access;
pub mod attendance;
pub mod config;
pub mod database;
pub mod error;
pub mod utils;

pub use attendance::{
    AttendanceLedger, AttendanceRepository, LedgerPolicy, PersonDirectory, ReportAggregator,
    ReportFilter,
};
pub use config::Config;
pub use database::SqliteAttendanceStore;
pub use database::models::{
    AttendanceAction, AttendanceRecord, AttendanceStatus, Person, ReportRow, Role, TodayStatus,
};
pub use error::{AttendanceError, AttendanceResult};
