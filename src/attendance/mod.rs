pub mod ledger;
pub mod report;
pub mod repository;

pub use ledger::{AttendanceLedger, LedgerPolicy};
pub use report::{ReportAggregator, ReportFilter};
pub use repository::{AttendanceRepository, PersonDirectory};
