use crate::attendance::repository::{AttendanceRepository, PersonDirectory};
use crate::config::Config;
use crate::database::models::{AttendanceAction, AttendanceRecord, AttendanceStatus, TodayStatus};
use crate::error::{AttendanceError, AttendanceResult};
use crate::utils::time::{jakarta_offset, local_date, local_time};
use crate::utils::validation::validate_check_out_order;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Day bucketing and lateness rules applied by the ledger.
#[derive(Debug, Clone)]
pub struct LedgerPolicy {
    pub offset: FixedOffset,
    pub late_cutoff: NaiveTime,
    /// How long after check-in a check-out on the following day may still
    /// close the previous day's record. Zero disables it.
    pub overnight_grace: Duration,
}

impl LedgerPolicy {
    pub fn new(offset: FixedOffset, late_cutoff: NaiveTime) -> Self {
        Self {
            offset,
            late_cutoff,
            overnight_grace: Duration::zero(),
        }
    }

    pub fn with_overnight_grace(mut self, grace: Duration) -> Self {
        self.overnight_grace = grace;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(jakarta_offset(), config.late_cutoff).with_overnight_grace(
            Duration::hours(i64::from(config.overnight_checkout_grace_hours)),
        )
    }

    pub fn calendar_date(&self, now: DateTime<Utc>) -> NaiveDate {
        local_date(now, self.offset)
    }

    /// `ON_TIME` at or before the cutoff, `LATE` after it.
    pub fn classify(&self, now: DateTime<Utc>) -> AttendanceStatus {
        if local_time(now, self.offset) <= self.late_cutoff {
            AttendanceStatus::OnTime
        } else {
            AttendanceStatus::Late
        }
    }
}

/// Owns the check-in/check-out lifecycle of attendance records.
pub struct AttendanceLedger {
    repository: Arc<dyn AttendanceRepository>,
    directory: Arc<dyn PersonDirectory>,
    policy: LedgerPolicy,
}

impl AttendanceLedger {
    pub fn new(
        repository: Arc<dyn AttendanceRepository>,
        directory: Arc<dyn PersonDirectory>,
        policy: LedgerPolicy,
    ) -> Self {
        Self {
            repository,
            directory,
            policy,
        }
    }

    pub async fn apply(
        &self,
        action: AttendanceAction,
        person_id: &str,
        now: DateTime<Utc>,
    ) -> AttendanceResult<AttendanceRecord> {
        match action {
            AttendanceAction::CheckIn => self.check_in(person_id, now).await,
            AttendanceAction::CheckOut => self.check_out(person_id, now).await,
        }
    }

    pub async fn check_in(
        &self,
        person_id: &str,
        now: DateTime<Utc>,
    ) -> AttendanceResult<AttendanceRecord> {
        debug!(person_id = %person_id, "Checking in");

        let person = self
            .directory
            .get_person(person_id)
            .await?
            .ok_or_else(|| AttendanceError::NotFound(person_id.to_string()))?;

        let today = self.policy.calendar_date(now);

        // A previous-day session that check-out can still close blocks a new one.
        if let Some(open) = self.overnight_record(&person.id, today, now).await? {
            warn!(
                person_id = %open.person_id,
                date = %open.date,
                "Check-in rejected while overnight session is open"
            );
            return Err(AttendanceError::AlreadyCheckedIn {
                person_id: open.person_id,
                date: open.date,
            });
        }

        let record = AttendanceRecord {
            person_id: person.id,
            date: today,
            check_in_time: now,
            check_out_time: None,
            status: self.policy.classify(now),
        };

        if !self.repository.insert_if_absent(&record).await? {
            warn!(
                person_id = %record.person_id,
                date = %record.date,
                "Duplicate check-in rejected"
            );
            return Err(AttendanceError::AlreadyCheckedIn {
                person_id: record.person_id,
                date: record.date,
            });
        }

        info!(
            person_id = %record.person_id,
            date = %record.date,
            status = %record.status,
            "Checked in"
        );
        Ok(record)
    }

    pub async fn check_out(
        &self,
        person_id: &str,
        now: DateTime<Utc>,
    ) -> AttendanceResult<AttendanceRecord> {
        let today = self.policy.calendar_date(now);
        debug!(person_id = %person_id, date = %today, "Checking out");

        let record = match self.repository.find_record(person_id, today).await? {
            Some(record) => record,
            None => self
                .overnight_record(person_id, today, now)
                .await?
                .ok_or_else(|| AttendanceError::NoOpenSession {
                    person_id: person_id.to_string(),
                    date: today,
                })?,
        };

        if !record.is_open() {
            return Err(AttendanceError::AlreadyCheckedOut {
                person_id: record.person_id,
                date: record.date,
            });
        }

        validate_check_out_order(record.check_in_time, now)?;

        // Conditional update; losing a race to another check-out lands here.
        if !self
            .repository
            .complete_record(&record.person_id, record.date, now)
            .await?
        {
            warn!(
                person_id = %record.person_id,
                date = %record.date,
                "Concurrent check-out rejected"
            );
            return Err(AttendanceError::AlreadyCheckedOut {
                person_id: record.person_id,
                date: record.date,
            });
        }

        info!(person_id = %record.person_id, date = %record.date, "Checked out");
        Ok(AttendanceRecord {
            check_out_time: Some(now),
            ..record
        })
    }

    /// Previous day's record, if still open and within the overnight grace window.
    async fn overnight_record(
        &self,
        person_id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> AttendanceResult<Option<AttendanceRecord>> {
        if self.policy.overnight_grace <= Duration::zero() {
            return Ok(None);
        }

        let Some(yesterday) = today.pred_opt() else {
            return Ok(None);
        };

        let record = self.repository.find_record(person_id, yesterday).await?;
        Ok(record.filter(|record| {
            record.is_open()
                && now.signed_duration_since(record.check_in_time) <= self.policy.overnight_grace
        }))
    }

    pub async fn history_for(&self, person_id: &str) -> AttendanceResult<Vec<AttendanceRecord>> {
        debug!(person_id = %person_id, "Loading attendance history");

        let mut records = self.repository.list_for_person(person_id).await?;
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    /// Re-derived from the ledger on every call. An open previous-day session that
    /// check-out would still close counts as checked in.
    pub async fn today_status_for(
        &self,
        person_id: &str,
        now: DateTime<Utc>,
    ) -> AttendanceResult<TodayStatus> {
        let today = self.policy.calendar_date(now);
        let status = match self.repository.find_record(person_id, today).await? {
            None => match self.overnight_record(person_id, today, now).await? {
                Some(_) => TodayStatus::CheckedIn,
                None => TodayStatus::NotCheckedIn,
            },
            Some(record) if record.is_open() => TodayStatus::CheckedIn,
            Some(_) => TodayStatus::CheckedOut,
        };

        debug!(
            person_id = %person_id,
            date = %today,
            status = %status,
            "Derived today's status"
        );
        Ok(status)
    }
}
