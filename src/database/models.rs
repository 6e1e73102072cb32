use crate::error::AttendanceError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Employee,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "EMPLOYEE",
            Role::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EMPLOYEE" => Ok(Role::Employee),
            "ADMIN" => Ok(Role::Admin),
            other => Err(anyhow::anyhow!("Invalid role: {}", other)),
        }
    }
}

/// Employee identity as known to the person directory. Read-only to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub department: String,
    pub role: Role,
}

impl Person {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Classification assigned once, at check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    OnTime,
    Late,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::OnTime => "ON_TIME",
            AttendanceStatus::Late => "LATE",
            AttendanceStatus::Absent => "ABSENT",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON_TIME" => Ok(AttendanceStatus::OnTime),
            "LATE" => Ok(AttendanceStatus::Late),
            "ABSENT" => Ok(AttendanceStatus::Absent),
            other => Err(anyhow::anyhow!("Invalid attendance status: {}", other)),
        }
    }
}

/// Derived view of a person's current day. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodayStatus {
    NotCheckedIn,
    CheckedIn,
    CheckedOut,
}

impl TodayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodayStatus::NotCheckedIn => "NOT_CHECKED_IN",
            TodayStatus::CheckedIn => "CHECKED_IN",
            TodayStatus::CheckedOut => "CHECKED_OUT",
        }
    }
}

impl fmt::Display for TodayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceAction {
    CheckIn,
    CheckOut,
}

impl AttendanceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceAction::CheckIn => "check-in",
            AttendanceAction::CheckOut => "check-out",
        }
    }
}

impl fmt::Display for AttendanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceAction {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check-in" => Ok(AttendanceAction::CheckIn),
            "check-out" => Ok(AttendanceAction::CheckOut),
            other => Err(AttendanceError::InvalidAction(other.to_string())),
        }
    }
}

/// One person's attendance for one calendar day in the reporting zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub person_id: String,
    pub date: NaiveDate,
    pub check_in_time: DateTime<Utc>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.check_out_time.is_none()
    }

    pub fn worked_minutes(&self) -> Option<i64> {
        self.check_out_time
            .map(|out| out.signed_duration_since(self.check_in_time).num_minutes())
    }
}

/// A ledger record joined with the directory fields the admin report needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub department: String,
    #[serde(flatten)]
    pub record: AttendanceRecord,
}
