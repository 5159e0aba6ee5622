use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Attendance status, assigned at check-in (absence rows are written by
/// external processes, never by the check-in path).
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, Serialize, Deserialize, ToSchema,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Present,
    Late,
    HalfDay,
    Absent,
}

impl Status {
    /// Statuses counted as "showed up" by snapshots, trends, and rollups.
    pub fn is_present_like(self) -> bool {
        !matches!(self, Status::Absent)
    }

    /// Lenient parse of a stored status string. Unknown values yield `None`
    /// and fall out of every aggregate.
    pub fn parse(value: &str) -> Option<Self> {
        Status::from_str(value).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    /// Local civil date "YYYY-MM-DD". Fixed-width strings keep range and
    /// month-prefix filters a plain lexicographic compare.
    #[schema(example = "2026-08-06")]
    pub date: String,
    #[schema(example = "2026-08-06T09:28:00", format = "date-time", value_type = Option<String>)]
    pub check_in_time: Option<NaiveDateTime>,
    #[schema(example = "2026-08-06T17:45:00", format = "date-time", value_type = Option<String>)]
    pub check_out_time: Option<NaiveDateTime>,
    #[schema(example = "present")]
    pub status: String,
    /// Worked hours derived on check-out, rounded to 2 decimals.
    #[schema(example = 8.25)]
    pub total_hours: f64,
    #[schema(example = "2026-08-06T09:28:00Z", format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AttendanceRecord {
    /// Fresh record for a first check-in of the day. `id` and `created_at`
    /// are assigned by the store on insert.
    pub fn new(user_id: u64, date: &str, check_in: NaiveDateTime, status: Status) -> Self {
        Self {
            id: 0,
            user_id,
            date: date.to_owned(),
            check_in_time: Some(check_in),
            check_out_time: None,
            status: status.to_string(),
            total_hours: 0.0,
            created_at: None,
        }
    }

    pub fn status(&self) -> Option<Status> {
        Status::parse(&self.status)
    }

    pub fn is_present_like(&self) -> bool {
        self.status().map(Status::is_present_like).unwrap_or(false)
    }
}

/// Attendance row joined with the owning user, for manager views and export.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceWithUser {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "2026-08-06")]
    pub date: String,
    #[schema(example = "2026-08-06T09:28:00", format = "date-time", value_type = Option<String>)]
    pub check_in_time: Option<NaiveDateTime>,
    #[schema(example = "2026-08-06T17:45:00", format = "date-time", value_type = Option<String>)]
    pub check_out_time: Option<NaiveDateTime>,
    #[schema(example = "present")]
    pub status: String,
    #[schema(example = 8.25)]
    pub total_hours: f64,
    #[schema(example = "2026-08-06T09:28:00Z", format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(example = "EMP001")]
    pub employee_code: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@company.com")]
    pub email: String,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
}

impl AttendanceWithUser {
    pub fn status(&self) -> Option<Status> {
        Status::parse(&self.status)
    }

    pub fn is_present_like(&self) -> bool {
        self.status().map(Status::is_present_like).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        assert_eq!(Status::Present.to_string(), "present");
        assert_eq!(Status::HalfDay.to_string(), "half-day");
        assert_eq!(Status::parse("late"), Some(Status::Late));
        assert_eq!(Status::parse("half-day"), Some(Status::HalfDay));
        assert_eq!(Status::parse("vacation"), None);
    }

    #[test]
    fn absent_is_not_present_like() {
        assert!(Status::Present.is_present_like());
        assert!(Status::Late.is_present_like());
        assert!(Status::HalfDay.is_present_like());
        assert!(!Status::Absent.is_present_like());
    }
}
