//! Aggregations over attendance records. All functions here are pure: they
//! take the already-fetched records and return summary values, so the same
//! inputs always produce the same output.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::engine::status::round2;
use crate::model::attendance::{AttendanceRecord, AttendanceWithUser, Status};

/// Per-status tallies for one user's month (or any record set).
#[derive(Debug, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    #[schema(example = 18)]
    pub present: u64,
    #[schema(example = 2)]
    pub late: u64,
    #[schema(example = 1)]
    pub half_day: u64,
    #[schema(example = 1)]
    pub absent: u64,
    #[schema(example = 161.25)]
    pub total_hours: f64,
    #[schema(example = 22)]
    pub total_days: u64,
}

/// Tally a record set into the four status buckets. Unknown statuses are
/// skipped, but their hours still count toward the total; `total_hours` is
/// rounded once at the end, not per record.
pub fn summarize(records: &[AttendanceRecord]) -> AttendanceSummary {
    let mut summary = AttendanceSummary::default();
    let mut hours = 0.0;

    for record in records {
        match Status::parse(&record.status) {
            Some(Status::Present) => summary.present += 1,
            Some(Status::Late) => summary.late += 1,
            Some(Status::HalfDay) => summary.half_day += 1,
            Some(Status::Absent) => summary.absent += 1,
            None => {}
        }
        hours += record.total_hours;
    }

    summary.total_hours = round2(hours);
    summary.total_days = records.len() as u64;
    summary
}

/// One day's records partitioned into who showed up and who is marked absent.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaySnapshot {
    #[schema(example = 12)]
    pub total_records: usize,
    pub present: Vec<AttendanceWithUser>,
    pub absent: Vec<AttendanceWithUser>,
}

pub fn day_snapshot(records: Vec<AttendanceWithUser>) -> DaySnapshot {
    let total_records = records.len();
    let mut present = Vec::new();
    let mut absent = Vec::new();

    for record in records {
        match record.status() {
            Some(status) if status.is_present_like() => present.push(record),
            Some(Status::Absent) => absent.push(record),
            _ => {}
        }
    }

    DaySnapshot {
        total_records,
        present,
        absent,
    }
}

/// Attendance-per-date counts for the trend chart. Callers pass the records
/// whose `created_at` falls in the trailing window; output is keyed by the
/// attendance `date`, so a record back-filled outside its original day never
/// shows up even though its date would be in range. Every record's date gets
/// an entry; only present-like records increment it.
pub fn weekly_trend(records: &[AttendanceRecord]) -> BTreeMap<String, u64> {
    let mut trend = BTreeMap::new();

    for record in records {
        let count = trend.entry(record.date.clone()).or_insert(0);
        if record.is_present_like() {
            *count += 1;
        }
    }

    trend
}

/// Present/absent tallies for one department on one day.
#[derive(Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct DepartmentDayCounts {
    #[schema(example = 9)]
    pub present: u64,
    #[schema(example = 1)]
    pub absent: u64,
}

fn department_label(department: &Option<String>) -> String {
    match department {
        Some(d) if !d.is_empty() => d.clone(),
        _ => "Unknown".to_owned(),
    }
}

/// Group a day's records by the owning user's department. Present-like
/// statuses count as present; only explicit absent rows count as absent.
pub fn department_rollup(
    records: &[AttendanceWithUser],
) -> BTreeMap<String, DepartmentDayCounts> {
    let mut stats: BTreeMap<String, DepartmentDayCounts> = BTreeMap::new();

    for record in records {
        let counts = stats.entry(department_label(&record.department)).or_default();
        match record.status() {
            Some(status) if status.is_present_like() => counts.present += 1,
            Some(Status::Absent) => counts.absent += 1,
            _ => {}
        }
    }

    stats
}

/// Four-bucket tallies used by the team summary's department breakdown.
#[derive(Debug, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub present: u64,
    pub late: u64,
    pub half_day: u64,
    pub absent: u64,
}

impl StatusCounts {
    fn bump(&mut self, status: Status) {
        match status {
            Status::Present => self.present += 1,
            Status::Late => self.late += 1,
            Status::HalfDay => self.half_day += 1,
            Status::Absent => self.absent += 1,
        }
    }
}

/// Overall and per-department status counts across all records.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    #[schema(example = 240)]
    pub total_records: usize,
    pub present: u64,
    pub late: u64,
    pub half_day: u64,
    pub absent: u64,
    pub department_wise: BTreeMap<String, StatusCounts>,
}

pub fn team_summary(records: &[AttendanceWithUser]) -> TeamSummary {
    let mut totals = StatusCounts::default();
    let mut department_wise: BTreeMap<String, StatusCounts> = BTreeMap::new();

    for record in records {
        let counts = department_wise
            .entry(department_label(&record.department))
            .or_default();
        if let Some(status) = record.status() {
            totals.bump(status);
            counts.bump(status);
        }
    }

    TeamSummary {
        total_records: records.len(),
        present: totals.present,
        late: totals.late,
        half_day: totals.half_day,
        absent: totals.absent,
        department_wise,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(date: &str, status: &str, hours: f64) -> AttendanceRecord {
        AttendanceRecord {
            id: 0,
            user_id: 1,
            date: date.to_owned(),
            check_in_time: NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(9, 0, 0)),
            check_out_time: None,
            status: status.to_owned(),
            total_hours: hours,
            created_at: None,
        }
    }

    fn with_user(status: &str, department: Option<&str>) -> AttendanceWithUser {
        AttendanceWithUser {
            id: 0,
            user_id: 1,
            date: "2026-08-06".to_owned(),
            check_in_time: None,
            check_out_time: None,
            status: status.to_owned(),
            total_hours: 0.0,
            created_at: None,
            employee_code: "EMP001".to_owned(),
            name: "Jo".to_owned(),
            email: "jo@company.com".to_owned(),
            department: department.map(str::to_owned),
        }
    }

    #[test]
    fn summarize_tallies_each_bucket() {
        let records = vec![
            record("2026-08-03", "present", 8.0),
            record("2026-08-04", "present", 7.5),
            record("2026-08-05", "present", 8.25),
            record("2026-08-06", "late", 6.1),
            record("2026-08-07", "absent", 0.0),
        ];

        let summary = summarize(&records);
        assert_eq!(
            summary,
            AttendanceSummary {
                present: 3,
                late: 1,
                half_day: 0,
                absent: 1,
                total_hours: 29.85,
                total_days: 5,
            }
        );
    }

    #[test]
    fn summarize_skips_unknown_statuses_but_keeps_their_hours() {
        let records = vec![
            record("2026-08-03", "present", 8.0),
            record("2026-08-04", "on-leave", 4.0),
        ];

        let summary = summarize(&records);
        assert_eq!(summary.present, 1);
        assert_eq!(summary.absent, 0);
        assert_eq!(summary.total_days, 2);
        assert_eq!(summary.total_hours, 12.0);
    }

    #[test]
    fn summarize_rounds_the_final_sum_not_per_record() {
        // 1.004 + 1.004 = 2.008 → 2.01; per-record rounding would give 2.0
        let records = vec![
            record("2026-08-03", "present", 1.004),
            record("2026-08-04", "present", 1.004),
        ];
        assert_eq!(summarize(&records).total_hours, 2.01);
    }

    #[test]
    fn summarize_is_pure() {
        let records = vec![
            record("2026-08-03", "present", 8.0),
            record("2026-08-04", "absent", 0.0),
        ];
        assert_eq!(summarize(&records), summarize(&records));
    }

    #[test]
    fn day_snapshot_partitions_present_like_and_absent() {
        let records = vec![
            with_user("present", Some("Eng")),
            with_user("late", Some("Eng")),
            with_user("half-day", Some("Sales")),
            with_user("absent", Some("Sales")),
        ];

        let snapshot = day_snapshot(records);
        assert_eq!(snapshot.total_records, 4);
        assert_eq!(snapshot.present.len(), 3);
        assert_eq!(snapshot.absent.len(), 1);
    }

    #[test]
    fn weekly_trend_counts_present_like_per_date() {
        let records = vec![
            record("2026-08-03", "present", 8.0),
            record("2026-08-03", "late", 7.0),
            record("2026-08-04", "absent", 0.0),
        ];

        let trend = weekly_trend(&records);
        assert_eq!(trend.get("2026-08-03"), Some(&2));
        // an absent-only date still appears, with a zero count
        assert_eq!(trend.get("2026-08-04"), Some(&0));
    }

    #[test]
    fn weekly_trend_window_is_creation_time_not_date() {
        // The caller filters by created_at; a record whose date is in range
        // but that was created outside the window simply never reaches this
        // function. Keying stays by attendance date.
        let in_window = vec![record("2026-07-01", "present", 8.0)];
        let trend = weekly_trend(&in_window);
        assert_eq!(trend.get("2026-07-01"), Some(&1));
    }

    #[test]
    fn department_rollup_conserves_record_count() {
        let records = vec![
            with_user("present", Some("Eng")),
            with_user("late", Some("Eng")),
            with_user("absent", Some("Sales")),
            with_user("half-day", None),
            with_user("absent", Some("")),
        ];

        let rollup = department_rollup(&records);
        assert_eq!(
            rollup.get("Eng"),
            Some(&DepartmentDayCounts {
                present: 2,
                absent: 0
            })
        );
        assert_eq!(
            rollup.get("Sales"),
            Some(&DepartmentDayCounts {
                present: 0,
                absent: 1
            })
        );
        // missing and empty departments both land under "Unknown"
        assert_eq!(
            rollup.get("Unknown"),
            Some(&DepartmentDayCounts {
                present: 1,
                absent: 1
            })
        );

        let counted: u64 = rollup.values().map(|c| c.present + c.absent).sum();
        assert_eq!(counted as usize, records.len());
    }

    #[test]
    fn team_summary_totals_match_department_breakdown() {
        let records = vec![
            with_user("present", Some("Eng")),
            with_user("late", Some("Eng")),
            with_user("half-day", Some("Sales")),
            with_user("absent", Some("Sales")),
        ];

        let summary = team_summary(&records);
        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.present, 1);
        assert_eq!(summary.late, 1);
        assert_eq!(summary.half_day, 1);
        assert_eq!(summary.absent, 1);

        let eng = summary.department_wise.get("Eng").unwrap();
        assert_eq!((eng.present, eng.late), (1, 1));
        let sales = summary.department_wise.get("Sales").unwrap();
        assert_eq!((sales.half_day, sales.absent), (1, 1));
    }
}
