pub mod status;
pub mod summary;

use chrono::{NaiveDateTime, NaiveTime};
use derive_more::Display;

use crate::model::attendance::AttendanceRecord;
use self::status::{classify_check_in, worked_hours};

/// Precondition violations on the check-in/check-out state machine. These are
/// values, not panics; handlers map them to rejected responses.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum RulesError {
    #[display(fmt = "Already checked in today")]
    AlreadyCheckedIn,
    #[display(fmt = "Already checked out today")]
    AlreadyCheckedOut,
    #[display(fmt = "You have not checked in today")]
    NotCheckedIn,
}

/// Outcome of a check-in: the record to persist and whether it must be
/// inserted or saved in place.
#[derive(Debug)]
pub struct CheckIn {
    pub record: AttendanceRecord,
    /// `false` when an existing record without a check-in time was filled in
    /// instead of creating a duplicate for the same (user, date).
    pub is_new: bool,
}

/// Record a check-in for `date`. The caller supplies today's record (if any),
/// the current instant, and the configured office start.
pub fn apply_check_in(
    existing: Option<AttendanceRecord>,
    user_id: u64,
    date: &str,
    now: NaiveDateTime,
    office_start: NaiveTime,
) -> Result<CheckIn, RulesError> {
    let status = classify_check_in(now, office_start);

    match existing {
        Some(record) if record.check_in_time.is_some() => Err(RulesError::AlreadyCheckedIn),
        Some(mut record) => {
            // A record without a check-in should not normally exist, but
            // filling it in upholds the one-record-per-day invariant.
            record.check_in_time = Some(now);
            record.status = status.to_string();
            Ok(CheckIn {
                record,
                is_new: false,
            })
        }
        None => Ok(CheckIn {
            record: AttendanceRecord::new(user_id, date, now, status),
            is_new: true,
        }),
    }
}

/// Record a check-out: sets the check-out instant and the derived
/// `total_hours`. The record is never mutated again after this.
pub fn apply_check_out(
    existing: Option<AttendanceRecord>,
    now: NaiveDateTime,
) -> Result<AttendanceRecord, RulesError> {
    let mut record = match existing {
        Some(record) => record,
        None => return Err(RulesError::NotCheckedIn),
    };

    let check_in = match record.check_in_time {
        Some(t) => t,
        None => return Err(RulesError::NotCheckedIn),
    };

    if record.check_out_time.is_some() {
        return Err(RulesError::AlreadyCheckedOut);
    }

    record.check_out_time = Some(now);
    record.total_hours = worked_hours(check_in, now);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn office_start() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 30, 0).unwrap()
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn first_check_in_creates_a_record() {
        let out = apply_check_in(None, 7, "2026-08-06", at(9, 28, 0), office_start()).unwrap();
        assert!(out.is_new);
        assert_eq!(out.record.user_id, 7);
        assert_eq!(out.record.date, "2026-08-06");
        assert_eq!(out.record.check_in_time, Some(at(9, 28, 0)));
        assert_eq!(out.record.status, "present");
        assert_eq!(out.record.total_hours, 0.0);
    }

    #[test]
    fn second_check_in_is_rejected() {
        let first = apply_check_in(None, 7, "2026-08-06", at(9, 28, 0), office_start())
            .unwrap()
            .record;
        let err = apply_check_in(Some(first), 7, "2026-08-06", at(15, 0, 0), office_start())
            .unwrap_err();
        assert_eq!(err, RulesError::AlreadyCheckedIn);
    }

    #[test]
    fn check_in_backfills_a_record_missing_its_check_in() {
        let mut stray = AttendanceRecord::new(
            7,
            "2026-08-06",
            at(9, 0, 0),
            crate::model::attendance::Status::Present,
        );
        stray.check_in_time = None;

        let out = apply_check_in(Some(stray), 7, "2026-08-06", at(10, 0, 0), office_start())
            .unwrap();
        assert!(!out.is_new);
        assert_eq!(out.record.check_in_time, Some(at(10, 0, 0)));
        assert_eq!(out.record.status, "late");
    }

    #[test]
    fn check_out_without_check_in_is_rejected() {
        assert_eq!(
            apply_check_out(None, at(17, 0, 0)).unwrap_err(),
            RulesError::NotCheckedIn
        );

        let mut stray = AttendanceRecord::new(
            7,
            "2026-08-06",
            at(9, 0, 0),
            crate::model::attendance::Status::Present,
        );
        stray.check_in_time = None;
        assert_eq!(
            apply_check_out(Some(stray), at(17, 0, 0)).unwrap_err(),
            RulesError::NotCheckedIn
        );
    }

    #[test]
    fn check_out_sets_derived_hours_once() {
        let checked_in = apply_check_in(None, 7, "2026-08-06", at(9, 30, 0), office_start())
            .unwrap()
            .record;

        let done = apply_check_out(Some(checked_in), at(17, 45, 0)).unwrap();
        assert_eq!(done.check_out_time, Some(at(17, 45, 0)));
        assert_eq!(done.total_hours, 8.25);

        let err = apply_check_out(Some(done), at(18, 0, 0)).unwrap_err();
        assert_eq!(err, RulesError::AlreadyCheckedOut);
    }

    #[test]
    fn rules_errors_read_as_user_messages() {
        assert_eq!(
            RulesError::AlreadyCheckedIn.to_string(),
            "Already checked in today"
        );
        assert_eq!(
            RulesError::NotCheckedIn.to_string(),
            "You have not checked in today"
        );
    }
}
