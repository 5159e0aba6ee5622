use chrono::{NaiveDateTime, NaiveTime};

use crate::model::attendance::Status;

/// Check-ins up to this long after office start still count as present.
const PRESENT_GRACE_SECS: i64 = 5 * 60;
/// Check-ins up to this long after office start count as late; anything
/// beyond is a half-day.
const LATE_CUTOFF_SECS: i64 = 60 * 60;

/// Classify a check-in's punctuality against the configured office start.
/// The reference instant is the check-in's own calendar date at
/// `office_start` (seconds zero); early check-ins land in the present branch.
/// Compared at second precision so a 5m30s delay is late, not present.
pub fn classify_check_in(check_in: NaiveDateTime, office_start: NaiveTime) -> Status {
    let office_start_instant = check_in.date().and_time(office_start);
    let diff_secs = check_in
        .signed_duration_since(office_start_instant)
        .num_seconds();

    if diff_secs <= PRESENT_GRACE_SECS {
        Status::Present
    } else if diff_secs <= LATE_CUTOFF_SECS {
        Status::Late
    } else {
        Status::HalfDay
    }
}

/// Elapsed worked duration in hours, rounded to 2 decimals. Non-negative as
/// long as the caller's clock did not go backwards between the two punches.
pub fn worked_hours(check_in: NaiveDateTime, check_out: NaiveDateTime) -> f64 {
    let millis = check_out.signed_duration_since(check_in).num_milliseconds();
    round2(millis as f64 / 3_600_000.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 30, 0).unwrap()
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn within_grace_is_present() {
        assert_eq!(classify_check_in(at(9, 34, 0), start()), Status::Present);
        // boundary: exactly five minutes after office start
        assert_eq!(classify_check_in(at(9, 35, 0), start()), Status::Present);
    }

    #[test]
    fn early_arrival_is_present() {
        assert_eq!(classify_check_in(at(7, 0, 0), start()), Status::Present);
    }

    #[test]
    fn past_grace_up_to_an_hour_is_late() {
        assert_eq!(classify_check_in(at(9, 35, 1), start()), Status::Late);
        assert_eq!(classify_check_in(at(9, 40, 0), start()), Status::Late);
        // boundary: exactly sixty minutes after office start
        assert_eq!(classify_check_in(at(10, 30, 0), start()), Status::Late);
    }

    #[test]
    fn beyond_an_hour_is_half_day() {
        assert_eq!(classify_check_in(at(10, 30, 1), start()), Status::HalfDay);
        assert_eq!(classify_check_in(at(11, 0, 0), start()), Status::HalfDay);
    }

    #[test]
    fn worked_hours_rounds_to_two_decimals() {
        assert_eq!(worked_hours(at(9, 30, 0), at(17, 45, 0)), 8.25);
        assert_eq!(worked_hours(at(9, 30, 0), at(9, 30, 0)), 0.0);
        // 7h59m59s = 7.99972…h → 8.0
        assert_eq!(worked_hours(at(9, 30, 0), at(17, 29, 59)), 8.0);
        // 20 minutes = 0.33h
        assert_eq!(worked_hours(at(9, 30, 0), at(9, 50, 0)), 0.33);
    }
}
