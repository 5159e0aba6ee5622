use chrono::NaiveDate;

/// Local civil date as "YYYY-MM-DD". Kept as a string everywhere so "today"
/// is stable and filters stay lexicographic.
pub fn date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// First 7 characters of the date string, "YYYY-MM".
pub fn month_prefix(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_are_fixed_width() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        assert_eq!(date_string(d), "2026-03-04");
        assert_eq!(month_prefix(d), "2026-03");
    }

    #[test]
    fn month_prefix_matches_date_string_prefix() {
        let d = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        assert!(date_string(d).starts_with(&month_prefix(d)));
    }
}
