use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use crate::model::attendance::{AttendanceRecord, AttendanceWithUser};

const RECORD_COLUMNS: &str =
    "id, user_id, date, check_in_time, check_out_time, status, total_hours, created_at";

const JOINED_COLUMNS: &str = "a.id, a.user_id, a.date, a.check_in_time, a.check_out_time, \
     a.status, a.total_hours, a.created_at, \
     u.employee_code, u.name, u.email, u.department";

/// Filter over attendance rows. Every field is optional; set fields are
/// ANDed together. Date strings are fixed-width "YYYY-MM-DD", so range and
/// prefix filters compare lexicographically in SQL.
#[derive(Debug, Default)]
pub struct AttendanceFilter {
    pub user_id: Option<u64>,
    pub date: Option<String>,
    /// Inclusive range bounds; both must be set for the range to apply.
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    /// Month prefix "YYYY-MM".
    pub month: Option<String>,
    pub status: Option<String>,
}

// Typed values for the dynamic bind loop.
enum FilterValue {
    U64(u64),
    Str(String),
}

#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    DateAsc,
    DateDesc,
}

impl SortOrder {
    fn as_sql(self, prefix: &str) -> String {
        match self {
            SortOrder::DateAsc => format!("ORDER BY {prefix}date ASC, {prefix}id ASC"),
            SortOrder::DateDesc => format!("ORDER BY {prefix}date DESC, {prefix}id DESC"),
        }
    }
}

impl AttendanceFilter {
    pub fn for_user(user_id: u64) -> Self {
        AttendanceFilter {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    fn where_clause(&self, prefix: &str) -> (String, Vec<FilterValue>) {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        if let Some(user_id) = self.user_id {
            conditions.push(format!("{prefix}user_id = ?"));
            values.push(FilterValue::U64(user_id));
        }

        if let Some(date) = &self.date {
            conditions.push(format!("{prefix}date = ?"));
            values.push(FilterValue::Str(date.clone()));
        }

        if let (Some(from), Some(to)) = (&self.date_from, &self.date_to) {
            conditions.push(format!("{prefix}date >= ?"));
            values.push(FilterValue::Str(from.clone()));
            conditions.push(format!("{prefix}date <= ?"));
            values.push(FilterValue::Str(to.clone()));
        }

        if let Some(month) = &self.month {
            conditions.push(format!("{prefix}date LIKE ?"));
            values.push(FilterValue::Str(format!("{month}%")));
        }

        if let Some(status) = &self.status {
            conditions.push(format!("{prefix}status = ?"));
            values.push(FilterValue::Str(status.clone()));
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (clause, values)
    }
}

pub async fn find_one(
    pool: &MySqlPool,
    user_id: u64,
    date: &str,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM attendance WHERE user_id = ? AND date = ?"
    ))
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &MySqlPool, id: u64) -> Result<AttendanceRecord, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM attendance WHERE id = ?"
    ))
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn find_many(
    pool: &MySqlPool,
    filter: &AttendanceFilter,
    order: SortOrder,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let (where_clause, values) = filter.where_clause("");
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM attendance {where_clause} {}",
        order.as_sql("")
    );

    let mut query = sqlx::query_as::<_, AttendanceRecord>(&sql);
    for value in values {
        query = match value {
            FilterValue::U64(v) => query.bind(v),
            FilterValue::Str(v) => query.bind(v),
        };
    }

    query.fetch_all(pool).await
}

/// Records joined with user fields for manager views, reports, and export.
pub async fn find_many_with_user(
    pool: &MySqlPool,
    filter: &AttendanceFilter,
    order: SortOrder,
) -> Result<Vec<AttendanceWithUser>, sqlx::Error> {
    let (where_clause, values) = filter.where_clause("a.");
    let sql = format!(
        "SELECT {JOINED_COLUMNS} FROM attendance a \
         INNER JOIN users u ON u.id = a.user_id {where_clause} {}",
        order.as_sql("a.")
    );

    let mut query = sqlx::query_as::<_, AttendanceWithUser>(&sql);
    for value in values {
        query = match value {
            FilterValue::U64(v) => query.bind(v),
            FilterValue::Str(v) => query.bind(v),
        };
    }

    query.fetch_all(pool).await
}

/// Latest records for one user, newest date first.
pub async fn find_recent(
    pool: &MySqlPool,
    user_id: u64,
    limit: u32,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM attendance WHERE user_id = ? \
         ORDER BY date DESC, id DESC LIMIT ?"
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Records whose store-assigned creation instant falls in [from, to]. The
/// weekly trend windows on creation time, not the attendance date.
pub async fn find_created_between(
    pool: &MySqlPool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM attendance WHERE created_at >= ? AND created_at <= ?"
    ))
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}

/// Insert a new record. The (user_id, date) unique key makes this the
/// atomicity point for racing check-ins; the loser sees SQLSTATE 23000.
pub async fn create(
    pool: &MySqlPool,
    record: &AttendanceRecord,
) -> Result<AttendanceRecord, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO attendance (user_id, date, check_in_time, status, total_hours) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(record.user_id)
    .bind(&record.date)
    .bind(record.check_in_time)
    .bind(&record.status)
    .bind(record.total_hours)
    .execute(pool)
    .await?;

    find_by_id(pool, result.last_insert_id()).await
}

/// Persist the in-place mutation of an existing record (check-in backfill or
/// check-out).
pub async fn save(pool: &MySqlPool, record: &AttendanceRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE attendance SET check_in_time = ?, check_out_time = ?, status = ?, \
         total_hours = ? WHERE id = ?",
    )
    .bind(record.check_in_time)
    .bind(record.check_out_time)
    .bind(&record.status)
    .bind(record.total_hours)
    .bind(record.id)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_has_no_where_clause() {
        let (clause, values) = AttendanceFilter::default().where_clause("");
        assert_eq!(clause, "");
        assert!(values.is_empty());
    }

    #[test]
    fn filter_conditions_are_anded_in_order() {
        let filter = AttendanceFilter {
            user_id: Some(7),
            date: Some("2026-08-06".to_owned()),
            status: Some("late".to_owned()),
            ..Default::default()
        };
        let (clause, values) = filter.where_clause("a.");
        assert_eq!(clause, "WHERE a.user_id = ? AND a.date = ? AND a.status = ?");
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn month_filter_becomes_a_prefix_match() {
        let filter = AttendanceFilter {
            month: Some("2026-08".to_owned()),
            ..Default::default()
        };
        let (clause, values) = filter.where_clause("");
        assert_eq!(clause, "WHERE date LIKE ?");
        match &values[0] {
            FilterValue::Str(s) => assert_eq!(s, "2026-08%"),
            _ => panic!("expected string bind"),
        }
    }

    #[test]
    fn range_needs_both_bounds() {
        let filter = AttendanceFilter {
            date_from: Some("2026-08-01".to_owned()),
            ..Default::default()
        };
        let (clause, _) = filter.where_clause("");
        assert_eq!(clause, "");

        let filter = AttendanceFilter {
            date_from: Some("2026-08-01".to_owned()),
            date_to: Some("2026-08-07".to_owned()),
            ..Default::default()
        };
        let (clause, values) = filter.where_clause("");
        assert_eq!(clause, "WHERE date >= ? AND date <= ?");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn inverted_range_cannot_match_any_fixed_width_date() {
        // start > end: no "YYYY-MM-DD" string satisfies both inequalities,
        // so the report comes back empty rather than erroring.
        let from = "2026-08-07";
        let to = "2026-08-01";
        assert!(from > to);
        for candidate in ["2026-07-31", "2026-08-01", "2026-08-04", "2026-08-07"] {
            assert!(!(candidate >= from && candidate <= to));
        }
    }
}
