pub mod attendance;
pub mod user;

/// MySQL reports unique-key violations as SQLSTATE class 23000. Check-in uses
/// this to turn an insert race into "Already checked in today".
pub fn is_duplicate_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().as_deref() == Some("23000");
    }
    false
}
