use sqlx::MySqlPool;

use crate::model::role::Role;
use crate::model::user::User;

const USER_COLUMNS: &str =
    "id, employee_code, name, email, password, role_id, department, created_at, last_login_at";

pub struct NewUser<'a> {
    pub employee_code: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role_id: u8,
    pub department: Option<&'a str>,
}

pub async fn find_by_email(pool: &MySqlPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &MySqlPool, id: u64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Lookup by the human-facing employee code, used by report/export filters.
/// An unknown code is a normal miss, not an error.
pub async fn find_by_employee_code(
    pool: &MySqlPool,
    employee_code: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE employee_code = ?"
    ))
    .bind(employee_code)
    .fetch_optional(pool)
    .await
}

pub async fn email_exists(pool: &MySqlPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = ? LIMIT 1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub async fn insert(pool: &MySqlPool, new_user: &NewUser<'_>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO users (employee_code, name, email, password, role_id, department) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(new_user.employee_code)
    .bind(new_user.name)
    .bind(new_user.email)
    .bind(new_user.password_hash)
    .bind(new_user.role_id)
    .bind(new_user.department)
    .execute(pool)
    .await?;

    Ok(result.last_insert_id())
}

pub async fn count_employees(pool: &MySqlPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role_id = ?")
        .bind(Role::Employee.as_id())
        .fetch_one(pool)
        .await
}

pub async fn touch_last_login(pool: &MySqlPool, user_id: u64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
