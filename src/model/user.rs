use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: u64,
    pub employee_code: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: u8,
    pub department: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }
}

/// Public profile shape; the password hash never leaves the store layer.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 42)]
    pub id: u64,
    #[schema(example = "EMP001")]
    pub employee_code: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@company.com")]
    pub email: String,
    #[schema(example = "employee")]
    pub role: String,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id,
            employee_code: user.employee_code.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user
                .role()
                .map(Role::as_str)
                .unwrap_or("employee")
                .to_owned(),
            department: user.department.clone(),
        }
    }
}
