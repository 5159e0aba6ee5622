use std::collections::BTreeMap;

use crate::auth::auth::AuthUser;
use crate::engine::summary::{
    AttendanceSummary, DepartmentDayCounts, department_rollup, summarize, weekly_trend,
};
use crate::model::attendance::{AttendanceRecord, AttendanceWithUser};
use crate::store::{self, attendance::AttendanceFilter, attendance::SortOrder};
use crate::utils::date::{date_string, month_prefix};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Duration, Local, Utc};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDashboard {
    pub today_status: Option<AttendanceRecord>,
    pub monthly_summary: AttendanceSummary,
    pub recent_attendance: Vec<AttendanceRecord>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayOverview {
    #[schema(example = 11)]
    pub present: usize,
    #[schema(example = 1)]
    pub absent: usize,
    pub late_arrivals: Vec<AttendanceWithUser>,
    pub absent_employees: Vec<AttendanceWithUser>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDashboard {
    #[schema(example = 24)]
    pub total_employees: i64,
    pub today: TodayOverview,
    pub weekly_trend: BTreeMap<String, u64>,
    pub department_wise: BTreeMap<String, DepartmentDayCounts>,
}

fn internal_error(e: impl std::fmt::Display, what: &str) -> actix_web::Error {
    error!(error = %e, "{}", what);
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

/// Employee dashboard: today's record, current-month summary, last 7 records
#[utoipa::path(
    get,
    path = "/api/dashboard/employee",
    responses(
        (status = 200, description = "Dashboard payload", body = EmployeeDashboard),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn employee_dashboard(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_employee()?;

    let today = Local::now().naive_local().date();
    let today_str = date_string(today);

    let today_status = store::attendance::find_one(pool.get_ref(), auth.user_id, &today_str)
        .await
        .map_err(|e| internal_error(e, "Failed to fetch today's record"))?;

    let recent_attendance = store::attendance::find_recent(pool.get_ref(), auth.user_id, 7)
        .await
        .map_err(|e| internal_error(e, "Failed to fetch recent records"))?;

    let mut filter = AttendanceFilter::for_user(auth.user_id);
    filter.month = Some(month_prefix(today));

    let monthly_records = store::attendance::find_many(pool.get_ref(), &filter, SortOrder::DateAsc)
        .await
        .map_err(|e| internal_error(e, "Failed to fetch monthly records"))?;

    Ok(HttpResponse::Ok().json(EmployeeDashboard {
        today_status,
        monthly_summary: summarize(&monthly_records),
        recent_attendance,
    }))
}

/// Manager dashboard: headcount, today's picture, weekly trend, departments
#[utoipa::path(
    get,
    path = "/api/dashboard/manager",
    responses(
        (status = 200, description = "Dashboard payload", body = ManagerDashboard),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn manager_dashboard(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let total_employees = store::user::count_employees(pool.get_ref())
        .await
        .map_err(|e| internal_error(e, "Failed to count employees"))?;

    let filter = AttendanceFilter {
        date: Some(date_string(Local::now().naive_local().date())),
        ..Default::default()
    };
    let today_records =
        store::attendance::find_many_with_user(pool.get_ref(), &filter, SortOrder::DateAsc)
            .await
            .map_err(|e| internal_error(e, "Failed to fetch today's records"))?;

    let department_wise = department_rollup(&today_records);

    let present = today_records.iter().filter(|r| r.is_present_like()).count();
    let late_arrivals: Vec<AttendanceWithUser> = today_records
        .iter()
        .filter(|r| r.status == "late")
        .cloned()
        .collect();
    let absent_employees: Vec<AttendanceWithUser> = today_records
        .iter()
        .filter(|r| r.status == "absent")
        .cloned()
        .collect();
    let absent = absent_employees.len();

    // Trailing 7-day window on the store-assigned creation instant; the
    // trend output is still keyed by attendance date.
    let now = Utc::now();
    let window_start = now - Duration::days(6);
    let recent = store::attendance::find_created_between(pool.get_ref(), window_start, now)
        .await
        .map_err(|e| internal_error(e, "Failed to fetch trend window"))?;

    Ok(HttpResponse::Ok().json(ManagerDashboard {
        total_employees,
        today: TodayOverview {
            present,
            absent,
            late_arrivals,
            absent_employees,
        },
        weekly_trend: weekly_trend(&recent),
        department_wise,
    }))
}
