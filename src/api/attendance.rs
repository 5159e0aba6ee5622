use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::{self, CheckIn};
use crate::engine::summary::{DaySnapshot, TeamSummary, day_snapshot, summarize, team_summary};
use crate::model::attendance::{AttendanceRecord, AttendanceWithUser};
use crate::store::{self, attendance::AttendanceFilter, attendance::SortOrder};
use crate::utils::csv::attendance_csv;
use crate::utils::date::date_string;
use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct MonthQuery {
    /// Month filter "YYYY-MM"; omit for all records.
    pub month: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AllQuery {
    /// Exact date "YYYY-MM-DD"
    pub date: Option<String>,
    /// Exact status (present, late, half-day, absent)
    pub status: Option<String>,
    /// Employee code, e.g. "EMP001"
    #[serde(rename = "employeeId")]
    pub employee_id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// Inclusive range start "YYYY-MM-DD"
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    /// Inclusive range end "YYYY-MM-DD"
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    /// Employee code, e.g. "EMP001"
    #[serde(rename = "employeeId")]
    pub employee_id: Option<String>,
}

fn internal_error(e: impl std::fmt::Display, what: &str) -> actix_web::Error {
    error!(error = %e, "{}", what);
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

/// Resolve an optional employee-code filter. `Ok(None)` means no filter;
/// `Err(())` means the code resolved to no user, so the caller should return
/// an empty result rather than an error.
async fn resolve_employee_filter(
    pool: &MySqlPool,
    employee_code: Option<&str>,
) -> actix_web::Result<Result<Option<u64>, ()>> {
    let code = match employee_code {
        Some(code) => code,
        None => return Ok(Ok(None)),
    };

    let user = store::user::find_by_employee_code(pool, code)
        .await
        .map_err(|e| internal_error(e, "Failed to resolve employee filter"))?;

    Ok(match user {
        Some(user) => Ok(Some(user.id)),
        None => Err(()),
    })
}

// ================= EMPLOYEE ENDPOINTS =================

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkin",
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Check-in successful"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    auth.require_employee()?;

    let now = Local::now().naive_local();
    let today = date_string(now.date());

    let existing = store::attendance::find_one(pool.get_ref(), auth.user_id, &today)
        .await
        .map_err(|e| internal_error(e, "Check-in lookup failed"))?;

    let outcome = match engine::apply_check_in(existing, auth.user_id, &today, now, config.office_start)
    {
        Ok(outcome) => outcome,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": e.to_string()
            })));
        }
    };

    let record = match outcome {
        CheckIn {
            record,
            is_new: true,
        } => match store::attendance::create(pool.get_ref(), &record).await {
            Ok(saved) => saved,
            Err(e) if store::is_duplicate_key(&e) => {
                // Lost the insert race to a concurrent check-in.
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                    "message": "Already checked in today"
                })));
            }
            Err(e) => return Err(internal_error(e, "Check-in insert failed")),
        },
        CheckIn {
            record,
            is_new: false,
        } => {
            store::attendance::save(pool.get_ref(), &record)
                .await
                .map_err(|e| internal_error(e, "Check-in save failed"))?;
            record
        }
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Check-in successful",
        "attendance": record
    })))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkout",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Check-out successful"
        })),
        (status = 400, description = "Not checked in or already checked out", body = Object, example = json!({
            "message": "You have not checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_employee()?;

    let now = Local::now().naive_local();
    let today = date_string(now.date());

    let existing = store::attendance::find_one(pool.get_ref(), auth.user_id, &today)
        .await
        .map_err(|e| internal_error(e, "Check-out lookup failed"))?;

    let record = match engine::apply_check_out(existing, now) {
        Ok(record) => record,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": e.to_string()
            })));
        }
    };

    store::attendance::save(pool.get_ref(), &record)
        .await
        .map_err(|e| internal_error(e, "Check-out save failed"))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Check-out successful",
        "attendance": record
    })))
}

/// Own attendance history, newest first
#[utoipa::path(
    get,
    path = "/api/attendance/my-history",
    params(MonthQuery),
    responses(
        (status = 200, description = "Attendance records", body = Vec<AttendanceRecord>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_employee()?;

    let mut filter = AttendanceFilter::for_user(auth.user_id);
    filter.month = query.month.clone();

    let records = store::attendance::find_many(pool.get_ref(), &filter, SortOrder::DateDesc)
        .await
        .map_err(|e| internal_error(e, "Failed to fetch history"))?;

    Ok(HttpResponse::Ok().json(records))
}

/// Own monthly summary
#[utoipa::path(
    get,
    path = "/api/attendance/my-summary",
    params(MonthQuery),
    responses(
        (status = 200, description = "Status counts and worked hours", body = crate::engine::summary::AttendanceSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_employee()?;

    let mut filter = AttendanceFilter::for_user(auth.user_id);
    filter.month = query.month.clone();

    let records = store::attendance::find_many(pool.get_ref(), &filter, SortOrder::DateAsc)
        .await
        .map_err(|e| internal_error(e, "Failed to fetch summary records"))?;

    Ok(HttpResponse::Ok().json(summarize(&records)))
}

/// Own record for today
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's record, or a message when none exists", body = AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_employee()?;

    let today = date_string(Local::now().naive_local().date());

    let record = store::attendance::find_one(pool.get_ref(), auth.user_id, &today)
        .await
        .map_err(|e| internal_error(e, "Failed to fetch today's record"))?;

    match record {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "No attendance record for today"
        }))),
    }
}

// ================= MANAGER ENDPOINTS =================

/// All records, filterable by date, status, and employee code
#[utoipa::path(
    get,
    path = "/api/attendance/all",
    params(AllQuery),
    responses(
        (status = 200, description = "Records joined with user fields", body = Vec<AttendanceWithUser>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn all_records(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AllQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let mut filter = AttendanceFilter {
        date: query.date.clone(),
        status: query.status.clone(),
        ..Default::default()
    };

    match resolve_employee_filter(pool.get_ref(), query.employee_id.as_deref()).await? {
        Ok(user_id) => filter.user_id = user_id,
        Err(()) => return Ok(HttpResponse::Ok().json(Vec::<AttendanceWithUser>::new())),
    }

    let records =
        store::attendance::find_many_with_user(pool.get_ref(), &filter, SortOrder::DateDesc)
            .await
            .map_err(|e| internal_error(e, "Failed to fetch records"))?;

    Ok(HttpResponse::Ok().json(records))
}

/// One employee's history, newest first
#[utoipa::path(
    get,
    path = "/api/attendance/employee/{id}",
    params(("id", Path, description = "User ID")),
    responses(
        (status = 200, description = "Attendance records", body = Vec<AttendanceRecord>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn employee_history(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let user_id = path.into_inner();
    let filter = AttendanceFilter::for_user(user_id);

    let records = store::attendance::find_many(pool.get_ref(), &filter, SortOrder::DateDesc)
        .await
        .map_err(|e| internal_error(e, "Failed to fetch employee history"))?;

    Ok(HttpResponse::Ok().json(records))
}

/// Team summary with department breakdown, over all records
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    responses(
        (status = 200, description = "Overall and per-department status counts", body = TeamSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn team_summary_view(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let records = store::attendance::find_many_with_user(
        pool.get_ref(),
        &AttendanceFilter::default(),
        SortOrder::DateAsc,
    )
    .await
    .map_err(|e| internal_error(e, "Failed to fetch team records"))?;

    Ok(HttpResponse::Ok().json(team_summary(&records)))
}

/// Date-range report joined with user fields
#[utoipa::path(
    get,
    path = "/api/attendance/report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Records in range, date ascending", body = Vec<AttendanceWithUser>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let mut filter = AttendanceFilter {
        date_from: query.start_date.clone(),
        date_to: query.end_date.clone(),
        ..Default::default()
    };

    match resolve_employee_filter(pool.get_ref(), query.employee_id.as_deref()).await? {
        Ok(user_id) => filter.user_id = user_id,
        Err(()) => return Ok(HttpResponse::Ok().json(Vec::<AttendanceWithUser>::new())),
    }

    let records =
        store::attendance::find_many_with_user(pool.get_ref(), &filter, SortOrder::DateAsc)
            .await
            .map_err(|e| internal_error(e, "Failed to fetch report"))?;

    Ok(HttpResponse::Ok().json(records))
}

/// CSV export of the date-range report
#[utoipa::path(
    get,
    path = "/api/attendance/export",
    params(ReportQuery),
    responses(
        (status = 200, description = "CSV attachment", body = String, content_type = "text/csv"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn export_csv(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let mut filter = AttendanceFilter {
        date_from: query.start_date.clone(),
        date_to: query.end_date.clone(),
        ..Default::default()
    };

    match resolve_employee_filter(pool.get_ref(), query.employee_id.as_deref()).await? {
        Ok(user_id) => filter.user_id = user_id,
        // Unknown employee code downloads as an empty file.
        Err(()) => {
            return Ok(HttpResponse::Ok().content_type("text/csv").body(""));
        }
    }

    let records =
        store::attendance::find_many_with_user(pool.get_ref(), &filter, SortOrder::DateAsc)
            .await
            .map_err(|e| internal_error(e, "Failed to fetch export records"))?;

    let csv = attendance_csv(&records).map_err(|e| internal_error(e, "CSV serialization failed"))?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"attendance_report.csv\"",
        ))
        .body(csv))
}

/// Who showed up today vs who is marked absent
#[utoipa::path(
    get,
    path = "/api/attendance/today-status",
    responses(
        (status = 200, description = "Today's records partitioned by presence", body = DaySnapshot),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today_team_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let filter = AttendanceFilter {
        date: Some(date_string(Local::now().naive_local().date())),
        ..Default::default()
    };

    let records =
        store::attendance::find_many_with_user(pool.get_ref(), &filter, SortOrder::DateAsc)
            .await
            .map_err(|e| internal_error(e, "Failed to fetch today's records"))?;

    Ok(HttpResponse::Ok().json(day_snapshot(records)))
}
