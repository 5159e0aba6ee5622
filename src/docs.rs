use crate::api::dashboard::{EmployeeDashboard, ManagerDashboard, TodayOverview};
use crate::engine::summary::{
    AttendanceSummary, DaySnapshot, DepartmentDayCounts, StatusCounts, TeamSummary,
};
use crate::model::attendance::{AttendanceRecord, AttendanceWithUser, Status};
use crate::model::user::UserResponse;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Attendance API",
        version = "1.0.0",
        description = r#"
## Employee Attendance Tracker

REST backend for daily attendance: employees check in and out and review
their own history; managers see the team picture.

### Key Features
- **Check-in / Check-out**
  - One record per employee per calendar day; punctuality classified against
    the configured office start (present / late / half-day)
- **Personal Views**
  - History, monthly summary, today's status, employee dashboard
- **Manager Views**
  - Team summary, daily snapshot, weekly trend, department breakdown,
    date-range reports, and CSV export

### Security
Endpoints under the API prefix require **JWT Bearer authentication**.
Team-level views are restricted to the **manager** role.
"#,
    ),
    modifiers(&SecurityAddon),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::my_history,
        crate::api::attendance::my_summary,
        crate::api::attendance::today_status,
        crate::api::attendance::all_records,
        crate::api::attendance::employee_history,
        crate::api::attendance::team_summary_view,
        crate::api::attendance::report,
        crate::api::attendance::export_csv,
        crate::api::attendance::today_team_status,
        crate::api::dashboard::employee_dashboard,
        crate::api::dashboard::manager_dashboard,
    ),
    components(
        schemas(
            Status,
            AttendanceRecord,
            AttendanceWithUser,
            AttendanceSummary,
            DaySnapshot,
            StatusCounts,
            TeamSummary,
            DepartmentDayCounts,
            EmployeeDashboard,
            ManagerDashboard,
            TodayOverview,
            UserResponse
        )
    ),
    tags(
        (name = "Attendance", description = "Check-in/out and attendance queries"),
        (name = "Dashboard", description = "Employee and manager dashboards"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
