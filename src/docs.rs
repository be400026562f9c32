use crate::api::attendance::{AttendanceFilter, AttendanceListResponse, AttendanceResponse, PunchRequest};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery, UpdateEmployee};
use crate::api::holiday::CreateHoliday;
use crate::api::announcement::AnnouncementBody;
use crate::api::leave_request::{
    CreateLeave, LeaveFilter, LeaveListResponse, LeaveResponse, RejectBody,
};
use crate::api::overtime_request::{
    CreateOvertime, OvertimeFilter, OvertimeListResponse, OvertimeResponse, UpdateOvertime,
};
use crate::api::profile::{ProfileResponse, QuotaStat};
use crate::api::report::RangeQuery;
use crate::model::announcement::{Announcement, AnnouncementCategory};
use crate::model::leave_request::LeaveType;
use crate::model::holiday::Holiday;
use crate::model::settings::AppSettings;
use crate::model::user::User;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance System API",
        version = "1.0.0",
        description = r#"
## Attendance & Leave Management System

This API powers an employee attendance and leave-management system.

### 🔹 Key Features
- **Attendance**
  - GPS-verified punch in/out against a trusted network clock
- **Leave & Overtime**
  - Requests with business-hour computation, quota tracking and an approval workflow
- **Master Data**
  - Announcements, designated holidays, office location settings
- **Employee Management**
  - Admin-provisioned accounts with archive/restore and quota administration
- **Reports**
  - CSV exports of attendance and request history

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Administrative operations require the **Admin** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::punch,
        crate::api::attendance::list_attendance,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::cancel_leave,
        crate::api::leave_request::delete_leave,

        crate::api::overtime_request::create_overtime,
        crate::api::overtime_request::overtime_list,
        crate::api::overtime_request::get_overtime,
        crate::api::overtime_request::approve_overtime,
        crate::api::overtime_request::reject_overtime,
        crate::api::overtime_request::cancel_overtime,
        crate::api::overtime_request::update_overtime,
        crate::api::overtime_request::delete_overtime,

        crate::api::announcement::list_announcements,
        crate::api::announcement::create_announcement,
        crate::api::announcement::update_announcement,
        crate::api::announcement::delete_announcement,

        crate::api::holiday::list_holidays,
        crate::api::holiday::create_holiday,
        crate::api::holiday::delete_holiday,

        crate::api::settings::get_settings,
        crate::api::settings::update_settings,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::archive_employee,
        crate::api::employee::restore_employee,
        crate::api::employee::delete_employee,

        crate::api::profile::me,
        crate::api::clock_info::clock_status,

        crate::api::report::export_attendance,
        crate::api::report::export_leave,
        crate::api::report::export_overtime,
        crate::api::report::export_employee_leave,
    ),
    components(
        schemas(
            PunchRequest,
            AttendanceFilter,
            AttendanceResponse,
            AttendanceListResponse,
            CreateLeave,
            LeaveType,
            RejectBody,
            LeaveFilter,
            LeaveResponse,
            LeaveListResponse,
            CreateOvertime,
            UpdateOvertime,
            OvertimeFilter,
            OvertimeResponse,
            OvertimeListResponse,
            Announcement,
            AnnouncementBody,
            AnnouncementCategory,
            Holiday,
            CreateHoliday,
            AppSettings,
            CreateEmployee,
            UpdateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            User,
            ProfileResponse,
            QuotaStat,
            RangeQuery
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance punch APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Overtime", description = "Overtime management APIs"),
        (name = "Announcement", description = "Announcement APIs"),
        (name = "Holiday", description = "Holiday calendar APIs"),
        (name = "Settings", description = "Application settings APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Profile", description = "Self-service APIs"),
        (name = "Clock", description = "Trusted clock APIs"),
        (name = "Report", description = "CSV export APIs"),
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
