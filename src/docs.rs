use crate::api::attendance::{CheckOutReq, EditRecordReq, ManualRecordReq};
use crate::api::department::DepartmentReq;
use crate::api::holiday::{BulkImportReq, HolidayReq};
use crate::api::leave::{CreateLeaveReq, DecisionReq, EditLeaveReq};
use crate::api::leave_type::LeaveTypeReq;
use crate::api::payslip::{BulkUploadReq, PayslipRow};
use crate::api::project::ProjectReq;
use crate::api::time_entry::{BulkDeleteReq, TimeEntryReq, TimeInput};
use crate::api::user::UpdateProfileReq;
use crate::auth::handlers::RefreshReq;
use crate::domain::timesheet::{ClockTime, Meridiem, WeekRow};
use crate::model::attendance::AttendanceRecord;
use crate::model::department::Department;
use crate::model::holiday::{Holiday, HolidayKind};
use crate::model::leave::{LeaveRequest, LeaveStatus, LeaveTypeConfig};
use crate::model::notification::Notification;
use crate::model::payslip::Payslip;
use crate::model::project::{Project, ProjectStatus};
use crate::model::role::Role;
use crate::model::time_entry::{TimeEntry, TimeEntryStatus};
use crate::model::user::User;
use crate::models::{LoginReqDto, RegisterReq};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{openapi, Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nexus HR API",
        version = "1.0.0",
        description = r#"
## Nexus HR Portal

This API powers an **HR portal** covering the day-to-day operations of a small company.

### 🔹 Key Features
- **Attendance**
  - Daily check-in/check-out with an early-logout reason rule
  - Manual records for missed days and time-bounded self-corrections
- **Leave Management**
  - Two-stage approval: manager first, then HR
  - Configurable leave types and urgency-flagged notifications
- **Timesheets**
  - Per-project time entries with duration or clock-range input
  - Weekly Mon-Fri matrix and per-project summaries
- **Organization**
  - Employee directory, departments, projects, holidays and payslips

### 🔐 Security
All endpoints under the API prefix require **JWT Bearer authentication**.
Mutating org data (departments, projects, holidays, leave types, payslips)
requires the **HR** role.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh,
        crate::auth::handlers::logout,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::list,
        crate::api::attendance::create_manual,
        crate::api::attendance::edit,

        crate::api::leave::create,
        crate::api::leave::list,
        crate::api::leave::get,
        crate::api::leave::edit,
        crate::api::leave::approve,
        crate::api::leave::reject,

        crate::api::leave_type::list,
        crate::api::leave_type::create,
        crate::api::leave_type::update,
        crate::api::leave_type::remove,

        crate::api::time_entry::list,
        crate::api::time_entry::create,
        crate::api::time_entry::update,
        crate::api::time_entry::remove,
        crate::api::time_entry::bulk_remove,
        crate::api::time_entry::approve,
        crate::api::time_entry::weekly_report,
        crate::api::time_entry::project_summary,

        crate::api::user::list,
        crate::api::user::get,
        crate::api::user::update,

        crate::api::department::list,
        crate::api::department::create,
        crate::api::department::update,
        crate::api::department::remove,

        crate::api::project::list,
        crate::api::project::create,
        crate::api::project::update,
        crate::api::project::remove,

        crate::api::holiday::list,
        crate::api::holiday::create,
        crate::api::holiday::bulk_import,
        crate::api::holiday::update,
        crate::api::holiday::remove,

        crate::api::payslip::list,
        crate::api::payslip::bulk_upload,

        crate::api::notification::list,
        crate::api::notification::mark_all_read,
    ),
    components(
        schemas(
            RegisterReq,
            LoginReqDto,
            RefreshReq,
            Role,
            User,
            UpdateProfileReq,
            AttendanceRecord,
            CheckOutReq,
            ManualRecordReq,
            EditRecordReq,
            LeaveStatus,
            LeaveRequest,
            LeaveTypeConfig,
            CreateLeaveReq,
            EditLeaveReq,
            DecisionReq,
            LeaveTypeReq,
            TimeEntry,
            TimeEntryStatus,
            TimeEntryReq,
            TimeInput,
            ClockTime,
            Meridiem,
            WeekRow,
            BulkDeleteReq,
            Department,
            DepartmentReq,
            Project,
            ProjectStatus,
            ProjectReq,
            Holiday,
            HolidayKind,
            HolidayReq,
            BulkImportReq,
            Payslip,
            PayslipRow,
            BulkUploadReq,
            Notification,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, registration and token lifecycle"),
        (name = "Attendance", description = "Daily check-in/check-out tracking"),
        (name = "Leave", description = "Leave requests and leave type configuration"),
        (name = "Timesheet", description = "Time entries and reports"),
        (name = "Directory", description = "Employee directory"),
        (name = "Organization", description = "Departments, projects and holidays"),
        (name = "Payroll", description = "Payslip distribution"),
        (name = "Notifications", description = "In-app notification feed"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
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
