use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::role::Role;

/// Two-stage approval pipeline. Forward moves only; `Rejected` is reachable
/// from either pending gate and both terminal states are final.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    PendingManager,
    PendingHr,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LeaveStatus::Approved | LeaveStatus::Rejected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub user_id: u64,
    #[schema(example = "Alice Employee")]
    pub user_name: String,
    /// Leave type name, denormalized from [`LeaveTypeConfig`]. Renaming a
    /// type does not retroactively rewrite historical requests.
    #[schema(example = "Annual Leave")]
    pub leave_type: String,
    #[schema(example = "2026-06-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-06-15", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = "Family vacation")]
    pub reason: String,
    pub status: LeaveStatus,
    #[schema(example = "ok", nullable = true)]
    pub manager_comment: Option<String>,
    #[schema(example = "approved", nullable = true)]
    pub hr_comment: Option<String>,
    /// Which gate rejected the request, when status is `REJECTED`.
    #[schema(nullable = true)]
    pub rejected_by: Option<Role>,
    #[schema(nullable = true)]
    pub rejection_comment: Option<String>,
    #[schema(example = "2026-05-20T10:00:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    pub is_urgent: bool,
    /// Extra users to notify on submission, besides the manager.
    pub notify_user_ids: Vec<u64>,
    #[schema(nullable = true)]
    pub attachment_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveTypeConfig {
    pub id: u64,
    #[schema(example = "Annual Leave")]
    pub name: String,
    /// Annual day allotment.
    #[schema(example = 20)]
    pub days: u32,
    #[schema(example = "Standard annual vacation leave")]
    pub description: String,
    pub is_active: bool,
}
