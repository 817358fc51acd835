use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum TimeEntryStatus {
    Pending,
    Approved,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimeEntry {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub user_id: u64,
    /// `None` means a general task not tied to any project.
    #[schema(example = 1, nullable = true)]
    pub project_id: Option<u64>,
    #[schema(example = "Development")]
    pub task: String,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    /// Always a positive number of minutes.
    #[schema(example = 480)]
    pub duration_minutes: u32,
    #[schema(example = "Working on login page")]
    pub description: String,
    pub status: TimeEntryStatus,
    pub is_billable: bool,
}
