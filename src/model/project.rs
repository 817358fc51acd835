use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum ProjectStatus {
    Active,
    Completed,
    #[serde(rename = "On Hold")]
    #[strum(serialize = "On Hold")]
    OnHold,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: u64,
    #[schema(example = "Website Revamp")]
    pub name: String,
    #[schema(example = "Modernizing the corporate portal", nullable = true)]
    pub description: Option<String>,
    pub status: ProjectStatus,
    #[schema(example = "2024-12-31", value_type = String, format = "date", nullable = true)]
    pub due_date: Option<NaiveDate>,
    /// Pre-defined task picklist. Entries may still use free-text tasks.
    pub tasks: Vec<String>,
}
