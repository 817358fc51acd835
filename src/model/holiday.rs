use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum HolidayKind {
    Public,
    Company,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Holiday {
    pub id: u64,
    #[schema(example = "New Year")]
    pub name: String,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: HolidayKind,
    #[schema(example = "Celebration of the new year", nullable = true)]
    pub description: Option<String>,
}
