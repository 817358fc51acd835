use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One record per (user, calendar date). A record without a check-out
/// timestamp is the user's open session for that day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub user_id: u64,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "2026-01-05T09:00:00Z", value_type = String, format = "date-time")]
    pub check_in: DateTime<Utc>,
    #[schema(example = "2026-01-05T18:10:00Z", value_type = String, format = "date-time", nullable = true)]
    pub check_out: Option<DateTime<Utc>>,
    #[schema(example = "half-day approved", nullable = true)]
    pub early_logout_reason: Option<String>,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }
}
