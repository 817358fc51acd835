use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fire-and-forget display message; no delivery guarantee.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "Leave request sent. Notified: Manager")]
    pub message: String,
    pub read: bool,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}
