use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Amount is best-effort data extracted upstream from the uploaded
/// document, not a ledger figure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Payslip {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "April")]
    pub month: String,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 4500.0)]
    pub amount: f64,
    #[schema(example = "/docs/payslip-april.pdf")]
    pub document_url: String,
    #[schema(value_type = String, format = "date-time")]
    pub uploaded_at: DateTime<Utc>,
}
