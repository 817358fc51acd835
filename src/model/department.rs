use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Department {
    pub id: u64,
    #[schema(example = "Engineering")]
    pub name: String,
    #[schema(example = "Software Development and IT", nullable = true)]
    pub description: Option<String>,
    /// Head of department.
    #[schema(example = 2, nullable = true)]
    pub manager_id: Option<u64>,
}
