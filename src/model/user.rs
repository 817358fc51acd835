use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Alice Employee",
        "email": "alice@nexus.com",
        "role": "Employee",
        "manager_id": 2,
        "department_id": 1,
        "project_ids": [1, 2],
        "phone": "+1 555-0101",
        "job_title": "Senior Frontend Developer",
        "hire_date": "2022-03-15"
    })
)]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Alice Employee")]
    pub name: String,

    #[schema(example = "alice@nexus.com")]
    pub email: String,

    /// Argon2 hash, never serialized out.
    #[serde(skip_serializing)]
    #[schema(write_only)]
    pub password_hash: String,

    pub role: Role,

    /// Direct manager in the org hierarchy.
    #[schema(example = 2, nullable = true)]
    pub manager_id: Option<u64>,

    #[schema(example = 1, nullable = true)]
    pub department_id: Option<u64>,

    /// Projects this user may log time against.
    pub project_ids: Vec<u64>,

    #[schema(example = "+1 555-0101", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "Senior Frontend Developer", nullable = true)]
    pub job_title: Option<String>,

    #[schema(example = "2022-03-15", value_type = String, format = "date", nullable = true)]
    pub hire_date: Option<NaiveDate>,
}
