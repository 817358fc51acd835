use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "Frank New")]
    pub name: String,
    #[schema(example = "frank@nexus.com")]
    pub email: String,
    pub password: String,
    /// 1 = HR, 2 = Manager, 3 = Employee
    #[schema(example = 3)]
    pub role_id: u8,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "alice@nexus.com")]
    pub email: String,
    #[schema(example = "nexus")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// User email.
    pub sub: String,
    /// Role id.
    pub role: u8,
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
