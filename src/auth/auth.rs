use actix_web::{dev::Payload, error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};

use crate::model::role::Role;

/// The caller's identity as established by the auth middleware. Extracted
/// from request extensions; handlers take it as a plain argument.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require_hr(&self) -> actix_web::Result<()> {
        if self.role == Role::Hr {
            Ok(())
        } else {
            Err(error::ErrorForbidden("HR role required"))
        }
    }

    pub fn require_manager_or_hr(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Hr | Role::Manager) {
            Ok(())
        } else {
            Err(error::ErrorForbidden("Manager or HR role required"))
        }
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| error::ErrorUnauthorized("Authentication required")),
        )
    }
}
