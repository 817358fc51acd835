use actix_web::{
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web::Data,
    Error, HttpMessage, HttpResponse,
};
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;
use crate::models::TokenType;

/// Validates the bearer token and stashes an [`AuthUser`] in request
/// extensions for the handlers behind it.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?
        .clone();

    let unauthorized = |req: ServiceRequest, msg: &str| {
        let resp = HttpResponse::Unauthorized().json(json!({ "error": msg }));
        Ok(req.into_response(resp))
    };

    let token = match req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_owned)
    {
        Some(t) => t,
        None => return unauthorized(req, "Missing bearer token"),
    };

    let claims = match verify_token(&token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return unauthorized(req, "Invalid or expired token"),
    };

    // Refresh tokens only buy new tokens, never API access.
    if claims.token_type != TokenType::Access {
        return unauthorized(req, "Access token required");
    }

    let role = match Role::from_id(claims.role) {
        Some(r) => r,
        None => return unauthorized(req, "Unknown role"),
    };

    req.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
        email: claims.sub,
        role,
    });

    next.call(req).await
}
