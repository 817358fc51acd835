use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, verify_token};
use crate::auth::password::{hash_password, verify_password};
use crate::config::Config;
use crate::model::role::Role;
use crate::model::user::User;
use crate::models::{LoginReqDto, RegisterReq, TokenType};
use crate::store::{RefreshTokenRec, Store};

#[derive(Deserialize, ToSchema)]
pub struct RefreshReq {
    pub refresh_token: String,
}

fn issue_tokens(store: &Store, config: &Config, user: &User) -> serde_json::Value {
    let access_token = generate_access_token(
        user.id,
        user.email.clone(),
        user.role.as_id(),
        &config.jwt_secret,
        config.access_token_ttl,
    );
    let (refresh_token, claims) = generate_refresh_token(
        user.id,
        user.email.clone(),
        user.role.as_id(),
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    store.refresh_tokens.write().expect("store poisoned").insert(
        claims.jti,
        RefreshTokenRec {
            user_id: user.id,
            revoked: false,
        },
    );

    json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "token_type": "Bearer",
        "expires_in": config.access_token_ttl,
        "user": user,
    })
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "Auth"
)]
#[instrument(skip(store, payload))]
pub async fn register(store: web::Data<Store>, payload: web::Json<RegisterReq>) -> impl Responder {
    let req = payload.into_inner();

    // 1. Validate the basics before touching the store.
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return HttpResponse::BadRequest().json(json!({"error": "A valid email is required"}));
    }
    if req.name.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "Name is required"}));
    }
    if req.password.len() < 4 {
        return HttpResponse::BadRequest()
            .json(json!({"error": "Password must be at least 4 characters"}));
    }
    let role = match Role::from_id(req.role_id) {
        Some(r) => r,
        None => return HttpResponse::BadRequest().json(json!({"error": "Unknown role id"})),
    };

    // 2. Email must be unique across the directory.
    if store.user_by_email(&email).is_some() {
        return HttpResponse::Conflict().json(json!({"error": "Email already registered"}));
    }

    // 3. Hash and insert.
    let password_hash = match hash_password(&req.password) {
        Ok(h) => h,
        Err(e) => {
            warn!(error = %e, "password hashing failed");
            return HttpResponse::InternalServerError()
                .json(json!({"error": "Could not process password"}));
        }
    };

    let user = User {
        id: store.next_id(),
        name: req.name.trim().to_string(),
        email,
        password_hash,
        role,
        manager_id: None,
        department_id: None,
        project_ids: Vec::new(),
        phone: None,
        job_title: None,
        hire_date: None,
    };
    let id = user.id;
    store.users.write().expect("store poisoned").push(user.clone());

    info!(user_id = id, "account registered");
    HttpResponse::Created().json(user)
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Token pair and profile"),
        (status = 401, description = "Bad credentials"),
    ),
    tag = "Auth"
)]
#[instrument(skip(store, config, payload))]
pub async fn login(
    store: web::Data<Store>,
    config: web::Data<Config>,
    payload: web::Json<LoginReqDto>,
) -> impl Responder {
    let req = payload.into_inner();

    // Same response for unknown email and wrong password.
    let user = match store.user_by_email(req.email.trim()) {
        Some(u) => u,
        None => {
            return HttpResponse::Unauthorized().json(json!({"error": "Invalid credentials"}));
        }
    };
    if verify_password(&req.password, &user.password_hash).is_err() {
        warn!(user_id = user.id, "failed login attempt");
        return HttpResponse::Unauthorized().json(json!({"error": "Invalid credentials"}));
    }

    info!(user_id = user.id, "login");
    HttpResponse::Ok().json(issue_tokens(&store, &config, &user))
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshReq,
    responses(
        (status = 200, description = "Fresh token pair"),
        (status = 401, description = "Refresh token invalid or revoked"),
    ),
    tag = "Auth"
)]
#[instrument(skip(store, config, payload))]
pub async fn refresh(
    store: web::Data<Store>,
    config: web::Data<Config>,
    payload: web::Json<RefreshReq>,
) -> impl Responder {
    let claims = match verify_token(&payload.refresh_token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Refresh => c,
        _ => {
            return HttpResponse::Unauthorized().json(json!({"error": "Invalid refresh token"}));
        }
    };

    // Rotation: the presented token is spent whether or not a new pair
    // goes out.
    {
        let mut tokens = store.refresh_tokens.write().expect("store poisoned");
        match tokens.get_mut(&claims.jti) {
            Some(rec) if !rec.revoked && rec.user_id == claims.user_id => rec.revoked = true,
            _ => {
                return HttpResponse::Unauthorized()
                    .json(json!({"error": "Refresh token revoked or unknown"}));
            }
        }
    }

    let user = match store.user_by_id(claims.user_id) {
        Some(u) => u,
        None => {
            return HttpResponse::Unauthorized().json(json!({"error": "Account no longer exists"}));
        }
    };

    HttpResponse::Ok().json(issue_tokens(&store, &config, &user))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    request_body = RefreshReq,
    responses((status = 200, description = "Refresh token revoked")),
    tag = "Auth"
)]
#[instrument(skip(store, config, payload))]
pub async fn logout(
    store: web::Data<Store>,
    config: web::Data<Config>,
    payload: web::Json<RefreshReq>,
) -> impl Responder {
    if let Ok(claims) = verify_token(&payload.refresh_token, &config.jwt_secret) {
        if let Some(rec) = store
            .refresh_tokens
            .write()
            .expect("store poisoned")
            .get_mut(&claims.jti)
        {
            rec.revoked = true;
            info!(user_id = claims.user_id, "logout");
        }
    }

    // Logout is idempotent; a stale token still gets a clean 200.
    HttpResponse::Ok().json(json!({"message": "Logged out"}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    fn test_config() -> Config {
        Config {
            jwt_secret: "test-secret".into(),
            server_addr: "127.0.0.1:0".into(),
            access_token_ttl: 900,
            refresh_token_ttl: 3600,
            seed_password: "nexus".into(),
            rate_login_per_min: 60,
            rate_register_per_min: 30,
            rate_refresh_per_min: 30,
            rate_protected_per_min: 1000,
            api_prefix: "/api".into(),
        }
    }

    fn seeded_store() -> Store {
        let hash = hash_password("nexus").unwrap();
        Store::seeded(&hash)
    }

    #[actix_web::test]
    async fn login_rejects_wrong_password() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(seeded_store()))
                .app_data(web::Data::new(test_config()))
                .route("/auth/login", web::post().to(login)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "alice@nexus.com", "password": "wrong"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn login_issues_token_pair() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(seeded_store()))
                .app_data(web::Data::new(test_config()))
                .route("/auth/login", web::post().to(login)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "alice@nexus.com", "password": "nexus"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["access_token"].is_string());
        assert!(body["refresh_token"].is_string());
        assert_eq!(body["user"]["email"], "alice@nexus.com");
        assert!(body["user"].get("password_hash").is_none());
    }

    #[actix_web::test]
    async fn refresh_token_is_single_use() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(seeded_store()))
                .app_data(web::Data::new(test_config()))
                .route("/auth/login", web::post().to(login))
                .route("/auth/refresh", web::post().to(refresh)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"email": "alice@nexus.com", "password": "nexus"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/auth/refresh")
            .set_json(json!({"refresh_token": refresh_token}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        // Replaying the spent token fails.
        let req = test::TestRequest::post()
            .uri("/auth/refresh")
            .set_json(json!({"refresh_token": refresh_token}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn register_refuses_duplicate_email() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(seeded_store()))
                .app_data(web::Data::new(test_config()))
                .route("/auth/register", web::post().to(register)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "name": "Imposter",
                "email": "ALICE@nexus.com",
                "password": "nexus",
                "role_id": 3
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);
    }
}
