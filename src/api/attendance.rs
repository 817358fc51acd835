use actix_web::{web, HttpResponse, Responder};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::domain::attendance as rules;
use crate::model::role::Role;
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct CheckOutReq {
    /// Required when checking out before the minimum worked hours.
    #[schema(example = "half-day approved")]
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ManualRecordReq {
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "09:00", value_type = String)]
    pub check_in: NaiveTime,
    #[schema(example = "18:00", value_type = String)]
    pub check_out: NaiveTime,
}

#[derive(Deserialize, ToSchema)]
pub struct EditRecordReq {
    #[schema(example = "09:00", value_type = String)]
    pub check_in: NaiveTime,
    #[schema(example = "18:00", value_type = String)]
    pub check_out: NaiveTime,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttendanceFilter {
    /// Managers and HR may inspect another user's records.
    pub user_id: Option<u64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[utoipa::path(
    post,
    path = "/attendance/check-in",
    responses(
        (status = 201, description = "Session opened", body = crate::model::attendance::AttendanceRecord),
        (status = 409, description = "Already checked in today"),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(store))]
pub async fn check_in(store: web::Data<Store>, user: AuthUser) -> impl Responder {
    let id = store.next_id();
    let mut records = store.attendance.write().expect("store poisoned");
    match rules::check_in(&mut records, id, user.user_id, Utc::now()) {
        Ok(()) => {
            info!(user_id = user.user_id, "checked in");
            let record = records.last().cloned();
            HttpResponse::Created().json(record)
        }
        Err(e) => HttpResponse::Conflict().json(json!({"error": e.to_string()})),
    }
}

#[utoipa::path(
    post,
    path = "/attendance/check-out",
    request_body = CheckOutReq,
    responses(
        (status = 200, description = "Session closed"),
        (status = 409, description = "No open session, or early without a reason"),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(store, payload))]
pub async fn check_out(
    store: web::Data<Store>,
    user: AuthUser,
    payload: web::Json<CheckOutReq>,
) -> impl Responder {
    let now = Utc::now();
    let mut records = store.attendance.write().expect("store poisoned");
    match rules::check_out(&mut records, user.user_id, now, payload.reason.as_deref()) {
        Ok(early) => {
            info!(user_id = user.user_id, early, "checked out");
            let record = records
                .iter()
                .find(|r| r.user_id == user.user_id && r.date == now.date_naive())
                .cloned();
            HttpResponse::Ok().json(json!({"early": early, "record": record}))
        }
        Err(e) => HttpResponse::Conflict().json(json!({"error": e.to_string()})),
    }
}

#[utoipa::path(
    get,
    path = "/attendance",
    params(AttendanceFilter),
    responses((status = 200, description = "Records, newest date first")),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(store))]
pub async fn list(
    store: web::Data<Store>,
    user: AuthUser,
    filter: web::Query<AttendanceFilter>,
) -> impl Responder {
    // Employees only ever see their own sheet.
    let subject = match filter.user_id {
        Some(other) if other != user.user_id => {
            if user.require_manager_or_hr().is_err() {
                return HttpResponse::Forbidden()
                    .json(json!({"error": "Cannot view another user's attendance"}));
            }
            other
        }
        _ => user.user_id,
    };

    let records = store.attendance.read().expect("store poisoned");
    let mut rows: Vec<serde_json::Value> = records
        .iter()
        .filter(|r| r.user_id == subject)
        .filter(|r| filter.from.is_none_or(|from| r.date >= from))
        .filter(|r| filter.to.is_none_or(|to| r.date <= to))
        .map(|r| {
            json!({
                "record": r,
                "duration_minutes": rules::duration_minutes(r),
            })
        })
        .collect();
    rows.sort_by(|a, b| b["record"]["date"].as_str().cmp(&a["record"]["date"].as_str()));

    HttpResponse::Ok().json(rows)
}

#[utoipa::path(
    post,
    path = "/attendance/manual",
    request_body = ManualRecordReq,
    responses(
        (status = 201, description = "Record created", body = crate::model::attendance::AttendanceRecord),
        (status = 400, description = "Future date"),
        (status = 409, description = "A record already exists for that day"),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(store, payload))]
pub async fn create_manual(
    store: web::Data<Store>,
    user: AuthUser,
    payload: web::Json<ManualRecordReq>,
) -> impl Responder {
    let req = payload.into_inner();
    let mut records = store.attendance.write().expect("store poisoned");

    if records
        .iter()
        .any(|r| r.user_id == user.user_id && r.date == req.date)
    {
        return HttpResponse::Conflict()
            .json(json!({"error": "A record already exists for that day"}));
    }

    let id = store.next_id();
    match rules::manual_record(
        id,
        user.user_id,
        req.date,
        req.check_in,
        req.check_out,
        Utc::now().date_naive(),
    ) {
        Ok(record) => {
            records.push(record.clone());
            HttpResponse::Created().json(record)
        }
        Err(e) => HttpResponse::BadRequest().json(json!({"error": e.to_string()})),
    }
}

#[utoipa::path(
    put,
    path = "/attendance/{id}",
    request_body = EditRecordReq,
    responses(
        (status = 200, description = "Record corrected in place"),
        (status = 202, description = "Outside the edit window; HR asked to correct"),
        (status = 404, description = "No such record"),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(store, payload))]
pub async fn edit(
    store: web::Data<Store>,
    user: AuthUser,
    path: web::Path<u64>,
    payload: web::Json<EditRecordReq>,
) -> impl Responder {
    let record_id = path.into_inner();
    let today = Utc::now().date_naive();

    let mut records = store.attendance.write().expect("store poisoned");
    let record = match records.iter_mut().find(|r| r.id == record_id) {
        Some(r) => r,
        None => return HttpResponse::NotFound().json(json!({"error": "Record not found"})),
    };

    if record.user_id != user.user_id && user.require_hr().is_err() {
        return HttpResponse::Forbidden()
            .json(json!({"error": "Cannot edit another user's attendance"}));
    }

    if !rules::is_direct_edit_allowed(user.role, record.date, today) {
        // Too old to self-correct; route the request to HR instead.
        let message = format!(
            "{} requests an attendance correction for {}: in {}, out {}",
            store.user_name(user.user_id).unwrap_or_default(),
            record.date,
            payload.check_in,
            payload.check_out,
        );
        drop(records);
        store.notify_role(Role::Hr, &message);
        info!(user_id = user.user_id, record_id, "edit escalated to HR");
        return HttpResponse::Accepted()
            .json(json!({"message": "Correction request sent to HR for approval"}));
    }

    record.check_in = record.date.and_time(payload.check_in).and_utc();
    record.check_out = Some(record.date.and_time(payload.check_out).and_utc());
    HttpResponse::Ok().json(record.clone())
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

    #[actix_web::test]
    async fn double_check_in_is_refused() {
        let config = test_config();
        let auth = bearer(&config, 1, "alice@nexus.com", 3);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Store::new()))
                .app_data(web::Data::new(config))
                .service(
                    web::scope("")
                        .wrap(from_fn(auth_middleware))
                        .route("/attendance/check-in", web::post().to(check_in)),
                ),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/attendance/check-in")
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        let req = test::TestRequest::post()
            .uri("/attendance/check-in")
            .insert_header(("Authorization", auth))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 409);
    }

    #[actix_web::test]
    async fn early_check_out_needs_a_reason() {
        let config = test_config();
        let auth = bearer(&config, 1, "alice@nexus.com", 3);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Store::new()))
                .app_data(web::Data::new(config))
                .service(
                    web::scope("")
                        .wrap(from_fn(auth_middleware))
                        .route("/attendance/check-in", web::post().to(check_in))
                        .route("/attendance/check-out", web::post().to(check_out)),
                ),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/attendance/check-in")
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        // Seconds after checking in, a bare checkout is early.
        let req = test::TestRequest::post()
            .uri("/attendance/check-out")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 409);

        let req = test::TestRequest::post()
            .uri("/attendance/check-out")
            .insert_header(("Authorization", auth))
            .set_json(json!({"reason": "half-day approved"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["early"], true);
        assert_eq!(body["record"]["early_logout_reason"], "half-day approved");
    }

    #[actix_web::test]
    async fn manual_record_refuses_future_dates() {
        let config = test_config();
        let auth = bearer(&config, 1, "alice@nexus.com", 3);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Store::new()))
                .app_data(web::Data::new(config))
                .service(
                    web::scope("")
                        .wrap(from_fn(auth_middleware))
                        .route("/attendance/manual", web::post().to(create_manual)),
                ),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/attendance/manual")
            .insert_header(("Authorization", auth))
            .set_json(json!({"date": "2099-01-01", "check_in": "09:00", "check_out": "18:00"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }
}
