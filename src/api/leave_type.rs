use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::leave::LeaveTypeConfig;
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct LeaveTypeReq {
    #[schema(example = "Study Leave")]
    pub name: String,
    #[schema(example = 5)]
    pub days: u32,
    #[schema(example = "Exam preparation leave")]
    pub description: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[utoipa::path(
    get,
    path = "/leave-types",
    responses((status = 200, body = [LeaveTypeConfig])),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
#[instrument(skip(store))]
pub async fn list(store: web::Data<Store>, _user: AuthUser) -> impl Responder {
    let types = store.leave_types.read().expect("store poisoned").clone();
    HttpResponse::Ok().json(types)
}

#[utoipa::path(
    post,
    path = "/leave-types",
    request_body = LeaveTypeReq,
    responses(
        (status = 201, body = LeaveTypeConfig),
        (status = 403, description = "HR only"),
        (status = 409, description = "Name already in use"),
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
#[instrument(skip(store, payload))]
pub async fn create(
    store: web::Data<Store>,
    user: AuthUser,
    payload: web::Json<LeaveTypeReq>,
) -> actix_web::Result<impl Responder> {
    user.require_hr()?;
    let req = payload.into_inner();

    let mut types = store.leave_types.write().expect("store poisoned");
    if types.iter().any(|t| t.name.eq_ignore_ascii_case(&req.name)) {
        return Ok(HttpResponse::Conflict().json(json!({"error": "Leave type already exists"})));
    }

    let config = LeaveTypeConfig {
        id: store.next_id(),
        name: req.name,
        days: req.days,
        description: req.description,
        is_active: req.is_active,
    };
    types.push(config.clone());
    Ok(HttpResponse::Created().json(config))
}

#[utoipa::path(
    put,
    path = "/leave-types/{id}",
    request_body = LeaveTypeReq,
    responses(
        (status = 200, body = LeaveTypeConfig),
        (status = 403, description = "HR only"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
#[instrument(skip(store, payload))]
pub async fn update(
    store: web::Data<Store>,
    user: AuthUser,
    path: web::Path<u64>,
    payload: web::Json<LeaveTypeReq>,
) -> actix_web::Result<impl Responder> {
    user.require_hr()?;
    let id = path.into_inner();
    let req = payload.into_inner();

    let mut types = store.leave_types.write().expect("store poisoned");
    match types.iter_mut().find(|t| t.id == id) {
        Some(t) => {
            t.name = req.name;
            t.days = req.days;
            t.description = req.description;
            t.is_active = req.is_active;
            Ok(HttpResponse::Ok().json(t.clone()))
        }
        None => Ok(HttpResponse::NotFound().json(json!({"error": "Leave type not found"}))),
    }
}

#[utoipa::path(
    delete,
    path = "/leave-types/{id}",
    responses(
        (status = 200, description = "Deactivated, historical requests keep the name"),
        (status = 403, description = "HR only"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
#[instrument(skip(store))]
pub async fn remove(
    store: web::Data<Store>,
    user: AuthUser,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    user.require_hr()?;
    let id = path.into_inner();

    // Soft delete: existing requests reference the type by name.
    let mut types = store.leave_types.write().expect("store poisoned");
    match types.iter_mut().find(|t| t.id == id) {
        Some(t) => {
            t.is_active = false;
            Ok(HttpResponse::Ok().json(json!({"message": "Leave type deactivated"})))
        }
        None => Ok(HttpResponse::NotFound().json(json!({"error": "Leave type not found"}))),
    }
}
