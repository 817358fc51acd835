use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::department::Department;
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct DepartmentReq {
    #[schema(example = "Engineering")]
    pub name: String,
    pub description: Option<String>,
    /// Head of department.
    pub manager_id: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/departments",
    responses((status = 200, body = [Department])),
    security(("bearer_auth" = [])),
    tag = "Organization"
)]
#[instrument(skip(store))]
pub async fn list(store: web::Data<Store>, _user: AuthUser) -> impl Responder {
    HttpResponse::Ok().json(store.departments.read().expect("store poisoned").clone())
}

#[utoipa::path(
    post,
    path = "/departments",
    request_body = DepartmentReq,
    responses((status = 201, body = Department), (status = 403, description = "HR only")),
    security(("bearer_auth" = [])),
    tag = "Organization"
)]
#[instrument(skip(store, payload))]
pub async fn create(
    store: web::Data<Store>,
    user: AuthUser,
    payload: web::Json<DepartmentReq>,
) -> actix_web::Result<impl Responder> {
    user.require_hr()?;
    let req = payload.into_inner();

    let department = Department {
        id: store.next_id(),
        name: req.name,
        description: req.description,
        manager_id: req.manager_id,
    };
    store
        .departments
        .write()
        .expect("store poisoned")
        .push(department.clone());
    Ok(HttpResponse::Created().json(department))
}

#[utoipa::path(
    put,
    path = "/departments/{id}",
    request_body = DepartmentReq,
    responses(
        (status = 200, body = Department),
        (status = 403, description = "HR only"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Organization"
)]
#[instrument(skip(store, payload))]
pub async fn update(
    store: web::Data<Store>,
    user: AuthUser,
    path: web::Path<u64>,
    payload: web::Json<DepartmentReq>,
) -> actix_web::Result<impl Responder> {
    user.require_hr()?;
    let id = path.into_inner();
    let req = payload.into_inner();

    let mut departments = store.departments.write().expect("store poisoned");
    match departments.iter_mut().find(|d| d.id == id) {
        Some(d) => {
            d.name = req.name;
            d.description = req.description;
            d.manager_id = req.manager_id;
            Ok(HttpResponse::Ok().json(d.clone()))
        }
        None => Ok(HttpResponse::NotFound().json(json!({"error": "Department not found"}))),
    }
}

#[utoipa::path(
    delete,
    path = "/departments/{id}",
    responses(
        (status = 200, description = "Deleted; members keep no department"),
        (status = 403, description = "HR only"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Organization"
)]
#[instrument(skip(store))]
pub async fn remove(
    store: web::Data<Store>,
    user: AuthUser,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    user.require_hr()?;
    let id = path.into_inner();

    let mut departments = store.departments.write().expect("store poisoned");
    let before = departments.len();
    departments.retain(|d| d.id != id);
    if departments.len() == before {
        return Ok(HttpResponse::NotFound().json(json!({"error": "Department not found"})));
    }
    drop(departments);

    // Detach members rather than cascading a delete into the directory.
    for u in store.users.write().expect("store poisoned").iter_mut() {
        if u.department_id == Some(id) {
            u.department_id = None;
        }
    }
    Ok(HttpResponse::Ok().json(json!({"message": "Department deleted"})))
}
