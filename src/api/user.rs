use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::role::Role;
use crate::model::user::User;
use crate::store::Store;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DirectoryFilter {
    pub department_id: Option<u64>,
    /// Substring match on name, email and job title.
    pub search: Option<String>,
}

/// Fields anyone may change on their own profile. Org placement
/// (role, manager, department, projects) is HR-only.
#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileReq {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    // HR-only below
    pub role_id: Option<u8>,
    pub manager_id: Option<u64>,
    pub department_id: Option<u64>,
    pub project_ids: Option<Vec<u64>>,
    #[schema(value_type = Option<String>, format = "date")]
    pub hire_date: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/users",
    params(DirectoryFilter),
    responses((status = 200, body = [User])),
    security(("bearer_auth" = [])),
    tag = "Directory"
)]
#[instrument(skip(store))]
pub async fn list(
    store: web::Data<Store>,
    _user: AuthUser,
    filter: web::Query<DirectoryFilter>,
) -> impl Responder {
    let needle = filter.search.as_deref().map(str::to_lowercase);
    let mut users: Vec<User> = store
        .users
        .read()
        .expect("store poisoned")
        .iter()
        .filter(|u| filter.department_id.is_none_or(|d| u.department_id == Some(d)))
        .filter(|u| {
            needle.as_deref().is_none_or(|n| {
                u.name.to_lowercase().contains(n)
                    || u.email.to_lowercase().contains(n)
                    || u.job_title
                        .as_deref()
                        .is_some_and(|t| t.to_lowercase().contains(n))
            })
        })
        .cloned()
        .collect();
    users.sort_by(|a, b| a.name.cmp(&b.name));
    HttpResponse::Ok().json(users)
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    responses((status = 200, body = User), (status = 404, description = "Not found")),
    security(("bearer_auth" = [])),
    tag = "Directory"
)]
#[instrument(skip(store))]
pub async fn get(store: web::Data<Store>, _user: AuthUser, path: web::Path<u64>) -> impl Responder {
    match store.user_by_id(path.into_inner()) {
        Some(u) => HttpResponse::Ok().json(u),
        None => HttpResponse::NotFound().json(json!({"error": "User not found"})),
    }
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    request_body = UpdateProfileReq,
    responses(
        (status = 200, body = User),
        (status = 403, description = "Not your profile, or org fields without HR"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Directory"
)]
#[instrument(skip(store, payload))]
pub async fn update(
    store: web::Data<Store>,
    user: AuthUser,
    path: web::Path<u64>,
    payload: web::Json<UpdateProfileReq>,
) -> impl Responder {
    let id = path.into_inner();
    let req = payload.into_inner();

    if id != user.user_id && user.require_hr().is_err() {
        return HttpResponse::Forbidden()
            .json(json!({"error": "Only HR may edit another user's profile"}));
    }

    let touches_org = req.role_id.is_some()
        || req.manager_id.is_some()
        || req.department_id.is_some()
        || req.project_ids.is_some()
        || req.hire_date.is_some();
    if touches_org && user.require_hr().is_err() {
        return HttpResponse::Forbidden()
            .json(json!({"error": "Only HR may change org placement"}));
    }

    let mut users = store.users.write().expect("store poisoned");
    let target = match users.iter_mut().find(|u| u.id == id) {
        Some(u) => u,
        None => return HttpResponse::NotFound().json(json!({"error": "User not found"})),
    };

    if let Some(name) = req.name {
        target.name = name;
    }
    if req.phone.is_some() {
        target.phone = req.phone;
    }
    if req.job_title.is_some() {
        target.job_title = req.job_title;
    }
    if let Some(role_id) = req.role_id {
        match Role::from_id(role_id) {
            Some(r) => target.role = r,
            None => return HttpResponse::BadRequest().json(json!({"error": "Unknown role id"})),
        }
    }
    if req.manager_id.is_some() {
        target.manager_id = req.manager_id;
    }
    if req.department_id.is_some() {
        target.department_id = req.department_id;
    }
    if let Some(projects) = req.project_ids {
        target.project_ids = projects;
    }
    if req.hire_date.is_some() {
        target.hire_date = req.hire_date;
    }

    HttpResponse::Ok().json(target.clone())
}
