use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::project::{Project, ProjectStatus};
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct ProjectReq {
    #[schema(example = "Website Revamp")]
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    #[schema(value_type = Option<String>, format = "date")]
    pub due_date: Option<NaiveDate>,
    /// Task picklist offered when logging time.
    #[serde(default)]
    pub tasks: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/projects",
    responses((status = 200, body = [Project])),
    security(("bearer_auth" = [])),
    tag = "Organization"
)]
#[instrument(skip(store))]
pub async fn list(store: web::Data<Store>, _user: AuthUser) -> impl Responder {
    HttpResponse::Ok().json(store.projects.read().expect("store poisoned").clone())
}

#[utoipa::path(
    post,
    path = "/projects",
    request_body = ProjectReq,
    responses((status = 201, body = Project), (status = 403, description = "HR only")),
    security(("bearer_auth" = [])),
    tag = "Organization"
)]
#[instrument(skip(store, payload))]
pub async fn create(
    store: web::Data<Store>,
    user: AuthUser,
    payload: web::Json<ProjectReq>,
) -> actix_web::Result<impl Responder> {
    user.require_hr()?;
    let req = payload.into_inner();

    let project = Project {
        id: store.next_id(),
        name: req.name,
        description: req.description,
        status: req.status,
        due_date: req.due_date,
        tasks: req.tasks,
    };
    store
        .projects
        .write()
        .expect("store poisoned")
        .push(project.clone());
    Ok(HttpResponse::Created().json(project))
}

#[utoipa::path(
    put,
    path = "/projects/{id}",
    request_body = ProjectReq,
    responses(
        (status = 200, body = Project),
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
    payload: web::Json<ProjectReq>,
) -> actix_web::Result<impl Responder> {
    user.require_hr()?;
    let id = path.into_inner();
    let req = payload.into_inner();

    let mut projects = store.projects.write().expect("store poisoned");
    match projects.iter_mut().find(|p| p.id == id) {
        Some(p) => {
            p.name = req.name;
            p.description = req.description;
            p.status = req.status;
            p.due_date = req.due_date;
            p.tasks = req.tasks;
            Ok(HttpResponse::Ok().json(p.clone()))
        }
        None => Ok(HttpResponse::NotFound().json(json!({"error": "Project not found"}))),
    }
}

#[utoipa::path(
    delete,
    path = "/projects/{id}",
    responses(
        (status = 200, description = "Deleted; existing time entries keep their history"),
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

    let mut projects = store.projects.write().expect("store poisoned");
    let before = projects.len();
    projects.retain(|p| p.id != id);
    if projects.len() == before {
        return Ok(HttpResponse::NotFound().json(json!({"error": "Project not found"})));
    }
    drop(projects);

    for u in store.users.write().expect("store poisoned").iter_mut() {
        u.project_ids.retain(|&p| p != id);
    }
    Ok(HttpResponse::Ok().json(json!({"message": "Project deleted"})))
}
