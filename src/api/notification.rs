use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::instrument;

use crate::auth::auth::AuthUser;
use crate::model::notification::Notification;
use crate::store::Store;

#[utoipa::path(
    get,
    path = "/notifications",
    responses((status = 200, body = [Notification], description = "Own feed, newest first")),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(store))]
pub async fn list(store: web::Data<Store>, user: AuthUser) -> impl Responder {
    let mut own: Vec<Notification> = store
        .notifications
        .read()
        .expect("store poisoned")
        .iter()
        .filter(|n| n.user_id == user.user_id)
        .cloned()
        .collect();
    own.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    HttpResponse::Ok().json(own)
}

#[utoipa::path(
    post,
    path = "/notifications/read-all",
    responses((status = 200, description = "Count of notifications marked read")),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(store))]
pub async fn mark_all_read(store: web::Data<Store>, user: AuthUser) -> impl Responder {
    let mut marked = 0;
    for n in store
        .notifications
        .write()
        .expect("store poisoned")
        .iter_mut()
        .filter(|n| n.user_id == user.user_id && !n.read)
    {
        n.read = true;
        marked += 1;
    }
    HttpResponse::Ok().json(json!({"marked_read": marked}))
}
