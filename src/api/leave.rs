use actix_web::{web, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::api::Pagination;
use crate::auth::auth::AuthUser;
use crate::domain::leave as rules;
use crate::model::leave::{LeaveRequest, LeaveStatus};
use crate::model::role::Role;
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeaveReq {
    #[schema(example = "Annual Leave")]
    pub leave_type: String,
    #[schema(example = "2026-06-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-06-15", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = "Family vacation")]
    pub reason: String,
    #[serde(default)]
    pub is_urgent: bool,
    /// Extra users to notify, besides the requester's manager.
    #[serde(default)]
    pub notify_user_ids: Vec<u64>,
    pub attachment_url: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct EditLeaveReq {
    pub leave_type: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub is_urgent: Option<bool>,
    pub attachment_url: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct DecisionReq {
    #[schema(example = "ok")]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LeaveFilter {
    /// SCREAMING_SNAKE_CASE status name.
    #[param(example = "PENDING_MANAGER")]
    pub status: Option<LeaveStatus>,
    pub user_id: Option<u64>,
}

/// Which requests the caller may see: employees their own, managers their
/// own plus their direct reports', HR everything.
fn visible_to(store: &Store, user: &AuthUser, request: &LeaveRequest) -> bool {
    match user.role {
        Role::Hr => true,
        Role::Manager => {
            request.user_id == user.user_id
                || store
                    .user_by_id(request.user_id)
                    .is_some_and(|u| u.manager_id == Some(user.user_id))
        }
        Role::Employee => request.user_id == user.user_id,
    }
}

#[utoipa::path(
    post,
    path = "/leaves",
    request_body = CreateLeaveReq,
    responses(
        (status = 201, description = "Request submitted", body = LeaveRequest),
        (status = 400, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
#[instrument(skip(store, payload))]
pub async fn create(
    store: web::Data<Store>,
    user: AuthUser,
    payload: web::Json<CreateLeaveReq>,
) -> impl Responder {
    let req = payload.into_inner();

    if req.end_date < req.start_date {
        return HttpResponse::BadRequest()
            .json(json!({"error": "End date cannot be before start date"}));
    }
    if req.reason.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "Reason is required"}));
    }

    let type_ok = store
        .leave_types
        .read()
        .expect("store poisoned")
        .iter()
        .any(|t| t.is_active && t.name == req.leave_type);
    if !type_ok {
        return HttpResponse::BadRequest().json(json!({"error": "Unknown or inactive leave type"}));
    }

    let requester = match store.user_by_id(user.user_id) {
        Some(u) => u,
        None => return HttpResponse::Unauthorized().json(json!({"error": "Unknown account"})),
    };

    let leave = LeaveRequest {
        id: store.next_id(),
        user_id: requester.id,
        user_name: requester.name.clone(),
        leave_type: req.leave_type,
        start_date: req.start_date,
        end_date: req.end_date,
        reason: req.reason.trim().to_string(),
        status: LeaveStatus::PendingManager,
        manager_comment: None,
        hr_comment: None,
        rejected_by: None,
        rejection_comment: None,
        created_at: Utc::now(),
        is_urgent: req.is_urgent,
        notify_user_ids: req.notify_user_ids.clone(),
        attachment_url: req.attachment_url,
    };
    store
        .leaves
        .write()
        .expect("store poisoned")
        .push(leave.clone());

    // Submission fan-out: manager first, then the extra recipients.
    let mut recipient_ids = Vec::new();
    let mut recipient_names = Vec::new();
    if let Some(manager_id) = requester.manager_id {
        recipient_ids.push(manager_id);
        recipient_names.push(store.user_name(manager_id).unwrap_or_else(|| "Manager".into()));
    }
    for &id in &req.notify_user_ids {
        if !recipient_ids.contains(&id) {
            if let Some(name) = store.user_name(id) {
                recipient_ids.push(id);
                recipient_names.push(name);
            }
        }
    }
    if !recipient_ids.is_empty() {
        let message = rules::submission_message(&recipient_names.join(", "), leave.is_urgent);
        for id in recipient_ids {
            store.notify(id, message.clone());
        }
    }

    info!(user_id = user.user_id, leave_id = leave.id, "leave submitted");
    HttpResponse::Created().json(leave)
}

#[utoipa::path(
    get,
    path = "/leaves",
    params(LeaveFilter, Pagination),
    responses((status = 200, description = "Visible requests, newest first")),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
#[instrument(skip(store))]
pub async fn list(
    store: web::Data<Store>,
    user: AuthUser,
    filter: web::Query<LeaveFilter>,
    pagination: web::Query<Pagination>,
) -> impl Responder {
    let mut visible: Vec<LeaveRequest> = store
        .leaves
        .read()
        .expect("store poisoned")
        .iter()
        .filter(|l| visible_to(&store, &user, l))
        .filter(|l| filter.status.is_none_or(|s| l.status == s))
        .filter(|l| filter.user_id.is_none_or(|id| l.user_id == id))
        .cloned()
        .collect();
    visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let (data, total, page, per_page) = pagination.slice(&visible);
    HttpResponse::Ok().json(json!({
        "data": data,
        "total": total,
        "page": page,
        "per_page": per_page,
    }))
}

#[utoipa::path(
    get,
    path = "/leaves/{id}",
    responses(
        (status = 200, body = LeaveRequest),
        (status = 404, description = "Not found or not visible"),
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
#[instrument(skip(store))]
pub async fn get(store: web::Data<Store>, user: AuthUser, path: web::Path<u64>) -> impl Responder {
    let id = path.into_inner();
    let leave = store
        .leaves
        .read()
        .expect("store poisoned")
        .iter()
        .find(|l| l.id == id)
        .cloned();

    match leave {
        Some(l) if visible_to(&store, &user, &l) => HttpResponse::Ok().json(l),
        // Invisible requests 404 rather than 403, existence is not disclosed.
        _ => HttpResponse::NotFound().json(json!({"error": "Leave request not found"})),
    }
}

#[utoipa::path(
    put,
    path = "/leaves/{id}",
    request_body = EditLeaveReq,
    responses(
        (status = 200, description = "Updated; approval stage is preserved", body = LeaveRequest),
        (status = 409, description = "Already finalized"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
#[instrument(skip(store, payload))]
pub async fn edit(
    store: web::Data<Store>,
    user: AuthUser,
    path: web::Path<u64>,
    payload: web::Json<EditLeaveReq>,
) -> impl Responder {
    let id = path.into_inner();
    let mut leaves = store.leaves.write().expect("store poisoned");
    let leave = match leaves.iter_mut().find(|l| l.id == id) {
        Some(l) => l,
        None => return HttpResponse::NotFound().json(json!({"error": "Leave request not found"})),
    };

    if leave.user_id != user.user_id {
        return HttpResponse::Forbidden()
            .json(json!({"error": "Only the requester may edit a leave request"}));
    }
    if let Err(e) = rules::ensure_editable(leave) {
        return HttpResponse::Conflict().json(json!({"error": e.to_string()}));
    }

    // Edit a scratch copy; the stored record only changes once the result
    // validates.
    let req = payload.into_inner();
    let mut edited = leave.clone();
    if let Some(t) = req.leave_type {
        edited.leave_type = t;
    }
    if let Some(d) = req.start_date {
        edited.start_date = d;
    }
    if let Some(d) = req.end_date {
        edited.end_date = d;
    }
    if let Some(r) = req.reason {
        edited.reason = r;
    }
    if let Some(u) = req.is_urgent {
        edited.is_urgent = u;
    }
    if req.attachment_url.is_some() {
        edited.attachment_url = req.attachment_url;
    }
    if edited.end_date < edited.start_date {
        return HttpResponse::BadRequest()
            .json(json!({"error": "End date cannot be before start date"}));
    }

    *leave = edited;
    let updated = leave.clone();
    drop(leaves);

    // The pending gate should know the request changed under it.
    if let Some(manager_id) = store.user_by_id(user.user_id).and_then(|u| u.manager_id) {
        store.notify(
            manager_id,
            format!("{} updated their {} request", updated.user_name, updated.leave_type),
        );
    }

    HttpResponse::Ok().json(updated)
}

/// The approve and reject handlers share this gate: whichever pending stage
/// the request sits at decides who may act on it.
fn actor_may_decide(user: &AuthUser, status: LeaveStatus) -> bool {
    match status {
        LeaveStatus::PendingManager => matches!(user.role, Role::Manager | Role::Hr),
        LeaveStatus::PendingHr => user.role == Role::Hr,
        _ => false,
    }
}

#[utoipa::path(
    post,
    path = "/leaves/{id}/approve",
    request_body = DecisionReq,
    responses(
        (status = 200, description = "Advanced one stage", body = LeaveRequest),
        (status = 403, description = "Wrong role for this stage"),
        (status = 409, description = "Not in an approvable state"),
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
#[instrument(skip(store, payload))]
pub async fn approve(
    store: web::Data<Store>,
    user: AuthUser,
    path: web::Path<u64>,
    payload: web::Json<DecisionReq>,
) -> impl Responder {
    decide(store, user, path.into_inner(), payload.into_inner(), true)
}

#[utoipa::path(
    post,
    path = "/leaves/{id}/reject",
    request_body = DecisionReq,
    responses(
        (status = 200, description = "Rejected", body = LeaveRequest),
        (status = 403, description = "Wrong role for this stage"),
        (status = 409, description = "Already finalized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
#[instrument(skip(store, payload))]
pub async fn reject(
    store: web::Data<Store>,
    user: AuthUser,
    path: web::Path<u64>,
    payload: web::Json<DecisionReq>,
) -> impl Responder {
    decide(store, user, path.into_inner(), payload.into_inner(), false)
}

fn decide(
    store: web::Data<Store>,
    user: AuthUser,
    id: u64,
    req: DecisionReq,
    approve: bool,
) -> HttpResponse {
    let mut leaves = store.leaves.write().expect("store poisoned");
    let leave = match leaves.iter_mut().find(|l| l.id == id) {
        Some(l) => l,
        None => return HttpResponse::NotFound().json(json!({"error": "Leave request not found"})),
    };

    if !actor_may_decide(&user, leave.status) {
        return HttpResponse::Forbidden()
            .json(json!({"error": "Not allowed to decide this request at its current stage"}));
    }

    let target = if approve {
        match leave.status {
            LeaveStatus::PendingManager => LeaveStatus::PendingHr,
            _ => LeaveStatus::Approved,
        }
    } else {
        LeaveStatus::Rejected
    };

    match rules::advance(leave, target, req.comment, user.role) {
        Ok(()) => {
            let updated = leave.clone();
            drop(leaves);
            let verdict = match updated.status {
                LeaveStatus::PendingHr => "was approved by your manager and sent to HR",
                LeaveStatus::Approved => "was approved",
                _ => "was rejected",
            };
            store.notify(
                updated.user_id,
                format!("Your {} request {}", updated.leave_type, verdict),
            );
            info!(leave_id = id, status = %updated.status, "leave decided");
            HttpResponse::Ok().json(updated)
        }
        Err(e) => HttpResponse::Conflict().json(json!({"error": e.to_string()})),
    }
}
