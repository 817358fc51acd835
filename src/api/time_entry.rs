use std::collections::HashSet;

use actix_web::{web, HttpResponse, Responder};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::domain::timesheet::{self, ClockTime};
use crate::model::role::Role;
use crate::model::time_entry::{TimeEntry, TimeEntryStatus};
use crate::store::Store;

/// Duration as the form submits it: either explicit hours and minutes, or
/// a start/end wall-clock range resolved server-side.
#[derive(Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TimeInput {
    Parts {
        #[schema(example = "2")]
        hours: String,
        #[schema(example = "30")]
        minutes: String,
    },
    Range {
        start: ClockTime,
        end: ClockTime,
    },
}

impl TimeInput {
    fn resolve(&self) -> Result<u32, timesheet::DurationError> {
        match self {
            TimeInput::Parts { hours, minutes } => timesheet::duration_from_parts(hours, minutes),
            TimeInput::Range { start, end } => timesheet::duration_from_range(start, end),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct TimeEntryReq {
    /// Omit for a general, non-project task.
    pub project_id: Option<u64>,
    #[schema(example = "Development")]
    pub task: String,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub time: TimeInput,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_billable")]
    pub is_billable: bool,
}

fn default_billable() -> bool {
    true
}

#[derive(Deserialize, ToSchema)]
pub struct BulkDeleteReq {
    pub ids: Vec<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TimeEntryFilter {
    pub project_id: Option<u64>,
    pub status: Option<TimeEntryStatus>,
    /// HR and managers may query another user.
    pub user_id: Option<u64>,
    /// Substring match on task and description.
    pub search: Option<String>,
    /// `week` or `month` window anchored on `date` (defaults to today).
    pub window: Option<String>,
    pub date: Option<NaiveDate>,
}

fn window_bounds(filter: &TimeEntryFilter) -> Option<(NaiveDate, NaiveDate)> {
    let anchor = filter.date.unwrap_or_else(|| Utc::now().date_naive());
    match filter.window.as_deref() {
        Some("week") => {
            let monday = timesheet::week_monday(anchor);
            Some((monday, monday + Duration::days(6)))
        }
        Some("month") => {
            let first = anchor.with_day(1)?;
            let next = if first.month() == 12 {
                NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
            } else {
                NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
            };
            Some((first, next - Duration::days(1)))
        }
        _ => None,
    }
}

fn resolve_subject(user: &AuthUser, requested: Option<u64>) -> Result<u64, HttpResponse> {
    match requested {
        Some(other) if other != user.user_id => {
            if matches!(user.role, Role::Hr | Role::Manager) {
                Ok(other)
            } else {
                Err(HttpResponse::Forbidden()
                    .json(json!({"error": "Cannot view another user's time entries"})))
            }
        }
        _ => Ok(user.user_id),
    }
}

fn collect(store: &Store, subject: u64, filter: &TimeEntryFilter) -> Vec<TimeEntry> {
    let bounds = window_bounds(filter);
    let needle = filter.search.as_deref().map(str::to_lowercase);

    let mut entries: Vec<TimeEntry> = store
        .time_entries
        .read()
        .expect("store poisoned")
        .iter()
        .filter(|e| e.user_id == subject)
        .filter(|e| filter.project_id.is_none_or(|p| e.project_id == Some(p)))
        .filter(|e| filter.status.is_none_or(|s| e.status == s))
        .filter(|e| bounds.is_none_or(|(from, to)| e.date >= from && e.date <= to))
        .filter(|e| {
            needle.as_deref().is_none_or(|n| {
                e.task.to_lowercase().contains(n) || e.description.to_lowercase().contains(n)
            })
        })
        .cloned()
        .collect();
    entries.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    entries
}

#[utoipa::path(
    get,
    path = "/time-entries",
    params(TimeEntryFilter),
    responses((status = 200, body = [TimeEntry])),
    security(("bearer_auth" = [])),
    tag = "Timesheet"
)]
#[instrument(skip(store))]
pub async fn list(
    store: web::Data<Store>,
    user: AuthUser,
    filter: web::Query<TimeEntryFilter>,
) -> impl Responder {
    let subject = match resolve_subject(&user, filter.user_id) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(collect(&store, subject, &filter))
}

#[utoipa::path(
    post,
    path = "/time-entries",
    request_body = TimeEntryReq,
    responses(
        (status = 201, body = TimeEntry),
        (status = 400, description = "Duration did not resolve to a positive value"),
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheet"
)]
#[instrument(skip(store, payload))]
pub async fn create(
    store: web::Data<Store>,
    user: AuthUser,
    payload: web::Json<TimeEntryReq>,
) -> impl Responder {
    let req = payload.into_inner();

    let duration_minutes = match req.time.resolve() {
        Ok(m) => m,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": e.to_string()})),
    };
    if let Some(project_id) = req.project_id {
        let known = store
            .projects
            .read()
            .expect("store poisoned")
            .iter()
            .any(|p| p.id == project_id);
        if !known {
            return HttpResponse::BadRequest().json(json!({"error": "Unknown project"}));
        }
    }

    let entry = TimeEntry {
        id: store.next_id(),
        user_id: user.user_id,
        project_id: req.project_id,
        task: req.task,
        date: req.date,
        duration_minutes,
        description: req.description,
        status: TimeEntryStatus::Pending,
        is_billable: req.is_billable,
    };
    store
        .time_entries
        .write()
        .expect("store poisoned")
        .push(entry.clone());

    HttpResponse::Created().json(entry)
}

#[utoipa::path(
    put,
    path = "/time-entries/{id}",
    request_body = TimeEntryReq,
    responses(
        (status = 200, body = TimeEntry),
        (status = 404, description = "Not found or not yours"),
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheet"
)]
#[instrument(skip(store, payload))]
pub async fn update(
    store: web::Data<Store>,
    user: AuthUser,
    path: web::Path<u64>,
    payload: web::Json<TimeEntryReq>,
) -> impl Responder {
    let id = path.into_inner();
    let req = payload.into_inner();

    let duration_minutes = match req.time.resolve() {
        Ok(m) => m,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": e.to_string()})),
    };

    let mut entries = store.time_entries.write().expect("store poisoned");
    let entry = match entries
        .iter_mut()
        .find(|e| e.id == id && (e.user_id == user.user_id || user.role == Role::Hr))
    {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(json!({"error": "Time entry not found"})),
    };

    entry.project_id = req.project_id;
    entry.task = req.task;
    entry.date = req.date;
    entry.duration_minutes = duration_minutes;
    entry.description = req.description;
    entry.is_billable = req.is_billable;
    // Any edit sends the entry back for review.
    entry.status = TimeEntryStatus::Pending;

    HttpResponse::Ok().json(entry.clone())
}

#[utoipa::path(
    delete,
    path = "/time-entries/{id}",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found or not yours"),
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheet"
)]
#[instrument(skip(store))]
pub async fn remove(store: web::Data<Store>, user: AuthUser, path: web::Path<u64>) -> impl Responder {
    let id = path.into_inner();
    let ids = HashSet::from([id]);

    let mut entries = store.time_entries.write().expect("store poisoned");
    let owned = entries
        .iter()
        .any(|e| e.id == id && (e.user_id == user.user_id || user.role == Role::Hr));
    if !owned {
        return HttpResponse::NotFound().json(json!({"error": "Time entry not found"}));
    }

    timesheet::bulk_delete(&mut entries, &ids);
    HttpResponse::Ok().json(json!({"deleted": 1}))
}

#[utoipa::path(
    post,
    path = "/time-entries/bulk-delete",
    request_body = BulkDeleteReq,
    responses((status = 200, description = "Count of entries actually removed")),
    security(("bearer_auth" = [])),
    tag = "Timesheet"
)]
#[instrument(skip(store, payload))]
pub async fn bulk_remove(
    store: web::Data<Store>,
    user: AuthUser,
    payload: web::Json<BulkDeleteReq>,
) -> impl Responder {
    let requested: HashSet<u64> = payload.ids.iter().copied().collect();

    let mut entries = store.time_entries.write().expect("store poisoned");
    // Trim the set to what the caller actually owns; unknown and foreign
    // ids silently drop out of the count.
    let deletable: HashSet<u64> = entries
        .iter()
        .filter(|e| requested.contains(&e.id))
        .filter(|e| e.user_id == user.user_id || user.role == Role::Hr)
        .map(|e| e.id)
        .collect();

    let deleted = timesheet::bulk_delete(&mut entries, &deletable);
    info!(user_id = user.user_id, deleted, "bulk delete");
    HttpResponse::Ok().json(json!({"deleted": deleted}))
}

#[utoipa::path(
    post,
    path = "/time-entries/{id}/approve",
    responses(
        (status = 200, body = TimeEntry),
        (status = 403, description = "HR only"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheet"
)]
#[instrument(skip(store))]
pub async fn approve(
    store: web::Data<Store>,
    user: AuthUser,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    user.require_hr()?;
    let id = path.into_inner();

    let mut entries = store.time_entries.write().expect("store poisoned");
    match entries.iter_mut().find(|e| e.id == id) {
        Some(e) => {
            e.status = TimeEntryStatus::Approved;
            Ok(HttpResponse::Ok().json(e.clone()))
        }
        None => Ok(HttpResponse::NotFound().json(json!({"error": "Time entry not found"}))),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// Any date inside the wanted week; defaults to the current week.
    pub date: Option<NaiveDate>,
    pub user_id: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/time-entries/report/weekly",
    params(ReportQuery),
    responses((status = 200, description = "Mon-Fri matrix, one row per project")),
    security(("bearer_auth" = [])),
    tag = "Timesheet"
)]
#[instrument(skip(store))]
pub async fn weekly_report(
    store: web::Data<Store>,
    user: AuthUser,
    query: web::Query<ReportQuery>,
) -> impl Responder {
    let subject = match resolve_subject(&user, query.user_id) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let monday = timesheet::week_monday(query.date.unwrap_or_else(|| Utc::now().date_naive()));

    let entries: Vec<TimeEntry> = store
        .time_entries
        .read()
        .expect("store poisoned")
        .iter()
        .filter(|e| e.user_id == subject)
        .cloned()
        .collect();
    let rows = timesheet::weekly_matrix(&entries, monday);
    let total: u64 = rows.iter().map(|r| r.total).sum();

    HttpResponse::Ok().json(json!({
        "week_start": monday,
        "rows": rows,
        "total_minutes": total,
    }))
}

#[utoipa::path(
    get,
    path = "/time-entries/report/summary",
    params(TimeEntryFilter),
    responses((status = 200, description = "Minutes per project over the filtered slice")),
    security(("bearer_auth" = [])),
    tag = "Timesheet"
)]
#[instrument(skip(store))]
pub async fn project_summary(
    store: web::Data<Store>,
    user: AuthUser,
    filter: web::Query<TimeEntryFilter>,
) -> impl Responder {
    let subject = match resolve_subject(&user, filter.user_id) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let entries = collect(&store, subject, &filter);
    let summary = timesheet::summarize_by_project(&entries);

    let rows: Vec<serde_json::Value> = summary
        .into_iter()
        .map(|(project_id, minutes)| {
            let project_name = project_id
                .and_then(|id| {
                    store
                        .projects
                        .read()
                        .expect("store poisoned")
                        .iter()
                        .find(|p| p.id == id)
                        .map(|p| p.name.clone())
                })
                .unwrap_or_else(|| "General".into());
            json!({
                "project_id": project_id,
                "project_name": project_name,
                "minutes": minutes,
            })
        })
        .collect();

    HttpResponse::Ok().json(rows)
}
