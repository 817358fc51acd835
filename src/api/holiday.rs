use actix_web::{web, HttpResponse, Responder};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::holiday::{Holiday, HolidayKind};
use crate::store::Store;

#[derive(Deserialize, ToSchema)]
pub struct HolidayReq {
    #[schema(example = "New Year")]
    pub name: String,
    #[schema(example = "2027-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: HolidayKind,
    pub description: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct BulkImportReq {
    pub holidays: Vec<HolidayReq>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HolidayFilter {
    #[param(example = 2026)]
    pub year: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/holidays",
    params(HolidayFilter),
    responses((status = 200, body = [Holiday])),
    security(("bearer_auth" = [])),
    tag = "Organization"
)]
#[instrument(skip(store))]
pub async fn list(
    store: web::Data<Store>,
    _user: AuthUser,
    filter: web::Query<HolidayFilter>,
) -> impl Responder {
    let mut holidays: Vec<Holiday> = store
        .holidays
        .read()
        .expect("store poisoned")
        .iter()
        .filter(|h| filter.year.is_none_or(|y| h.date.year() == y))
        .cloned()
        .collect();
    holidays.sort_by_key(|h| h.date);
    HttpResponse::Ok().json(holidays)
}

#[utoipa::path(
    post,
    path = "/holidays",
    request_body = HolidayReq,
    responses((status = 201, body = Holiday), (status = 403, description = "HR only")),
    security(("bearer_auth" = [])),
    tag = "Organization"
)]
#[instrument(skip(store, payload))]
pub async fn create(
    store: web::Data<Store>,
    user: AuthUser,
    payload: web::Json<HolidayReq>,
) -> actix_web::Result<impl Responder> {
    user.require_hr()?;
    let req = payload.into_inner();

    let holiday = Holiday {
        id: store.next_id(),
        name: req.name,
        date: req.date,
        kind: req.kind,
        description: req.description,
    };
    store
        .holidays
        .write()
        .expect("store poisoned")
        .push(holiday.clone());
    Ok(HttpResponse::Created().json(holiday))
}

#[utoipa::path(
    post,
    path = "/holidays/bulk",
    request_body = BulkImportReq,
    responses(
        (status = 201, description = "One record per submitted row, duplicates included"),
        (status = 403, description = "HR only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Organization"
)]
#[instrument(skip(store, payload))]
pub async fn bulk_import(
    store: web::Data<Store>,
    user: AuthUser,
    payload: web::Json<BulkImportReq>,
) -> actix_web::Result<impl Responder> {
    user.require_hr()?;
    let rows = payload.into_inner().holidays;

    // Imports are taken verbatim; N rows in, N records out.
    let mut created = Vec::with_capacity(rows.len());
    {
        let mut holidays = store.holidays.write().expect("store poisoned");
        for row in rows {
            let holiday = Holiday {
                id: store.next_id(),
                name: row.name,
                date: row.date,
                kind: row.kind,
                description: row.description,
            };
            holidays.push(holiday.clone());
            created.push(holiday);
        }
    }

    info!(count = created.len(), "holidays imported");
    Ok(HttpResponse::Created().json(json!({"imported": created.len(), "holidays": created})))
}

#[utoipa::path(
    put,
    path = "/holidays/{id}",
    request_body = HolidayReq,
    responses(
        (status = 200, body = Holiday),
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
    payload: web::Json<HolidayReq>,
) -> actix_web::Result<impl Responder> {
    user.require_hr()?;
    let id = path.into_inner();
    let req = payload.into_inner();

    let mut holidays = store.holidays.write().expect("store poisoned");
    match holidays.iter_mut().find(|h| h.id == id) {
        Some(h) => {
            h.name = req.name;
            h.date = req.date;
            h.kind = req.kind;
            h.description = req.description;
            Ok(HttpResponse::Ok().json(h.clone()))
        }
        None => Ok(HttpResponse::NotFound().json(json!({"error": "Holiday not found"}))),
    }
}

#[utoipa::path(
    delete,
    path = "/holidays/{id}",
    responses(
        (status = 200, description = "Deleted"),
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

    let mut holidays = store.holidays.write().expect("store poisoned");
    let before = holidays.len();
    holidays.retain(|h| h.id != id);
    if holidays.len() == before {
        return Ok(HttpResponse::NotFound().json(json!({"error": "Holiday not found"})));
    }
    Ok(HttpResponse::Ok().json(json!({"message": "Holiday deleted"})))
}
