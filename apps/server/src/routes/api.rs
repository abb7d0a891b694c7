use actix_web::{HttpResponse, Responder, get, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sitemon::Site;

use crate::state::AppState;

macros_utils::routes! {
    route sites_route,
}

#[derive(Debug, Serialize)]
struct SitesResponse<'a> {
    sites: &'a [Site],
    up: usize,
    total: usize,
    refreshed_at: Option<DateTime<Utc>>,
}

/// Current snapshot as JSON
#[get("/api/sites")]
pub async fn sites_route(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.store.snapshot();

    HttpResponse::Ok().json(SitesResponse {
        sites: &snapshot.sites,
        up: snapshot.up_count(),
        total: snapshot.sites.len(),
        refreshed_at: snapshot.refreshed_at,
    })
}
