use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, get, web};
use tracing::error;

use crate::state::AppState;
use crate::template::{TemplateError, load_template, render_home};

/// Status page listing every known site and whether it is up
#[get("/")]
pub async fn status_route(state: web::Data<AppState>) -> Result<HttpResponse, TemplateError> {
    let snapshot = state.store.snapshot();

    let page = async {
        let source = load_template(&state.home_template).await?;
        render_home(&source, &snapshot)
    }
    .await
    .inspect_err(|error| error!("Status page unavailable: {error}"))?;

    Ok(HttpResponse::Ok().content_type(ContentType::html()).body(page))
}
