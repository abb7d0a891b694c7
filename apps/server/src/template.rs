//! Status page rendering.

use std::io;
use std::path::{Path, PathBuf};

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use minijinja::{AutoEscape, Environment, context};
use sitemon::Snapshot;
use thiserror::Error;

const HOME_TEMPLATE: &str = "home";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to render template: {0}")]
    Render(#[from] minijinja::Error),
}

impl ResponseError for TemplateError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(format!("Error loading templates: {self}"))
    }
}

pub async fn load_template(path: &Path) -> Result<String, TemplateError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| TemplateError::Io { path: path.to_path_buf(), source })
}

/// Render the status page for `snapshot` with HTML escaping enabled
pub fn render_home(source: &str, snapshot: &Snapshot) -> Result<String, TemplateError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.add_template(HOME_TEMPLATE, source)?;

    let up = snapshot.up_count();
    let rendered = env.get_template(HOME_TEMPLATE)?.render(context! {
        sites => &*snapshot.sites,
        total => snapshot.sites.len(),
        up => up,
        down => snapshot.sites.len() - up,
        loading => snapshot.refreshed_at.is_none(),
        refreshed_at => snapshot.refreshed_at.map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
    })?;

    Ok(rendered)
}
