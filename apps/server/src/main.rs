#![warn(clippy::all, clippy::pedantic)]

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use clap::Parser;
use dotenvy::dotenv;
use sitemon::{HttpProber, RefreshSettings, Refresher, Scheduler, SiteStore, SitemapFetcher};
use tracing::{debug, info};

mod cli;
mod config;
mod error;
mod routes;
mod state;
mod template;

use cli::Cli;
use config::Config;
use error::AppError;
use logger::init_tracing;
use state::AppState;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = cli.resolve()?;
    if cli.print_config {
        print!("{config}");
        return Ok(());
    }
    debug!("{config}");

    let store = Arc::new(SiteStore::new());
    let refresher = build_refresher(&config, Arc::clone(&store))?;
    let scheduler = Scheduler::new(Arc::new(refresher), config.refresh.interval()).start();

    let state = AppState { store, home_template: config.templates.home.clone() };
    let addr = config.server.socket_addr()?;
    let result = run_server(addr, state).await;

    scheduler.abort();
    info!("Server stopped");
    result
}

fn build_refresher(config: &Config, store: Arc<SiteStore>) -> Result<Refresher, AppError> {
    let fetcher = SitemapFetcher::new(config.sitemap.url.clone(), config.refresh.probe_timeout())?;
    let prober = Arc::new(HttpProber::new(config.refresh.probe_timeout())?);
    let settings = RefreshSettings {
        max_concurrency: config.refresh.max_concurrency,
        batch_timeout: config.refresh.batch_timeout(),
    };

    Ok(Refresher::new(fetcher, prober, store, settings))
}

async fn run_server(addr: SocketAddr, state: AppState) -> Result<(), AppError> {
    let state = Data::new(state);
    info!("Listening on http://{addr}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(routes::routes)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
