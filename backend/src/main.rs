mod config;
mod error;
mod job_controller;
mod services;

use crate::config::AppConfig;
use crate::job_controller::state::{start_job_updater, JobsState};
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load().map_err(io::Error::other)?;
    let host = config.server.host.clone();
    let port = config.server.port;
    info!(
        "Templates from {}, PDFs to {}, {} backend",
        config.paths.template_path.display(),
        config.paths.output_dir.display(),
        config.browser.kind
    );

    // Initialize job controller state
    let (jobs_state, rx) = JobsState::new(100);
    tokio::spawn(start_job_updater(jobs_state.clone(), rx));

    let app_config = web::Data::new(config);
    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(app_config.clone())
            .service(services::templates::configure_routes())
            .service(services::data_sources::table::configure_routes())
            .service(services::merge::configure_routes())
            .route("/api/config", web::get().to(config::process))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
