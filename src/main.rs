use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::time::Duration;

mod api;
mod auth;
mod clock;
mod config;
mod db;
mod docs;
mod model;
mod models;
mod routes;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::utils::account_filter;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance service up"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    let pool_for_filter_warmup = pool.clone();
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();
    let sync_config = config.clone();

    actix_web::rt::spawn(async move {
        if let Err(e) = account_filter::warmup_account_filter(&pool_for_filter_warmup, 250).await {
            eprintln!("Failed to warmup account filter: {:?}", e);
        }
    });

    // Keep the trusted clock anchored. Until the first successful sync,
    // punch endpoints refuse to operate.
    actix_web::rt::spawn(async move {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(sync_config.time_fetch_timeout_secs))
            .build()
            .expect("Failed to build HTTP client");
        let tz = sync_config.local_tz();

        loop {
            let delay = match clock::sync::sync_once(&client, &sync_config.time_sources, tz).await
            {
                Ok(offset_ms) => {
                    info!(offset_ms, "Network time sync ok");
                    sync_config.time_sync_interval_secs
                }
                Err(e) => {
                    warn!(error = %e, "Network time sync failed, retrying soon");
                    60
                }
            };
            tokio::time::sleep(Duration::from_secs(delay)).await;
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
