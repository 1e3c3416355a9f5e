#![deny(missing_docs)]
//! DesignGuard server executable.
//!
//! Hosts HTTP endpoints for design-system analysis and the interactive session.

mod openapi;
mod routes;

#[cfg(not(test))]
use actix_cors::Cors;
#[cfg(not(test))]
use actix_web::{App, HttpServer, http::header, web};
#[cfg(not(test))]
use dotenvy::dotenv;

#[allow(unused_imports)]
use std::str::FromStr;

#[cfg(not(test))]
use crate::routes::{AnalysisConfig, AppState, configure};

#[cfg(not(test))]
fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let analysis = AnalysisConfig::from_env();
    log::info!(
        "fetch timeout {}s, fallback {}",
        analysis.fetch.timeout.as_secs(),
        if analysis.fallback { "enabled" } else { "disabled" }
    );
    let state = web::Data::new(AppState::new(analysis));

    let origins = std::env::var("DESIGNGUARD_UI_ORIGINS")
        .unwrap_or_else(|_| "http://127.0.0.1:4200,http://localhost:4200".to_string());
    let allowed_origins: Vec<String> = origins
        .split(',')
        .map(|value| value.trim())
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect();

    let listen_addr =
        std::env::var("DESIGNGUARD_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let listen_port = u16::from_str(
        &std::env::var("DESIGNGUARD_PORT").unwrap_or_else(|_| "8080".to_string()),
    )
    .map_err(|err| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("DESIGNGUARD_PORT must be a u16 number: {err}"),
        )
    })?;

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let mut cors = Cors::default()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::CONTENT_TYPE])
                .max_age(3600);
            for origin in &allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            App::new()
                .wrap(actix_web::middleware::Logger::default())
                .wrap(cors)
                .app_data(state.clone())
                .configure(configure)
        })
        .bind((listen_addr, listen_port))?
        .run()
        .await
    })
}

#[cfg(test)]
fn main() {}
