use actix_cors::Cors;
use actix_web::{error::InternalError, middleware::Logger, web, App, HttpResponse, HttpServer};
use auth::{Authentication, SessionTokens};
use log::info;
use services::jobs::{create_job, get_job, list_jobs, update_job};

use crate::{config::Config, service::JobService};
use response::ApiResponse;

pub mod auth;
mod response;
mod services;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ApiResponse::error(
            "BAD_REQUEST",
            format!("invalid request body: {}", err),
        ));
        InternalError::from_response(err, response).into()
    })
}

/// Registers the `/api` routes. Expects `JobService` and `SessionTokens` app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            .wrap(Authentication)
            .service(create_job)
            .service(list_jobs)
            .service(get_job)
            .service(update_job),
    );
}

pub async fn start_http(config: &Config, service: JobService) -> anyhow::Result<()> {
    let service = web::Data::new(service);
    let tokens = web::Data::new(SessionTokens(config.auth_tokens.clone()));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(service.clone())
            .app_data(tokens.clone())
            .configure(configure)
    });
    let addr = format!("{}:{}", config.bind_addr, config.port);
    info!("http server listening on {}", addr);
    server.bind(addr)?.run().await?;
    Ok(())
}
