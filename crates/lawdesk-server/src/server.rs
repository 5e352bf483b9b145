use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use std::io;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::handlers;
use crate::middleware::TracingMiddleware;
use crate::state::AppState;

const JSON_LIMIT: usize = 1024 * 1024;

/// Routes shared by the binary and the integration tests.
pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .route("/chat", web::post().to(handlers::chat::handler))
            .route("/calendly-slots", web::get().to(handlers::calendly::slots))
            .route(
                "/calendly-booking",
                web::post().to(handlers::calendly::booking),
            )
            .route("/intake-webhook", web::post().to(handlers::intake::handler))
            .route("/health", web::get().to(handlers::health::handler)),
    )
    .route(
        "/{path:.*}",
        web::get().to(handlers::static_files::handler),
    )
    .default_service(web::to(handlers::static_files::not_found));
}

pub fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub async fn run(config: ServerConfig) -> io::Result<()> {
    let bind = (config.host.clone(), config.port);
    let origins = config.allowed_origins.clone();
    let state = web::Data::new(AppState::new(config));

    log::info!("Server running on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors(&origins))
            .wrap(TracingMiddleware)
            .configure(app_config)
    })
    .bind(bind)?
    .run()
    .await
}
