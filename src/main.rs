mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AppConfig, AuthMode};
use crate::database::{MongoDB, Store};

fn to_io_error(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(to_io_error)?;

    log::info!("🚀 Starting CourseShare API...");
    log::info!("📊 Database: {}", config.database_name);
    if config.auth == AuthMode::Demo {
        log::warn!("⚠️  AUTH_MODE=demo: any bearer token is accepted as the user id");
    }

    let db = MongoDB::new(&config.database_url, &config.database_name)
        .await
        .map_err(|e| to_io_error(format!("Failed to connect to MongoDB: {}", e)))?;
    log::info!("✅ MongoDB connected successfully");

    let store = web::Data::new(Store::mongo(db.clone()));
    let verifier = web::Data::from(config.token_verifier());
    let openapi = api::swagger::ApiDoc::openapi();
    let cors_origins = config.cors_origins.clone();

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("🩺 API Health: http://{}:{}/api/health", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(store.clone())
            .app_data(verifier.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
            .configure(api::configure)
            .default_service(web::route().to(api::not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    log::info!("👋 Shutting down gracefully...");
    db.client().clone().shutdown().await;

    Ok(())
}
