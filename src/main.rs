mod api;
mod database;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "4000".to_string());
    let database_url = env::var("DATABASE_URL")
        .unwrap_or_else(|_| "mongodb://localhost:27017/lead_service".to_string());

    // Required secret: fail fast, no insecure fallback
    env::var("JWT_SECRET").expect("JWT_SECRET must be set");

    log::info!("🚀 Starting Lead Service...");
    log::info!("📊 Database: {}", database_url);

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&database_url)
        .await
        .expect("Failed to connect to MongoDB");

    let db_data = web::Data::new(db.clone());

    log::info!("✅ MongoDB connected successfully");
    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi),
            )
            // Health check
            .route("/", web::get().to(api::health::health_check))
            // Leads
            .route("/leads", web::post().to(api::leads::insert_leads))
            .route("/leads", web::get().to(api::leads::list_leads))
            // Auth
            .route("/register", web::post().to(api::auth::register))
            .route("/login", web::post().to(api::auth::login))
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
