use actix_web::{web, HttpResponse};

use crate::services::auth_service::{self, LoginRequest, RegisterRequest};
use crate::{database::MongoDB, utils::error::AppError};

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = auth_service::RegisterResponse),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "User already exists"),
        (status = 500, description = "Registration failed")
    )
)]
pub async fn register(
    db: web::Data<MongoDB>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    let email = request.email.as_deref().unwrap_or("N/A");
    log::info!("📝 POST /register - email: {}", email);

    match auth_service::register(&db, &request).await {
        Ok(response) => {
            log::info!("✅ Registration successful: {}", email);
            HttpResponse::Created().json(response)
        }
        Err(AppError::InvalidRequest(_)) => {
            log::warn!("❌ Registration rejected: missing fields");
            HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Missing fields"
            }))
        }
        Err(AppError::Conflict(_)) => {
            log::warn!("❌ Registration rejected: {} already exists", email);
            HttpResponse::Conflict().json(serde_json::json!({
                "error": "User already exists"
            }))
        }
        Err(e) => {
            // Internal detail stays in the log
            log::error!("❌ Registration failed: {} - {}", email, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Registration failed"
            }))
        }
    }
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = auth_service::LoginResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Login failed")
    )
)]
pub async fn login(db: web::Data<MongoDB>, request: web::Json<LoginRequest>) -> HttpResponse {
    log::info!("🔐 POST /login - email: {}", request.email);

    match auth_service::login(&db, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", request.email);
            HttpResponse::Ok().json(response)
        }
        Err(AppError::Unauthorized(_)) => {
            log::warn!("❌ Login rejected: {}", request.email);
            HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid email or password"
            }))
        }
        Err(e) => {
            // Internal detail stays in the log
            log::error!("❌ Login failed: {} - {}", request.email, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Login failed"
            }))
        }
    }
}
