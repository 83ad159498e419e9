use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lead Service API",
        version = "1.0.0",
        description = "Lead-management CRUD endpoints with username/password authentication and JWT token issuance.\n\n**Features:**\n- Bulk lead insert with duplicate skip\n- Filtered and paginated lead listing\n- Registration and login"
    ),
    paths(
        // Health
        crate::api::health::health_check,

        // Leads
        crate::api::leads::insert_leads,
        crate::api::leads::list_leads,

        // Auth
        crate::api::auth::register,
        crate::api::auth::login,
    ),
    components(
        schemas(
            // Health
            crate::api::health::HealthResponse,

            // Leads
            crate::models::lead::BulkInsertResponse,
            crate::models::lead::LeadsPage,

            // Auth
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::RegisterResponse,
            crate::services::auth_service::LoginResponse,
            crate::services::auth_service::UserInfo,
        )
    ),
    tags(
        (name = "Health", description = "Service liveness check."),
        (name = "Leads", description = "Bulk insert and filtered listing of prospective-customer records."),
        (name = "Auth", description = "Registration and login with JWT token issuance.")
    )
)]
pub struct ApiDoc;
