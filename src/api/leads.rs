use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    database::MongoDB,
    models::{BulkInsertRequest, BulkInsertResponse, LeadsPage},
    services::lead_service::{self, LeadFilters},
};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct LeadListQuery {
    pub source: Option<String>,
    #[serde(rename = "interestLevel")]
    pub interest_level: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "searchQuery")]
    pub search_query: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[utoipa::path(
    post,
    path = "/leads",
    tag = "Leads",
    responses(
        (status = 200, description = "Rows inserted (duplicates skipped)", body = BulkInsertResponse),
        (status = 500, description = "Insert failed")
    )
)]
pub async fn insert_leads(
    db: web::Data<MongoDB>,
    request: web::Json<BulkInsertRequest>,
) -> HttpResponse {
    log::info!("📥 POST /leads - {} rows", request.data.len());

    match lead_service::insert_leads(&db, &request.data).await {
        Ok(inserted) => {
            log::info!("✅ Leads inserted: {}", inserted);
            HttpResponse::Ok().json(BulkInsertResponse {
                success: true,
                inserted,
            })
        }
        Err(e) => {
            log::error!("❌ Error inserting leads: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to insert leads"
            }))
        }
    }
}

#[utoipa::path(
    get,
    path = "/leads",
    tag = "Leads",
    params(
        ("source" = Option<String>, Query, description = "Exact match on source channel"),
        ("interestLevel" = Option<String>, Query, description = "Exact match on interest level"),
        ("status" = Option<String>, Query, description = "Exact match on status"),
        ("searchQuery" = Option<String>, Query, description = "Case-insensitive substring match on lead name"),
        ("page" = Option<String>, Query, description = "Page number, default 1"),
        ("limit" = Option<String>, Query, description = "Page size, default 20")
    ),
    responses(
        (status = 200, description = "One page of matching leads", body = LeadsPage),
        (status = 500, description = "Query failed")
    )
)]
pub async fn list_leads(db: web::Data<MongoDB>, query: web::Query<LeadListQuery>) -> HttpResponse {
    let query = query.into_inner();

    let page = lead_service::parse_page_param(query.page.as_deref(), DEFAULT_PAGE);
    let limit = lead_service::parse_page_param(query.limit.as_deref(), DEFAULT_LIMIT);

    let filters = LeadFilters {
        source: query.source,
        interest_level: query.interest_level,
        status: query.status,
        search_query: query.search_query,
    };

    log::info!("📋 GET /leads - page: {}, limit: {}", page, limit);

    match lead_service::list_leads(&db, &filters, page, limit).await {
        Ok(result) => {
            log::info!(
                "✅ Leads retrieved: {} of {} total",
                result.data.len(),
                result.total
            );
            HttpResponse::Ok().json(result)
        }
        Err(e) => {
            log::error!("❌ Error getting leads: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to get leads"
            }))
        }
    }
}
