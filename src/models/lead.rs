use serde::{Deserialize, Serialize};

/// Incoming bulk-insert payload: `{ "data": [ { "leadId": ..., ... } ] }`
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct BulkInsertRequest {
    pub data: Vec<LeadRow>,
}

/// One incoming lead row. `leadId` arrives as a JSON number or a numeric
/// string and is normalized to an integer before storage; every other
/// field passes through opaquely. A missing `leadId` defaults to null so
/// the failure surfaces at parse time, in the same bucket as any other
/// bad id.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LeadRow {
    #[serde(rename = "leadId", default)]
    #[schema(value_type = Object)]
    pub lead_id: serde_json::Value,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BulkInsertResponse {
    pub success: bool,
    pub inserted: u64,
}

/// One page of the filtered lead listing.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LeadsPage {
    pub page: i64,
    pub limit: i64,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_row_keeps_extra_fields() {
        let row: LeadRow = serde_json::from_str(
            r#"{"leadId":"5","leadName":"Ann","source":"web","customField":42}"#,
        )
        .unwrap();

        assert_eq!(row.lead_id, serde_json::json!("5"));
        assert_eq!(row.extra["leadName"], "Ann");
        assert_eq!(row.extra["source"], "web");
        assert_eq!(row.extra["customField"], 42);
        assert!(!row.extra.contains_key("leadId"));
    }

    #[test]
    fn leads_page_serializes_camel_case_total_pages() {
        let page = LeadsPage {
            page: 2,
            limit: 10,
            total: 25,
            total_pages: 3,
            data: vec![],
        };

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalPages"], 3);
        assert!(json.get("total_pages").is_none());
    }
}
