use crate::{
    database::MongoDB,
    models::{LeadRow, LeadsPage},
};
use mongodb::bson::{doc, Bson, Document};
use std::collections::HashSet;

const COLLECTION: &str = "leads";

/// Optional exact-match and substring filters for the lead listing.
/// An empty string means option 'All' and adds no constraint.
#[derive(Debug, Default)]
pub struct LeadFilters {
    pub source: Option<String>,
    pub interest_level: Option<String>,
    pub status: Option<String>,
    pub search_query: Option<String>,
}

/// Bulk insert with duplicate-skip semantics: rows whose leadId repeats an
/// earlier row in the payload, or an already stored lead, are silently
/// dropped. Returns the number of rows actually written.
pub async fn insert_leads(db: &MongoDB, rows: &[LeadRow]) -> Result<u64, String> {
    let collection = db.collection::<Document>(COLLECTION);

    let docs = sanitize_rows(rows)?;
    if docs.is_empty() {
        return Ok(0);
    }

    let ids: Vec<i64> = docs
        .iter()
        .filter_map(|d| d.get_i64("leadId").ok())
        .collect();

    let existing = collection
        .distinct("leadId", doc! { "leadId": { "$in": ids } })
        .await
        .map_err(|e| format!("Database error: {}", e))?;
    let existing: HashSet<i64> = existing.iter().filter_map(|b| b.as_i64()).collect();

    let new_docs: Vec<Document> = docs
        .into_iter()
        .filter(|d| {
            d.get_i64("leadId")
                .map(|id| !existing.contains(&id))
                .unwrap_or(true)
        })
        .collect();

    if new_docs.is_empty() {
        return Ok(0);
    }

    let result = collection
        .insert_many(&new_docs)
        .await
        .map_err(|e| format!("Failed to insert leads: {}", e))?;

    Ok(result.inserted_ids.len() as u64)
}

/// One page of leads matching the filters, plus the total match count.
/// The count is a second query and does not share a snapshot with the page
/// fetch; under concurrent writes the two may disagree.
pub async fn list_leads(
    db: &MongoDB,
    filters: &LeadFilters,
    page: i64,
    limit: i64,
) -> Result<LeadsPage, String> {
    let collection = db.collection::<Document>(COLLECTION);

    let filter = build_filter(filters);
    let skip = (page - 1) * limit;

    let options = mongodb::options::FindOptions::builder()
        .skip(skip as u64)
        .limit(limit)
        .build();

    let mut cursor = collection
        .find(filter.clone())
        .with_options(options)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let mut data = Vec::new();
    use futures::stream::StreamExt;

    while let Some(result) = cursor.next().await {
        match result {
            Ok(mut lead) => {
                lead.remove("_id");
                data.push(Bson::Document(lead).into_relaxed_extjson());
            }
            Err(e) => log::error!("Error reading lead: {}", e),
        }
    }

    let total = collection
        .count_documents(filter)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(LeadsPage {
        page,
        limit,
        total,
        total_pages: total_pages(total, limit),
        data,
    })
}

/// Normalizes incoming rows into storage documents: leadId parsed to an
/// integer, extra fields converted as-is, in-payload repeats dropped.
fn sanitize_rows(rows: &[LeadRow]) -> Result<Vec<Document>, String> {
    let mut seen = HashSet::new();
    let mut docs = Vec::with_capacity(rows.len());

    for row in rows {
        let lead_id = parse_lead_id(&row.lead_id)?;
        if !seen.insert(lead_id) {
            continue;
        }

        let mut lead = Document::new();
        lead.insert("leadId", lead_id);
        for (key, value) in &row.extra {
            let bson = mongodb::bson::to_bson(value)
                .map_err(|e| format!("Invalid value for field '{}': {}", key, e))?;
            lead.insert(key, bson);
        }
        docs.push(lead);
    }

    Ok(docs)
}

fn parse_lead_id(value: &serde_json::Value) -> Result<i64, String> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| format!("leadId out of range: {}", n)),
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .or_else(|_| trimmed.parse::<f64>().map(|f| f as i64))
                .map_err(|_| format!("leadId is not numeric: '{}'", s))
        }
        other => Err(format!(
            "leadId must be a number or numeric string, got {}",
            other
        )),
    }
}

/// Conjunction of all supplied filters. searchQuery becomes a
/// case-insensitive substring match on leadName.
fn build_filter(filters: &LeadFilters) -> Document {
    let mut filter = Document::new();

    if let Some(source) = filters.source.as_deref().filter(|s| !s.is_empty()) {
        filter.insert("source", source);
    }
    if let Some(level) = filters.interest_level.as_deref().filter(|s| !s.is_empty()) {
        filter.insert("interestLevel", level);
    }
    if let Some(status) = filters.status.as_deref().filter(|s| !s.is_empty()) {
        filter.insert("status", status);
    }
    if let Some(query) = filters.search_query.as_deref().filter(|s| !s.is_empty()) {
        filter.insert(
            "leadName",
            doc! { "$regex": escape_regex(query), "$options": "i" },
        );
    }

    filter
}

/// Escapes regex metacharacters so searchQuery matches as a literal
/// substring.
fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '\\' | '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Page/limit query parsing: missing, unparseable, or < 1 falls back to the
/// default. Keeps the totalPages division safe.
pub fn parse_page_param(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

fn total_pages(total: u64, limit: i64) -> u64 {
    let limit = limit.max(1) as u64;
    (total + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(json: &str) -> LeadRow {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parse_lead_id_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_lead_id(&serde_json::json!(5)).unwrap(), 5);
        assert_eq!(parse_lead_id(&serde_json::json!("5")).unwrap(), 5);
        assert_eq!(parse_lead_id(&serde_json::json!(" 42 ")).unwrap(), 42);
        assert_eq!(parse_lead_id(&serde_json::json!(5.9)).unwrap(), 5);
        assert_eq!(parse_lead_id(&serde_json::json!("5.9")).unwrap(), 5);
    }

    #[test]
    fn parse_lead_id_rejects_non_numeric_input() {
        assert!(parse_lead_id(&serde_json::json!("abc")).is_err());
        assert!(parse_lead_id(&serde_json::json!(null)).is_err());
        assert!(parse_lead_id(&serde_json::json!({"id": 5})).is_err());
    }

    #[test]
    fn sanitize_rows_parses_lead_id_and_keeps_extras() {
        let rows = vec![row(r#"{"leadId":"5","leadName":"Ann","source":"web"}"#)];

        let docs = sanitize_rows(&rows).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].get_i64("leadId").unwrap(), 5);
        assert_eq!(docs[0].get_str("leadName").unwrap(), "Ann");
        assert_eq!(docs[0].get_str("source").unwrap(), "web");
    }

    #[test]
    fn sanitize_rows_drops_in_payload_repeats() {
        let rows = vec![
            row(r#"{"leadId":1,"leadName":"Ann"}"#),
            row(r#"{"leadId":"1","leadName":"Ann again"}"#),
            row(r#"{"leadId":2,"leadName":"Bob"}"#),
        ];

        let docs = sanitize_rows(&rows).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].get_str("leadName").unwrap(), "Ann");
        assert_eq!(docs[1].get_str("leadName").unwrap(), "Bob");
    }

    #[test]
    fn sanitize_rows_fails_on_unparseable_lead_id() {
        let rows = vec![row(r#"{"leadId":"not-a-number"}"#)];
        assert!(sanitize_rows(&rows).is_err());
    }

    #[test]
    fn sanitize_rows_fails_on_missing_lead_id() {
        let rows = vec![row(r#"{"leadName":"NoId"}"#)];
        assert!(sanitize_rows(&rows).is_err());
    }

    #[test]
    fn build_filter_is_conjunction_of_supplied_terms() {
        let filters = LeadFilters {
            source: Some("web".into()),
            interest_level: Some("high".into()),
            status: None,
            search_query: None,
        };

        let filter = build_filter(&filters);
        assert_eq!(filter.get_str("source").unwrap(), "web");
        assert_eq!(filter.get_str("interestLevel").unwrap(), "high");
        assert!(!filter.contains_key("status"));
        assert!(!filter.contains_key("leadName"));
    }

    #[test]
    fn build_filter_treats_empty_string_as_all() {
        let filters = LeadFilters {
            source: Some(String::new()),
            interest_level: None,
            status: Some(String::new()),
            search_query: Some(String::new()),
        };

        assert!(build_filter(&filters).is_empty());
    }

    #[test]
    fn build_filter_search_query_is_case_insensitive_substring() {
        let filters = LeadFilters {
            search_query: Some("ann".into()),
            ..Default::default()
        };

        let filter = build_filter(&filters);
        let name = filter.get_document("leadName").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), "ann");
        assert_eq!(name.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn escape_regex_neutralizes_metacharacters() {
        assert_eq!(escape_regex("a.b*c"), "a\\.b\\*c");
        assert_eq!(escape_regex("(ann)"), "\\(ann\\)");
        assert_eq!(escape_regex("plain"), "plain");
    }

    #[test]
    fn parse_page_param_defaults_on_missing_invalid_or_zero() {
        assert_eq!(parse_page_param(None, 1), 1);
        assert_eq!(parse_page_param(Some("abc"), 20), 20);
        assert_eq!(parse_page_param(Some("0"), 20), 20);
        assert_eq!(parse_page_param(Some("-5"), 1), 1);
        assert_eq!(parse_page_param(Some("3"), 1), 3);
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 20), 1);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_insert_skips_duplicates_against_store() {
        dotenv::dotenv().ok();

        let db = crate::database::MongoDB::new("mongodb://localhost:27017/lead_service_test")
            .await
            .unwrap();

        // Clean slate for the fixture ids
        db.collection::<Document>(COLLECTION)
            .delete_many(doc! { "leadId": { "$in": [9001, 9002] } })
            .await
            .unwrap();

        let first = vec![row(r#"{"leadId":9001,"leadName":"Ann"}"#)];
        let again = vec![
            row(r#"{"leadId":9001,"leadName":"Ann"}"#),
            row(r#"{"leadId":9002,"leadName":"Bob"}"#),
        ];

        assert_eq!(insert_leads(&db, &first).await.unwrap(), 1);
        assert_eq!(insert_leads(&db, &again).await.unwrap(), 1);
    }
}
