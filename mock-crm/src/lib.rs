//! In-memory stand-in for the CRM v3 objects API.
//!
//! Serves `GET` and `POST /crm/v3/objects/{object_type}` with bearer-token
//! checks, property projection, `limit` validation and offset paging. The
//! types here are defined independently of `cobj-core` so integration tests
//! catch schema drift between the two.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

/// Page size when the caller sends no `limit`.
pub const DEFAULT_LIMIT: usize = 10;
/// Largest accepted `limit`.
pub const MAX_LIMIT: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub properties: BTreeMap<String, Option<String>>,
    pub archived: bool,
}

#[derive(Deserialize)]
pub struct CreateInput {
    pub properties: BTreeMap<String, String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub properties: Option<String>,
    pub limit: Option<usize>,
    pub after: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<String, Vec<StoredRecord>>>>;

#[derive(Clone)]
struct MockCrm {
    token: Arc<str>,
    db: Db,
    next_id: Arc<AtomicU64>,
}

/// Build the router. Requests must carry `Authorization: Bearer <token>`.
pub fn app(token: &str) -> Router {
    let state = MockCrm {
        token: Arc::from(token),
        db: Arc::new(RwLock::new(HashMap::new())),
        next_id: Arc::new(AtomicU64::new(1)),
    };
    Router::new()
        .route(
            "/crm/v3/objects/{object_type}",
            get(list_records).post(create_record),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

async fn list_records(
    State(crm): State<MockCrm>,
    Path(object_type): Path<String>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response {
    if let Err(rejection) = authorize(&crm, &headers) {
        return rejection;
    }

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit > MAX_LIMIT {
        return error_response(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            &format!("limit may not exceed {MAX_LIMIT}"),
        );
    }
    let start = match query.after.as_deref().map(str::parse::<usize>) {
        None => 0,
        Some(Ok(offset)) => offset,
        Some(Err(_)) => {
            return error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "invalid paging cursor")
        }
    };
    let requested: Option<Vec<&str>> = query.properties.as_deref().map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    });

    let db = crm.db.read().await;
    let all = db.get(&object_type).map(Vec::as_slice).unwrap_or(&[]);
    let results: Vec<StoredRecord> = all
        .iter()
        .skip(start)
        .take(limit)
        .map(|record| project(record, requested.as_deref()))
        .collect();

    let mut body = json!({ "results": results });
    let next = start.saturating_add(limit);
    if next < all.len() {
        body["paging"] = json!({ "next": { "after": next.to_string() } });
    }
    Json(body).into_response()
}

async fn create_record(
    State(crm): State<MockCrm>,
    Path(object_type): Path<String>,
    headers: HeaderMap,
    Json(input): Json<CreateInput>,
) -> Response {
    if let Err(rejection) = authorize(&crm, &headers) {
        return rejection;
    }

    let record = StoredRecord {
        id: crm.next_id.fetch_add(1, Ordering::Relaxed).to_string(),
        properties: input
            .properties
            .into_iter()
            .map(|(name, value)| (name, Some(value)))
            .collect(),
        archived: false,
    };
    debug!(%object_type, id = %record.id, "record created");
    crm.db
        .write()
        .await
        .entry(object_type)
        .or_default()
        .push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

/// Keep only the requested properties; requested names without a value come
/// back as `null`. No selection returns every stored property.
fn project(record: &StoredRecord, requested: Option<&[&str]>) -> StoredRecord {
    let Some(names) = requested else {
        return record.clone();
    };
    let properties = names
        .iter()
        .map(|name| (name.to_string(), record.properties.get(*name).cloned().flatten()))
        .collect();
    StoredRecord {
        properties,
        ..record.clone()
    }
}

fn authorize(crm: &MockCrm, headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {}", crm.token);
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if !crm.token.is_empty() && presented == Some(expected.as_str()) {
        return Ok(());
    }
    Err(error_response(
        StatusCode::UNAUTHORIZED,
        "INVALID_AUTHENTICATION",
        "Authentication credentials not found.",
    ))
}

fn error_response(status: StatusCode, category: &str, message: &str) -> Response {
    let body = json!({
        "status": "error",
        "message": message,
        "correlationId": Uuid::new_v4(),
        "category": category,
    });
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StoredRecord {
        StoredRecord {
            id: "1".to_string(),
            properties: BTreeMap::from([
                ("name".to_string(), Some("Rex".to_string())),
                ("movie".to_string(), Some("Up".to_string())),
            ]),
            archived: false,
        }
    }

    #[test]
    fn stored_record_serializes_to_json() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["properties"]["name"], "Rex");
        assert_eq!(json["archived"], false);
    }

    #[test]
    fn create_input_rejects_missing_properties() {
        let result: Result<CreateInput, _> = serde_json::from_str(r#"{"name":"Rex"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn create_input_accepts_empty_properties() {
        let input: CreateInput = serde_json::from_str(r#"{"properties":{}}"#).unwrap();
        assert!(input.properties.is_empty());
    }

    #[test]
    fn project_fills_missing_properties_with_null() {
        let projected = project(&record(), Some(&["name", "actor"][..]));
        assert_eq!(projected.properties.len(), 2);
        assert_eq!(projected.properties["name"].as_deref(), Some("Rex"));
        assert_eq!(projected.properties["actor"], None);
    }

    #[test]
    fn project_without_selection_keeps_everything() {
        assert_eq!(project(&record(), None), record());
    }
}
