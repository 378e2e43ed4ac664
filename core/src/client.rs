//! Stateless request builder and response parser for the CRM objects API.
//!
//! # Design
//! `CrmClient` holds the CRM origin and the bearer credential and nothing
//! else. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiErrorBody, CrmError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateRecord, ListRecords, ObjectType, Record};

/// Origin of the public CRM API.
pub const DEFAULT_BASE_URL: &str = "https://api.hubapi.com";

/// Builds authenticated CRM requests and parses CRM responses without
/// touching the network.
#[derive(Clone)]
pub struct CrmClient {
    base_url: String,
    token: String,
}

impl fmt::Debug for CrmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrmClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl CrmClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request for `endpoint` (an API path such as
    /// `/crm/v3/objects/pets`, optionally with a query string). The body is
    /// serialized to JSON and attached only when given.
    pub fn request<T: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&T>,
    ) -> Result<HttpRequest, CrmError> {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| CrmError::Serialization(e.to_string()))?;
        Ok(self.build(method, endpoint, body))
    }

    /// List up to `limit` records of `object_type` with the given properties.
    /// Property names are comma-joined into a single `properties` parameter.
    pub fn build_list_records(
        &self,
        object_type: &ObjectType,
        properties: &[&str],
        limit: u32,
    ) -> HttpRequest {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("properties", &properties.join(","))
            .append_pair("limit", &limit.to_string())
            .finish();
        let endpoint = format!("{}?{query}", object_type.endpoint());
        self.build(HttpMethod::Get, &endpoint, None)
    }

    pub fn build_create_record(
        &self,
        object_type: &ObjectType,
        input: &CreateRecord,
    ) -> Result<HttpRequest, CrmError> {
        self.request(HttpMethod::Post, &object_type.endpoint(), Some(input))
    }

    /// Return the body as untyped JSON, as received. An empty 2xx body is
    /// `Value::Null`. Create answers are read this way; nothing in them is
    /// required.
    pub fn parse_json(&self, response: HttpResponse) -> Result<Value, CrmError> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| CrmError::Deserialization(e.to_string()))
    }

    pub fn parse_list_records(&self, response: HttpResponse) -> Result<Vec<Record>, CrmError> {
        check_status(&response)?;
        let list: ListRecords = serde_json::from_str(&response.body)
            .map_err(|e| CrmError::Deserialization(e.to_string()))?;
        Ok(list.results)
    }

    fn build(&self, method: HttpMethod, endpoint: &str, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{endpoint}", self.base_url),
            headers: vec![
                ("authorization".to_string(), format!("Bearer {}", self.token)),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body,
        }
    }
}

/// Map any non-2xx status to `CrmError::Api`.
fn check_status(response: &HttpResponse) -> Result<(), CrmError> {
    if response.is_success() {
        return Ok(());
    }
    Err(CrmError::Api {
        status: response.status,
        body: ApiErrorBody::from_raw(&response.body),
    })
}
