//! Request core for a CRM custom-object front-end.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the CRM
//! v3 objects API without touching the network (host-does-IO pattern). The
//! caller executes the actual HTTP round-trip.
//!
//! # Design
//! - `CrmClient` holds only the CRM origin and the bearer credential; every
//!   request it builds carries the same credential.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Responses are decoded into typed DTOs at this boundary; the untyped
//!   `parse_json` stays available for ad-hoc endpoints.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::{CrmClient, DEFAULT_BASE_URL};
pub use error::{ApiErrorBody, CrmError, CrmErrorBody};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateRecord, ListRecords, ObjectType, Record, PAGE_LIMIT, PROPERTY_SET};
