//! Route handlers for the record list and the record creation form.
//!
//! A CRM failure never becomes an HTTP error: both pages render normally
//! with a fixed message instead.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use cobj_core::CreateRecord;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::views::{HomePage, UpdateForm, FORM_TITLE, HOME_TITLE};
use crate::AppState;

pub const LIST_ERROR: &str =
    "Failed to load records. Please check your API key and custom object type.";
pub const CREATE_ERROR: &str =
    "Failed to create record. Please check your form data and try again.";

/// Fields read from the creation form. Other submitted keys are ignored.
#[derive(Debug, Default)]
pub struct FormSubmission {
    pub name: Option<String>,
    pub movie: Option<String>,
    pub actor: Option<String>,
}

impl FormSubmission {
    /// Read a submission from a raw request body.
    ///
    /// urlencoded bodies keep the first value of a repeated key. JSON object
    /// bodies contribute their string fields. Anything else, including a body
    /// that does not parse, is an empty submission.
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> Self {
        let mime = content_type
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase());
        match mime.as_deref() {
            Some("application/x-www-form-urlencoded") => Self::from_pairs(body),
            Some("application/json") => Self::from_json(body),
            _ => Self::default(),
        }
    }

    fn from_pairs(body: &[u8]) -> Self {
        let mut form = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            let slot = match key.as_ref() {
                "name" => &mut form.name,
                "movie" => &mut form.movie,
                "actor" => &mut form.actor,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.into_owned());
        }
        form
    }

    fn from_json(body: &[u8]) -> Self {
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            debug!("submission body is not a JSON object");
            return Self::default();
        };
        let field = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            name: field("name"),
            movie: field("movie"),
            actor: field("actor"),
        }
    }

    /// Copy every present, non-empty field verbatim into a create payload.
    pub fn into_payload(self) -> CreateRecord {
        [("name", self.name), ("movie", self.movie), ("actor", self.actor)]
            .into_iter()
            .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
            .fold(CreateRecord::new(), |payload, (key, value)| {
                payload.with_property(key, value)
            })
    }
}

/// Load the list page model. On failure the page carries no records and the
/// fixed load error.
pub async fn load_home_page(state: &AppState) -> HomePage {
    let object_type = &state.config.object_type;
    let (records, error) = match state.crm.list_records(object_type).await {
        Ok(records) => (records, None),
        Err(err) => {
            warn!(%object_type, error = %err, "error fetching records");
            (Vec::new(), Some(LIST_ERROR))
        }
    };
    HomePage {
        title: HOME_TITLE,
        records,
        object_type: object_type.clone(),
        error,
    }
}

/// `GET /`
pub async fn list_records(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(load_home_page(&state).await.render())
}

/// `GET /update-cobj`
pub async fn show_form() -> Html<String> {
    Html(
        UpdateForm {
            title: FORM_TITLE,
            error: None,
        }
        .render(),
    )
}

/// `POST /update-cobj`. Never answers 4xx: an unreadable body is submitted
/// as an empty record and the CRM decides.
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let payload = FormSubmission::from_body(content_type, &body).into_payload();
    let object_type = &state.config.object_type;
    match state.crm.create_record(object_type, &payload).await {
        Ok(_) => {
            info!(%object_type, fields = payload.properties.len(), "record created");
            (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
        }
        Err(err) => {
            warn!(%object_type, error = %err, "error creating record");
            Html(
                UpdateForm {
                    title: FORM_TITLE,
                    error: Some(CREATE_ERROR),
                }
                .render(),
            )
            .into_response()
        }
    }
}
