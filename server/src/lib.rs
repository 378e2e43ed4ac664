//! Web front-end for viewing and creating records of one CRM custom object.
//!
//! # Overview
//! `GET /` lists up to 100 records, `GET /update-cobj` shows a creation
//! form and `POST /update-cobj` creates a record and redirects to `/`.
//! Anything else is looked up in the static directory.
//!
//! # Design
//! - All configuration lives in one immutable `Config` shared through
//!   `Arc<AppState>`; every CRM call uses the same credential and object type.
//! - Requests are built and parsed by `cobj-core`; `crm::Crm` only moves
//!   bytes and logs failures.
//! - Pages always render with status 200, CRM failures included.

pub mod config;
pub mod crm;
pub mod handlers;
pub mod views;

use std::sync::Arc;

use axum::{routing::get, Router};
use cobj_core::CrmError;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

use config::Config;
use crm::Crm;

/// Read-only state shared by every request.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub crm: Crm,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, CrmError> {
        let crm = Crm::new(&config)?;
        Ok(Self { config, crm })
    }
}

pub fn app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);
    Router::new()
        .route("/", get(handlers::list_records))
        .route(
            "/update-cobj",
            get(handlers::show_form).post(handlers::submit_form),
        )
        .fallback_service(static_files)
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}
