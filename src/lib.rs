//! Acordos API Library
//!
//! Installments ("mensalidades") and the payment agreements ("acordos") that
//! bundle them. Paying an installment re-evaluates every agreement it
//! belongs to; see [`services::agreement_status`] for the rules.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod telemetry;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Text served at `/`.
pub const BANNER: &str = "API do Desafio AFAP no ar!";

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Builds the services over `db` using the configured business offset.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
    ) -> Result<Self, config::AppConfigError> {
        let offset = config.business_offset()?;
        let services = handlers::AppServices::new(db.clone(), offset);
        Ok(Self {
            db,
            config,
            services,
        })
    }

    pub fn agreement_service(&self) -> Arc<services::AgreementService> {
        self.services.agreements.clone()
    }

    pub fn installment_service(&self) -> Arc<services::InstallmentService> {
        self.services.installments.clone()
    }
}

/// Business routes, without middleware.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { BANNER }))
        .route("/health", get(handlers::health::health_check))
        .nest("/acordos", handlers::agreements::agreement_routes())
        .nest("/mensalidades", handlers::installments::installment_routes())
}

/// Complete application: routes, Swagger UI, HTTP tracing and request ids.
pub fn app(state: AppState) -> Router {
    Router::<AppState>::new()
        .merge(api_routes())
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(telemetry::configure_http_tracing())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}
