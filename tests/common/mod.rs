#![allow(dead_code)]

use std::sync::Arc;

use acordos_api::{
    config::AppConfig,
    db,
    entities::{agreement, agreement_installment, installment, InstallmentStatus},
    AppState,
};
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseBackend as DbBackend, EntityTrait, PaginatorTrait,
    Set, Statement,
};
use serde_json::Value;
use tower::ServiceExt;

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single connection keeps the in-memory database alive and shared.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg).expect("valid test configuration");
        let router = acordos_api::app(state.clone());

        Self { router, state }
    }

    pub fn db(&self) -> &sea_orm::DatabaseConnection {
        self.state.db.as_ref()
    }

    /// Send a request against the router.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Insert an open installment.
    pub async fn seed_installment(&self, number: i32, principal: Decimal) -> installment::Model {
        installment::ActiveModel {
            installment_number: Set(number),
            principal: Set(principal),
            status: Set(InstallmentStatus::Open),
            amount_paid: Set(None),
            payment_method: Set(None),
            paid_at: Set(None),
            paid_time: Set(None),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed installment for tests")
    }

    /// Insert an installment that is already paid.
    pub async fn seed_paid_installment(
        &self,
        number: i32,
        principal: Decimal,
        paid_at: DateTime<Utc>,
    ) -> installment::Model {
        installment::ActiveModel {
            installment_number: Set(number),
            principal: Set(principal),
            status: Set(InstallmentStatus::Paid),
            amount_paid: Set(Some(principal)),
            payment_method: Set(Some("PIX".to_string())),
            paid_at: Set(Some(paid_at)),
            paid_time: Set(Some(paid_at.format("%H:%M:%S").to_string())),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed paid installment for tests")
    }

    pub async fn agreement_count(&self) -> u64 {
        agreement::Entity::find()
            .count(self.db())
            .await
            .expect("count agreements")
    }

    pub async fn link_count(&self) -> u64 {
        agreement_installment::Entity::find()
            .count(self.db())
            .await
            .expect("count agreement links")
    }

    pub async fn agreement(&self, id: i32) -> agreement::Model {
        agreement::Entity::find_by_id(id)
            .one(self.db())
            .await
            .expect("load agreement")
            .expect("agreement exists")
    }

    pub async fn installment(&self, id: i32) -> installment::Model {
        installment::Entity::find_by_id(id)
            .one(self.db())
            .await
            .expect("load installment")
            .expect("installment exists")
    }

    pub async fn execute_sql(&self, sql: &str) {
        self.db()
            .execute(Statement::from_string(DbBackend::Sqlite, sql.to_string()))
            .await
            .expect("raw sql in tests");
    }
}

/// Reads a response body as JSON.
pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is json")
}

/// Parses a decimal serialized as a JSON string.
pub fn decimal_field(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal serialized as string")
        .parse()
        .expect("valid decimal")
}
