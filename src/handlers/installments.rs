use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::Response,
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::agreements::AgreementResponse;
use super::common::success_response;
use crate::{
    entities::installment,
    errors::ServiceError,
    services::installments::{InstallmentWithAgreements, PayInstallmentInput},
    AppState,
};

const MSG_AMOUNT_REQUIRED: &str = "Informe o valor pago.";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id_mensalidade": 12,
    "parcela": 3,
    "valor_principal": "150.00",
    "status": "P",
    "valor_pago": "150.00",
    "form_pagto": "PIX",
    "data_pgto": "2024-01-09T13:00:00Z",
    "hora_pgto": "10:00:00"
}))]
pub struct InstallmentResponse {
    pub id_mensalidade: i32,
    pub parcela: i32,
    #[schema(value_type = String)]
    pub valor_principal: Decimal,
    /// `A` open, `P` paid
    pub status: String,
    #[schema(value_type = Option<String>)]
    pub valor_pago: Option<Decimal>,
    pub form_pagto: Option<String>,
    pub data_pgto: Option<DateTime<Utc>>,
    /// 24-hour local time of payment
    pub hora_pgto: Option<String>,
}

impl From<installment::Model> for InstallmentResponse {
    fn from(model: installment::Model) -> Self {
        Self {
            id_mensalidade: model.id,
            parcela: model.installment_number,
            valor_principal: model.principal,
            status: model.status.as_str().to_string(),
            valor_pago: model.amount_paid,
            form_pagto: model.payment_method,
            data_pgto: model.paid_at,
            hora_pgto: model.paid_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InstallmentWithAgreementsResponse {
    #[serde(flatten)]
    pub mensalidade: InstallmentResponse,
    pub acordos: Vec<AgreementResponse>,
}

impl From<InstallmentWithAgreements> for InstallmentWithAgreementsResponse {
    fn from((installment, agreements): InstallmentWithAgreements) -> Self {
        Self {
            mensalidade: installment.into(),
            acordos: agreements.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({ "valor_pago": "150.00", "form_pagto": "PIX" }))]
pub struct PayInstallmentRequest {
    /// Amount actually paid; must not be negative
    #[schema(value_type = String)]
    pub valor_pago: Option<Decimal>,
    pub form_pagto: Option<String>,
}

pub fn installment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_installments))
        .route("/disponiveis", get(list_available_installments))
        .route("/:id/pagar", patch(pay_installment))
}

/// List every installment with the agreements it belongs to
#[utoipa::path(
    get,
    path = "/mensalidades",
    responses(
        (status = 200, description = "Installments ordered by parcela", body = [InstallmentWithAgreementsResponse]),
        (status = 500, description = "Persistence failure", body = crate::errors::ErrorResponse)
    ),
    tag = "mensalidades"
)]
pub async fn list_installments(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let rows = state.installment_service().list_all_with_agreements().await?;
    let body: Vec<InstallmentWithAgreementsResponse> = rows.into_iter().map(Into::into).collect();
    Ok(success_response(body))
}

/// List open installments
#[utoipa::path(
    get,
    path = "/mensalidades/disponiveis",
    responses(
        (status = 200, description = "Installments with status A", body = [InstallmentResponse]),
        (status = 500, description = "Persistence failure", body = crate::errors::ErrorResponse)
    ),
    tag = "mensalidades"
)]
pub async fn list_available_installments(
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let rows = state.installment_service().list_open().await?;
    let body: Vec<InstallmentResponse> = rows.into_iter().map(Into::into).collect();
    Ok(success_response(body))
}

/// Record payment of an installment and refresh its agreements
#[utoipa::path(
    patch,
    path = "/mensalidades/{id}/pagar",
    params(
        ("id" = i32, Path, description = "Installment id")
    ),
    request_body = PayInstallmentRequest,
    responses(
        (status = 200, description = "Installment paid", body = InstallmentResponse),
        (status = 400, description = "Invalid id, invalid body or already paid", body = crate::errors::ErrorResponse),
        (status = 404, description = "Installment not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Persistence failure", body = crate::errors::ErrorResponse)
    ),
    tag = "mensalidades"
)]
pub async fn pay_installment(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<PayInstallmentRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let Path(id) = id?;
    let Json(payload) = payload?;

    let amount_paid = payload
        .valor_pago
        .ok_or_else(|| ServiceError::ValidationError(MSG_AMOUNT_REQUIRED.to_string()))?;

    let updated = state
        .installment_service()
        .pay_installment(
            id,
            PayInstallmentInput {
                amount_paid,
                payment_method: payload.form_pagto,
            },
        )
        .await?;

    Ok(success_response(InstallmentResponse::from(updated)))
}
