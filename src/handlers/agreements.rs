use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::common::{created_response, deserialize_calendar_date, success_response, validate_input};
use super::installments::InstallmentResponse;
use crate::{
    entities::agreement,
    errors::ServiceError,
    services::agreements::{AgreementWithInstallments, CreateAgreementInput, MSG_IDS_REQUIRED},
    AppState,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "mensalidadesIds": [1, 2],
    "data_prevista": "2024-01-10",
    "descricao": "Acordo de débitos de 2023",
    "metodo_pag": "PIX",
    "realizado_por": "atendente.maria"
}))]
pub struct CreateAgreementRequest {
    /// Installments to bundle; all must be open
    #[serde(rename = "mensalidadesIds")]
    pub mensalidades_ids: Option<Vec<i32>>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    #[serde(deserialize_with = "deserialize_calendar_date")]
    #[schema(value_type = String, format = Date, example = "2024-01-10")]
    pub data_prevista: NaiveDate,
    #[validate(length(min = 1, message = "descricao é obrigatória"))]
    pub descricao: String,
    #[validate(length(min = 1, message = "metodo_pag é obrigatório"))]
    pub metodo_pag: String,
    #[validate(length(min = 1, message = "realizado_por é obrigatório"))]
    pub realizado_por: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id_acordo": 7,
    "data_prevista": "2024-01-10",
    "descricao": "Acordo de débitos de 2023",
    "metodo_pag": "PIX",
    "realizado_por": "atendente.maria",
    "total_acordo": "300.00",
    "status": "Aberto",
    "dt_criacao": "2024-01-02T13:45:00Z",
    "dt_pgto": null
}))]
pub struct AgreementResponse {
    pub id_acordo: i32,
    #[schema(value_type = String, format = Date)]
    pub data_prevista: NaiveDate,
    pub descricao: String,
    pub metodo_pag: String,
    pub realizado_por: String,
    /// Sum of linked principals at creation
    #[schema(value_type = String)]
    pub total_acordo: Decimal,
    /// `Aberto`, `Concluído` or `Quebra`
    pub status: String,
    pub dt_criacao: DateTime<Utc>,
    /// Set when the agreement is `Concluído`
    pub dt_pgto: Option<DateTime<Utc>>,
}

impl From<agreement::Model> for AgreementResponse {
    fn from(model: agreement::Model) -> Self {
        Self {
            id_acordo: model.id,
            data_prevista: model.due_date,
            descricao: model.description,
            metodo_pag: model.payment_method,
            realizado_por: model.performed_by,
            total_acordo: model.total,
            status: model.status.as_str().to_string(),
            dt_criacao: model.created_at,
            dt_pgto: model.completed_at,
        }
    }
}

/// Agreement with its installments expanded.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AgreementWithInstallmentsResponse {
    #[serde(flatten)]
    pub acordo: AgreementResponse,
    pub mensalidades: Vec<InstallmentResponse>,
}

impl From<AgreementWithInstallments> for AgreementWithInstallmentsResponse {
    fn from((agreement, installments): AgreementWithInstallments) -> Self {
        Self {
            acordo: agreement.into(),
            mensalidades: installments.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn agreement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_agreements).post(create_agreement))
        .route("/finalizados", get(list_finalized_agreements))
}

/// Bundle open installments into a new agreement
#[utoipa::path(
    post,
    path = "/acordos",
    request_body = CreateAgreementRequest,
    responses(
        (status = 201, description = "Agreement created", body = AgreementResponse),
        (status = 400, description = "Invalid request or unavailable installments", body = crate::errors::ErrorResponse),
        (status = 500, description = "Persistence failure", body = crate::errors::ErrorResponse)
    ),
    tag = "acordos"
)]
pub async fn create_agreement(
    State(state): State<AppState>,
    payload: Result<Json<CreateAgreementRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let Json(payload) = payload?;

    let installment_ids = match payload.mensalidades_ids {
        Some(ref ids) if !ids.is_empty() => ids.clone(),
        _ => return Err(ServiceError::ValidationError(MSG_IDS_REQUIRED.to_string())),
    };
    validate_input(&payload)?;

    let created = state
        .agreement_service()
        .create_agreement(CreateAgreementInput {
            installment_ids,
            due_date: payload.data_prevista,
            description: payload.descricao,
            payment_method: payload.metodo_pag,
            performed_by: payload.realizado_por,
        })
        .await?;

    Ok(created_response(AgreementResponse::from(created)))
}

/// List every agreement with its installments
#[utoipa::path(
    get,
    path = "/acordos",
    responses(
        (status = 200, description = "Agreements ordered by id", body = [AgreementWithInstallmentsResponse]),
        (status = 500, description = "Persistence failure", body = crate::errors::ErrorResponse)
    ),
    tag = "acordos"
)]
pub async fn list_agreements(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let rows = state.agreement_service().list_agreements().await?;
    let body: Vec<AgreementWithInstallmentsResponse> = rows.into_iter().map(Into::into).collect();
    Ok(success_response(body))
}

/// List completed and broken agreements
#[utoipa::path(
    get,
    path = "/acordos/finalizados",
    responses(
        (status = 200, description = "Agreements with status Concluído or Quebra", body = [AgreementWithInstallmentsResponse]),
        (status = 500, description = "Persistence failure", body = crate::errors::ErrorResponse)
    ),
    tag = "acordos"
)]
pub async fn list_finalized_agreements(
    State(state): State<AppState>,
) -> Result<Response, ServiceError> {
    let rows = state.agreement_service().list_finalized().await?;
    let body: Vec<AgreementWithInstallmentsResponse> = rows.into_iter().map(Into::into).collect();
    Ok(success_response(body))
}
