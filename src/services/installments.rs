use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument};

use crate::{
    db::DbPool,
    entities::{
        agreement::{self, AgreementStatus, Entity as Agreement},
        installment::{self, Entity as Installment},
        InstallmentStatus,
    },
    errors::ServiceError,
    services::agreement_status::{self, PaymentRecord, StatusEvaluation},
};

pub const MSG_ALREADY_PAID: &str = "Mensalidade já está paga.";
pub const MSG_NEGATIVE_AMOUNT: &str = "O valor pago não pode ser negativo.";

/// An installment together with the agreements it belongs to.
pub type InstallmentWithAgreements = (installment::Model, Vec<agreement::Model>);

#[derive(Debug, Clone)]
pub struct PayInstallmentInput {
    pub amount_paid: Decimal,
    pub payment_method: Option<String>,
}

#[derive(Clone)]
pub struct InstallmentService {
    db_pool: Arc<DbPool>,
    business_offset: FixedOffset,
}

impl InstallmentService {
    pub fn new(db_pool: Arc<DbPool>, business_offset: FixedOffset) -> Self {
        Self {
            db_pool,
            business_offset,
        }
    }

    /// Records a payment now and refreshes every agreement containing the installment.
    pub async fn pay_installment(
        &self,
        id: i32,
        input: PayInstallmentInput,
    ) -> Result<installment::Model, ServiceError> {
        self.pay_installment_at(id, input, Utc::now()).await
    }

    /// Same as [`pay_installment`](Self::pay_installment) with an explicit clock.
    #[instrument(skip(self, input), fields(installment_id = id))]
    pub async fn pay_installment_at(
        &self,
        id: i32,
        input: PayInstallmentInput,
        now: DateTime<Utc>,
    ) -> Result<installment::Model, ServiceError> {
        if input.amount_paid < Decimal::ZERO {
            return Err(ServiceError::ValidationError(MSG_NEGATIVE_AMOUNT.to_string()));
        }

        let db = self.db_pool.as_ref();

        let existing = Installment::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Mensalidade {} não encontrada.", id)))?;

        if existing.is_paid() {
            return Err(ServiceError::ValidationError(MSG_ALREADY_PAID.to_string()));
        }

        let paid_time = now
            .with_timezone(&self.business_offset)
            .format("%H:%M:%S")
            .to_string();

        // Only an open installment may be paid; losing the race means someone else paid it
        let result = Installment::update_many()
            .set(installment::ActiveModel {
                status: Set(InstallmentStatus::Paid),
                amount_paid: Set(Some(input.amount_paid)),
                payment_method: Set(input.payment_method),
                paid_at: Set(Some(now)),
                paid_time: Set(Some(paid_time)),
                ..Default::default()
            })
            .filter(installment::Column::Id.eq(id))
            .filter(installment::Column::Status.eq(InstallmentStatus::Open))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::ValidationError(MSG_ALREADY_PAID.to_string()));
        }

        let updated = Installment::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Mensalidade {} não encontrada.", id)))?;

        info!(
            installment_id = id,
            amount_paid = %input.amount_paid,
            "Installment paid"
        );

        self.refresh_agreements(&updated, now).await?;

        Ok(updated)
    }

    /// Re-evaluates every agreement linked to `paid` and persists status changes.
    ///
    /// Each agreement is updated on its own; a failure leaves earlier updates in place.
    pub async fn refresh_agreements(
        &self,
        paid: &installment::Model,
        now: DateTime<Utc>,
    ) -> Result<Vec<StatusEvaluation>, ServiceError> {
        let db = self.db_pool.as_ref();
        let agreements = paid
            .find_related(Agreement)
            .order_by_asc(agreement::Column::Id)
            .all(db)
            .await?;

        if agreements.is_empty() {
            debug!(installment_id = paid.id, "Installment belongs to no agreement");
        }

        let mut evaluations = Vec::with_capacity(agreements.len());
        for current in agreements {
            let linked = current.find_related(Installment).all(db).await?;
            let records: Vec<PaymentRecord> = linked.iter().map(PaymentRecord::from).collect();

            let evaluation = agreement_status::evaluate(
                current.status,
                current.due_date,
                &records,
                self.business_offset,
                now,
            );

            if evaluation.is_overdue {
                info!(
                    agreement_id = current.id,
                    paid = evaluation.paid_count,
                    total = evaluation.installment_count,
                    "Agreement past due date with open installments"
                );
            }

            if evaluation.changed() {
                let agreement_id = current.id;
                let mut active: agreement::ActiveModel = current.into();
                active.status = Set(evaluation.status);
                active.completed_at = Set(match evaluation.status {
                    AgreementStatus::Completed => Some(now),
                    _ => None,
                });
                active.update(db).await?;

                info!(
                    agreement_id,
                    from = %evaluation.previous,
                    to = %evaluation.status,
                    "Agreement status changed"
                );
            }

            evaluations.push(evaluation);
        }

        Ok(evaluations)
    }

    /// Installments still open, ordered by installment number.
    #[instrument(skip(self))]
    pub async fn list_open(&self) -> Result<Vec<installment::Model>, ServiceError> {
        let rows = Installment::find()
            .filter(installment::Column::Status.eq(InstallmentStatus::Open))
            .order_by_asc(installment::Column::InstallmentNumber)
            .order_by_asc(installment::Column::Id)
            .all(self.db_pool.as_ref())
            .await?;

        Ok(rows)
    }

    /// Every installment ordered by installment number, with its agreements.
    #[instrument(skip(self))]
    pub async fn list_all_with_agreements(
        &self,
    ) -> Result<Vec<InstallmentWithAgreements>, ServiceError> {
        let mut rows = Installment::find()
            .find_with_related(Agreement)
            .all(self.db_pool.as_ref())
            .await?;

        rows.sort_by_key(|(i, _)| (i.installment_number, i.id));
        for (_, agreements) in rows.iter_mut() {
            agreements.sort_by_key(|a| a.id);
        }

        Ok(rows)
    }
}
