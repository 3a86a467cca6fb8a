use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, Iterable, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionError, TransactionTrait,
};
use tracing::{info, instrument, warn};

use crate::{
    db::DbPool,
    entities::{
        agreement::{self, AgreementStatus, Entity as Agreement},
        agreement_installment,
        installment::{self, Entity as Installment},
        InstallmentStatus,
    },
    errors::ServiceError,
};

pub const MSG_IDS_REQUIRED: &str = "Informe ao menos uma mensalidade para o acordo.";
pub const MSG_IDS_DUPLICATED: &str = "A lista de mensalidades contém identificadores repetidos.";
pub const MSG_UNAVAILABLE: &str = "Uma ou mais mensalidades não estão disponíveis para acordo.";

/// An agreement together with its linked installments, ordered by installment number.
pub type AgreementWithInstallments = (agreement::Model, Vec<installment::Model>);

/// Data needed to open an agreement over a set of open installments.
#[derive(Debug, Clone)]
pub struct CreateAgreementInput {
    pub installment_ids: Vec<i32>,
    pub due_date: NaiveDate,
    pub description: String,
    pub payment_method: String,
    pub performed_by: String,
}

#[derive(Clone)]
pub struct AgreementService {
    db_pool: Arc<DbPool>,
}

impl AgreementService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Creates an agreement over the given installments.
    ///
    /// Every installment must exist and still be open. The agreement and its
    /// links are written in one transaction; the availability check runs
    /// inside it so a concurrent payment cannot slip in between.
    #[instrument(skip(self, input), fields(installments = input.installment_ids.len()))]
    pub async fn create_agreement(
        &self,
        input: CreateAgreementInput,
    ) -> Result<agreement::Model, ServiceError> {
        if input.installment_ids.is_empty() {
            return Err(ServiceError::ValidationError(MSG_IDS_REQUIRED.to_string()));
        }

        let unique: HashSet<i32> = input.installment_ids.iter().copied().collect();
        if unique.len() != input.installment_ids.len() {
            return Err(ServiceError::ValidationError(MSG_IDS_DUPLICATED.to_string()));
        }

        let db = self.db_pool.as_ref();
        let created = db
            .transaction::<_, agreement::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let mut available = Installment::find()
                        .filter(installment::Column::Id.is_in(input.installment_ids.clone()))
                        .filter(installment::Column::Status.eq(InstallmentStatus::Open));
                    // SQLite serializes writers already and has no FOR UPDATE
                    if txn.get_database_backend() != DbBackend::Sqlite {
                        available = available.lock_exclusive();
                    }
                    let available = available.all(txn).await?;

                    if available.len() != input.installment_ids.len() {
                        warn!(
                            requested = input.installment_ids.len(),
                            available = available.len(),
                            "Installments unavailable for agreement"
                        );
                        return Err(ServiceError::ValidationError(MSG_UNAVAILABLE.to_string()));
                    }

                    let total: Decimal = available.iter().map(|i| i.principal).sum();

                    let created = agreement::ActiveModel {
                        due_date: Set(input.due_date),
                        description: Set(input.description),
                        payment_method: Set(input.payment_method),
                        performed_by: Set(input.performed_by),
                        total: Set(total),
                        status: Set(AgreementStatus::Open),
                        created_at: Set(Utc::now()),
                        completed_at: Set(None),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    let links = input.installment_ids.iter().map(|installment_id| {
                        agreement_installment::ActiveModel {
                            agreement_id: Set(created.id),
                            installment_id: Set(*installment_id),
                        }
                    });
                    agreement_installment::Entity::insert_many(links)
                        .exec_without_returning(txn)
                        .await?;

                    Ok(created)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            agreement_id = created.id,
            total = %created.total,
            "Agreement created"
        );

        Ok(created)
    }

    /// All agreements ordered by id, installments expanded.
    #[instrument(skip(self))]
    pub async fn list_agreements(&self) -> Result<Vec<AgreementWithInstallments>, ServiceError> {
        let rows = Agreement::find()
            .order_by_asc(agreement::Column::Id)
            .find_with_related(Installment)
            .all(self.db_pool.as_ref())
            .await?;

        Ok(sort_installments(rows))
    }

    /// Agreements that reached `Concluído` or `Quebra`, installments expanded.
    #[instrument(skip(self))]
    pub async fn list_finalized(&self) -> Result<Vec<AgreementWithInstallments>, ServiceError> {
        let finalized: Vec<AgreementStatus> = AgreementStatus::iter()
            .filter(|status| status.is_finalized())
            .collect();
        let rows = Agreement::find()
            .filter(agreement::Column::Status.is_in(finalized))
            .order_by_asc(agreement::Column::Id)
            .find_with_related(Installment)
            .all(self.db_pool.as_ref())
            .await?;

        Ok(sort_installments(rows))
    }
}

fn sort_installments(mut rows: Vec<AgreementWithInstallments>) -> Vec<AgreementWithInstallments> {
    for (_, installments) in rows.iter_mut() {
        installments.sort_by_key(|i| (i.installment_number, i.id));
    }
    rows
}
