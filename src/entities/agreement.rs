use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of an agreement ("acordo").
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AgreementStatus {
    #[sea_orm(string_value = "Aberto")]
    #[serde(rename = "Aberto")]
    Open,
    #[sea_orm(string_value = "Concluído")]
    #[serde(rename = "Concluído")]
    Completed,
    /// At least one installment was paid after the due date.
    #[sea_orm(string_value = "Quebra")]
    #[serde(rename = "Quebra")]
    Broken,
}

impl AgreementStatus {
    /// Completed and broken agreements are final.
    pub fn is_finalized(self) -> bool {
        matches!(self, AgreementStatus::Completed | AgreementStatus::Broken)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgreementStatus::Open => "Aberto",
            AgreementStatus::Completed => "Concluído",
            AgreementStatus::Broken => "Quebra",
        }
    }
}

impl fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `agreements` table ("acordos").
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "agreements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Expected due date; payments are on time through the whole day.
    pub due_date: NaiveDate,
    pub description: String,
    pub payment_method: String,
    pub performed_by: String,
    /// Sum of the linked installments' principal at creation time.
    pub total: Decimal,
    pub status: AgreementStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::agreement_installment::Entity")]
    AgreementInstallments,
}

impl Related<super::agreement_installment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AgreementInstallments.def()
    }
}

impl Related<super::installment::Entity> for Entity {
    fn to() -> RelationDef {
        super::agreement_installment::Relation::Installment.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::agreement_installment::Relation::Agreement.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
