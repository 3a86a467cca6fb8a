use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment state of a single installment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum InstallmentStatus {
    #[sea_orm(string_value = "A")]
    #[serde(rename = "A")]
    Open,
    #[sea_orm(string_value = "P")]
    #[serde(rename = "P")]
    Paid,
}

impl InstallmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InstallmentStatus::Open => "A",
            InstallmentStatus::Paid => "P",
        }
    }
}

/// The `installments` table ("mensalidades").
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "installments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Ordering index ("parcela").
    pub installment_number: i32,
    pub principal: Decimal,
    pub status: InstallmentStatus,
    pub amount_paid: Option<Decimal>,
    pub payment_method: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    /// 24-hour `HH:MM:SS` in the business time zone.
    pub paid_time: Option<String>,
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

impl Related<super::agreement::Entity> for Entity {
    fn to() -> RelationDef {
        super::agreement_installment::Relation::Agreement.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::agreement_installment::Relation::Installment.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paid
    }
}
