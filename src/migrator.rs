use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_installments_table::Migration),
            Box::new(m20240101_000002_create_agreements_table::Migration),
            Box::new(m20240101_000003_create_agreement_installments_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_installments_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_installments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Aligned with entities::installment Model
            manager
                .create_table(
                    Table::create()
                        .table(Installments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Installments::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Installments::InstallmentNumber)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Installments::Principal)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Installments::Status)
                                .string_len(1)
                                .not_null()
                                .default("A"),
                        )
                        .col(ColumnDef::new(Installments::AmountPaid).decimal_len(16, 2).null())
                        .col(ColumnDef::new(Installments::PaymentMethod).string().null())
                        .col(
                            ColumnDef::new(Installments::PaidAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Installments::PaidTime).string_len(8).null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_installments_status")
                        .table(Installments::Table)
                        .col(Installments::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_installments_installment_number")
                        .table(Installments::Table)
                        .col(Installments::InstallmentNumber)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Installments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Installments {
        Table,
        Id,
        InstallmentNumber,
        Principal,
        Status,
        AmountPaid,
        PaymentMethod,
        PaidAt,
        PaidTime,
    }
}

mod m20240101_000002_create_agreements_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_agreements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Aligned with entities::agreement Model
            manager
                .create_table(
                    Table::create()
                        .table(Agreements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Agreements::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Agreements::DueDate).date().not_null())
                        .col(ColumnDef::new(Agreements::Description).string().not_null())
                        .col(ColumnDef::new(Agreements::PaymentMethod).string().not_null())
                        .col(ColumnDef::new(Agreements::PerformedBy).string().not_null())
                        .col(ColumnDef::new(Agreements::Total).decimal_len(16, 2).not_null())
                        .col(
                            ColumnDef::new(Agreements::Status)
                                .string_len(16)
                                .not_null()
                                .default("Aberto"),
                        )
                        .col(
                            ColumnDef::new(Agreements::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Agreements::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_agreements_status")
                        .table(Agreements::Table)
                        .col(Agreements::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Agreements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Agreements {
        Table,
        Id,
        DueDate,
        Description,
        PaymentMethod,
        PerformedBy,
        Total,
        Status,
        CreatedAt,
        CompletedAt,
    }
}

mod m20240101_000003_create_agreement_installments_table {

    use super::m20240101_000001_create_installments_table::Installments;
    use super::m20240101_000002_create_agreements_table::Agreements;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_agreement_installments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AgreementInstallments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AgreementInstallments::AgreementId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AgreementInstallments::InstallmentId)
                                .integer()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(AgreementInstallments::AgreementId)
                                .col(AgreementInstallments::InstallmentId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_agreement_installments_agreement_id")
                                .from(
                                    AgreementInstallments::Table,
                                    AgreementInstallments::AgreementId,
                                )
                                .to(Agreements::Table, Agreements::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_agreement_installments_installment_id")
                                .from(
                                    AgreementInstallments::Table,
                                    AgreementInstallments::InstallmentId,
                                )
                                .to(Installments::Table, Installments::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            // Lookup of "agreements containing this installment" on payment
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_agreement_installments_installment_id")
                        .table(AgreementInstallments::Table)
                        .col(AgreementInstallments::InstallmentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AgreementInstallments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum AgreementInstallments {
        Table,
        AgreementId,
        InstallmentId,
    }
}
