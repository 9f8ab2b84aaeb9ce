//! Ledger schema:
//!
//! - `categories`: entry classification, unique label
//! - `cost_centers`: optional cost attribution, unique label
//! - `entries`: receivables (positive) and payables (negative), amounts in
//!   cents

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Label,
}

#[derive(Iden)]
enum CostCenters {
    Table,
    Id,
    Label,
}

#[derive(Iden)]
enum Entries {
    Table,
    Id,
    Description,
    CategoryId,
    CostCenterId,
    PaymentMethod,
    DueDate,
    OriginalValue,
    ReceivedValue,
    PaymentDate,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Categories::Label)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CostCenters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CostCenters::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CostCenters::Label)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Entries::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Entries::Description)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::CategoryId).blob().not_null())
                    .col(ColumnDef::new(Entries::CostCenterId).blob())
                    .col(
                        ColumnDef::new(Entries::PaymentMethod)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::DueDate).date().not_null())
                    .col(
                        ColumnDef::new(Entries::OriginalValue)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::ReceivedValue).big_integer())
                    .col(ColumnDef::new(Entries::PaymentDate).date())
                    .col(
                        ColumnDef::new(Entries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Entries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-entries-category_id")
                            .from(Entries::Table, Entries::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-entries-cost_center_id")
                            .from(Entries::Table, Entries::CostCenterId)
                            .to(CostCenters::Table, CostCenters::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-entries-payment_date-description")
                    .table(Entries::Table)
                    .col(Entries::PaymentDate)
                    .col(Entries::Description)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-entries-created_at")
                    .table(Entries::Table)
                    .col(Entries::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Entries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CostCenters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}
