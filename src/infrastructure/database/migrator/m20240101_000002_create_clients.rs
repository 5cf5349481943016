//! Create clients table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clients::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clients::FirstName).string_len(50).not_null())
                    .col(ColumnDef::new(Clients::LastName).string_len(50).not_null())
                    // NULLs never collide, so owners without e-mail are fine
                    .col(ColumnDef::new(Clients::Email).string_len(100).unique_key())
                    .col(ColumnDef::new(Clients::Phone).string_len(20))
                    .col(ColumnDef::new(Clients::Address).text())
                    .col(
                        ColumnDef::new(Clients::IdentificationNumber)
                            .string_len(20)
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Clients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Clients::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clients_last_name")
                    .table(Clients::Table)
                    .col(Clients::LastName)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Clients {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    IdentificationNumber,
    CreatedAt,
    UpdatedAt,
}
