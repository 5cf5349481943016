//! Create pets table
//!
//! Pets are removed explicitly before their owner, so the owner FK
//! restricts deletes instead of cascading.

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_clients::Clients;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pets::Name).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Pets::Species)
                            .string_len(20)
                            .not_null()
                            .default("other"),
                    )
                    .col(ColumnDef::new(Pets::Breed).string_len(50))
                    .col(ColumnDef::new(Pets::BirthDate).date())
                    .col(
                        ColumnDef::new(Pets::Gender)
                            .string_len(20)
                            .not_null()
                            .default("unknown"),
                    )
                    .col(ColumnDef::new(Pets::Color).string_len(30))
                    .col(ColumnDef::new(Pets::Weight).double())
                    .col(ColumnDef::new(Pets::MicrochipNumber).string_len(20).unique_key())
                    .col(ColumnDef::new(Pets::ClientId).integer().not_null())
                    .col(
                        ColumnDef::new(Pets::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Pets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Pets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pets_client")
                            .from(Pets::Table, Pets::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pets_species")
                    .table(Pets::Table)
                    .col(Pets::Species)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pets_client_active")
                    .table(Pets::Table)
                    .col(Pets::ClientId)
                    .col(Pets::IsActive)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Pets {
    Table,
    Id,
    Name,
    Species,
    Breed,
    BirthDate,
    Gender,
    Color,
    Weight,
    MicrochipNumber,
    ClientId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
