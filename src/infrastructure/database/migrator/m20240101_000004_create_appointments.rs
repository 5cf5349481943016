//! Create appointments table

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users::Users;
use super::m20240101_000003_create_pets::Pets;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appointments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Appointments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Appointments::PetId).integer().not_null())
                    .col(ColumnDef::new(Appointments::VeterinarianId).integer())
                    .col(ColumnDef::new(Appointments::CreatedBy).integer())
                    .col(
                        ColumnDef::new(Appointments::AppointmentDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::DurationMinutes)
                            .integer()
                            .not_null()
                            .default(30),
                    )
                    .col(
                        ColumnDef::new(Appointments::AppointmentType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::Status)
                            .string_len(20)
                            .not_null()
                            .default("scheduled"),
                    )
                    .col(ColumnDef::new(Appointments::Reason).text())
                    .col(ColumnDef::new(Appointments::Notes).text())
                    .col(
                        ColumnDef::new(Appointments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_pet")
                            .from(Appointments::Table, Appointments::PetId)
                            .to(Pets::Table, Pets::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_veterinarian")
                            .from(Appointments::Table, Appointments::VeterinarianId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_creator")
                            .from(Appointments::Table, Appointments::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_pet")
                    .table(Appointments::Table)
                    .col(Appointments::PetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_date_status")
                    .table(Appointments::Table)
                    .col(Appointments::AppointmentDate)
                    .col(Appointments::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_vet_date")
                    .table(Appointments::Table)
                    .col(Appointments::VeterinarianId)
                    .col(Appointments::AppointmentDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Appointments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Appointments {
    Table,
    Id,
    PetId,
    VeterinarianId,
    CreatedBy,
    AppointmentDate,
    DurationMinutes,
    AppointmentType,
    Status,
    Reason,
    Notes,
    CreatedAt,
    UpdatedAt,
}
