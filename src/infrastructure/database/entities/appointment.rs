//! Appointment entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub pet_id: i32,
    #[sea_orm(nullable)]
    pub veterinarian_id: Option<i32>,
    #[sea_orm(nullable)]
    pub created_by: Option<i32>,
    pub appointment_date: DateTime<Utc>,
    pub duration_minutes: i32,
    /// consultation, vaccination, surgery, emergency, follow_up, grooming
    pub appointment_type: String,
    /// scheduled, confirmed, in_progress, completed, cancelled, no_show
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pet::Entity",
        from = "Column::PetId",
        to = "super::pet::Column::Id"
    )]
    Pet,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::VeterinarianId",
        to = "super::user::Column::Id"
    )]
    Veterinarian,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    Creator,
}

impl Related<super::pet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
