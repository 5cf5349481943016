//! Pet entity

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// dog, cat, bird, rabbit, hamster, other
    pub species: String,
    #[sea_orm(nullable)]
    pub breed: Option<String>,
    #[sea_orm(nullable)]
    pub birth_date: Option<NaiveDate>,
    /// male, female, unknown
    pub gender: String,
    #[sea_orm(nullable)]
    pub color: Option<String>,
    /// Kilograms
    #[sea_orm(nullable)]
    pub weight: Option<f64>,
    #[sea_orm(unique, nullable)]
    pub microchip_number: Option<String>,
    pub client_id: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::appointment::Entity")]
    Appointments,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::appointment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
