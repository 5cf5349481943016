//! Client (pet owner) domain entity

use chrono::{DateTime, Utc};

/// Pet owner contact record
#[derive(Clone, Debug)]
pub struct Client {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub identification_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Client with the number of pets registered to them
#[derive(Clone, Debug)]
pub struct ClientSummary {
    pub client: Client,
    pub pet_count: u64,
    pub active_pet_count: u64,
}
