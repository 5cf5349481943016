#[derive(Debug, Clone, Default)]
pub struct CreateClientDto {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub identification_number: Option<String>,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateClientDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub identification_number: Option<String>,
}
