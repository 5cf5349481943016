//! Pet domain entity

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::domain::client::Client;
use crate::shared::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetSpecies {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Hamster,
    Other,
}

impl PetSpecies {
    pub const ALL: [PetSpecies; 6] = [
        PetSpecies::Dog,
        PetSpecies::Cat,
        PetSpecies::Bird,
        PetSpecies::Rabbit,
        PetSpecies::Hamster,
        PetSpecies::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dog => "dog",
            Self::Cat => "cat",
            Self::Bird => "bird",
            Self::Rabbit => "rabbit",
            Self::Hamster => "hamster",
            Self::Other => "other",
        }
    }

    /// Capitalized label, e.g. `Dog`
    pub fn label(&self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl Default for PetSpecies {
    fn default() -> Self {
        Self::Other
    }
}

impl fmt::Display for PetSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PetSpecies {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::Validation(format!("Invalid species: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetGender {
    Male,
    Female,
    Unknown,
}

impl PetGender {
    pub const ALL: [PetGender; 3] = [PetGender::Male, PetGender::Female, PetGender::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unknown => "unknown",
        }
    }
}

impl Default for PetGender {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for PetGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PetGender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::Validation(format!("Invalid gender: {}", s)))
    }
}

/// A patient of the clinic. Always owned by exactly one client.
#[derive(Clone, Debug)]
pub struct Pet {
    pub id: i32,
    pub name: String,
    pub species: PetSpecies,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: PetGender,
    pub color: Option<String>,
    /// Weight in kilograms
    pub weight: Option<f64>,
    pub microchip_number: Option<String>,
    pub client_id: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pet {
    /// Age in whole years on `today`, if the birth date is known
    pub fn age_in_years(&self, today: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        if birth > today {
            return None;
        }
        let mut years = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}

/// Pet with its owner, as shown on the detail view
#[derive(Clone, Debug)]
pub struct PetSummary {
    pub pet: Pet,
    pub owner: Option<Client>,
    pub age_years: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet_born(birth_date: Option<NaiveDate>) -> Pet {
        let now = Utc::now();
        Pet {
            id: 1,
            name: "Rex".into(),
            species: PetSpecies::Dog,
            breed: None,
            birth_date,
            gender: PetGender::Male,
            color: None,
            weight: None,
            microchip_number: None,
            client_id: 1,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_counts_completed_years_only() {
        let pet = pet_born(Some(date(2020, 6, 15)));
        assert_eq!(pet.age_in_years(date(2024, 6, 14)), Some(3));
        assert_eq!(pet.age_in_years(date(2024, 6, 15)), Some(4));
    }

    #[test]
    fn age_unknown_without_birth_date_or_future_birth() {
        assert_eq!(pet_born(None).age_in_years(date(2024, 1, 1)), None);
        assert_eq!(
            pet_born(Some(date(2025, 1, 1))).age_in_years(date(2024, 1, 1)),
            None
        );
    }

    #[test]
    fn species_and_gender_parse() {
        assert_eq!("dog".parse::<PetSpecies>().unwrap(), PetSpecies::Dog);
        assert_eq!("CAT".parse::<PetSpecies>().unwrap(), PetSpecies::Cat);
        assert!("dragon".parse::<PetSpecies>().is_err());
        assert_eq!("female".parse::<PetGender>().unwrap(), PetGender::Female);
        assert!("x".parse::<PetGender>().is_err());
    }

    #[test]
    fn species_label_is_capitalized() {
        assert_eq!(PetSpecies::Hamster.label(), "Hamster");
    }
}
