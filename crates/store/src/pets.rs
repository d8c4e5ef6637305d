use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    StoreError,
    record::{Record, patch_field},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Fish,
    Reptile,
    Rodent,
    #[default]
    Other,
}

impl Species {
    pub const fn as_str(self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Bird => "bird",
            Species::Rabbit => "rabbit",
            Species::Fish => "fish",
            Species::Reptile => "reptile",
            Species::Rodent => "rodent",
            Species::Other => "other",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dog" => Ok(Species::Dog),
            "cat" => Ok(Species::Cat),
            "bird" => Ok(Species::Bird),
            "rabbit" => Ok(Species::Rabbit),
            "fish" => Ok(Species::Fish),
            "reptile" => Ok(Species::Reptile),
            "rodent" => Ok(Species::Rodent),
            "other" => Ok(Species::Other),
            other => Err(StoreError::InvalidInput(format!("unknown species: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    pub species: Species,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub photo_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPet {
    pub name: String,
    pub species: Species,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub photo_ref: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<Species>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_ref: Option<Option<String>>,
}

impl Record for Pet {
    type New = NewPet;
    type Patch = PetPatch;

    const LABEL: &'static str = "pets";

    fn id(&self) -> Uuid {
        self.id
    }

    fn materialize(id: Uuid, at: DateTime<Utc>, fields: NewPet) -> Self {
        Self {
            id,
            name: fields.name,
            species: fields.species,
            breed: fields.breed,
            birth_date: fields.birth_date,
            photo_ref: fields.photo_ref,
            created_at: at,
            updated_at: at,
        }
    }

    fn apply(&mut self, patch: PetPatch, at: DateTime<Utc>) {
        patch_field(&mut self.name, patch.name);
        patch_field(&mut self.species, patch.species);
        patch_field(&mut self.breed, patch.breed);
        patch_field(&mut self.birth_date, patch.birth_date);
        patch_field(&mut self.photo_ref, patch.photo_ref);
        self.updated_at = at;
    }
}
