//! Profile rows: the relational half of an account.
//!
//! A row in `PersonnelProfiles` or `PetOwnerProfiles` shares its id with the
//! identity-store user it belongs to. Which table holds the row decides the
//! account's role.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::Table;
use crate::errors::{AppError, AppResult};

/// The two profile tables an account can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Personnel,
    PetOwner,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 2] = [ProfileKind::Personnel, ProfileKind::PetOwner];

    /// Columns fetched when resolving a caller's role.
    pub fn summary_columns(self) -> &'static str {
        match self {
            ProfileKind::Personnel => "id, first_name, last_name",
            ProfileKind::PetOwner => "id, first_name, last_name, barangay",
        }
    }

    pub fn table(self) -> Table {
        match self {
            ProfileKind::Personnel => Table::PersonnelProfiles,
            ProfileKind::PetOwner => Table::PetOwnerProfiles,
        }
    }

    /// Parse the table name clients send as `profileTable`.
    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.table().as_str() == name)
    }
}

/// Staff member as seen by role resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PersonnelProfile {
    pub id: Uuid,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
}

/// Pet owner as seen by role resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PetOwnerProfile {
    pub id: Uuid,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(default)]
    pub barangay: Option<String>,
}

/// "first last", skipping blanks.
pub fn full_name(first: &str, last: &str) -> String {
    [first.trim(), last.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl PersonnelProfile {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

impl PetOwnerProfile {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

/// Columns supplied when provisioning a personnel account
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct PersonnelFields {
    #[validate(length(min = 1, message = "First name is required"))]
    #[schema(example = "Maria")]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    #[schema(example = "Santos")]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Columns supplied when provisioning a pet owner account
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct PetOwnerFields {
    #[serde(default)]
    #[schema(example = "Juan")]
    pub first_name: String,
    #[serde(default)]
    #[schema(example = "Dela Cruz")]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barangay: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub birth_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_registered: Option<NaiveDate>,
}

/// Profile columns for a new account, tagged by target table.
#[derive(Debug, Clone)]
pub enum NewProfile {
    Personnel(PersonnelFields),
    PetOwner(PetOwnerFields),
}

impl NewProfile {
    pub fn kind(&self) -> ProfileKind {
        match self {
            NewProfile::Personnel(_) => ProfileKind::Personnel,
            NewProfile::PetOwner(_) => ProfileKind::PetOwner,
        }
    }

    /// Fill the profile email from the account email when it was left blank.
    pub fn with_default_email(mut self, email: &str) -> Self {
        let slot = match &mut self {
            NewProfile::Personnel(fields) => &mut fields.email,
            NewProfile::PetOwner(fields) => &mut fields.email,
        };
        if slot.as_deref().map_or(true, |e| e.trim().is_empty()) {
            *slot = Some(email.to_string());
        }
        self
    }

    /// Row body for the insert, keyed by the identity user's id.
    pub fn into_row(self, id: Uuid) -> AppResult<Value> {
        let fields = match self {
            NewProfile::Personnel(fields) => serde_json::to_value(fields),
            NewProfile::PetOwner(fields) => serde_json::to_value(fields),
        }
        .map_err(|e| AppError::internal(format!("Failed to encode profile: {}", e)))?;

        let mut row = match fields {
            Value::Object(map) => map,
            _ => return Err(AppError::internal("Profile must encode to an object")),
        };
        row.insert("id".to_string(), Value::String(id.to_string()));
        Ok(Value::Object(row))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            // Accept full timestamps and keep the date part.
            let date = value.get(..10).unwrap_or(value);
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
    }
}
