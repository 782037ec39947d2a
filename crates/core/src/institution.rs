//! Source records and persisted institution rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::institution_type::{classify, InstitutionType};

/// One item of the source API payload.
///
/// All four keys must be present. `state-province` is often `null` upstream,
/// so its value is optional while the key itself is not. Any other keys
/// (`web_pages`, `domains`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionRecord {
    pub name: String,
    pub alpha_two_code: String,
    pub country: String,
    #[serde(rename = "state-province", deserialize_with = "required_nullable")]
    pub state_province: Option<String>,
}

impl InstitutionRecord {
    #[must_use]
    pub fn natural_key(&self) -> NaturalKey<'_> {
        NaturalKey { name: &self.name, alpha_two_code: &self.alpha_two_code }
    }
}

// A plain `Option` field would silently default to `None` when the key is
// absent; routing through `deserialize_with` makes the key mandatory.
fn required_nullable<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

/// The `(name, alpha_two_code)` pair that identifies an institution.
///
/// Country and province do not take part: two records sharing name and code
/// are the same institution even if the rest differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NaturalKey<'a> {
    pub name: &'a str,
    pub alpha_two_code: &'a str,
}

impl std::fmt::Display for NaturalKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.alpha_two_code)
    }
}

/// A row about to be inserted: everything but the surrogate id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewInstitution {
    pub alpha_two_code: String,
    pub country: String,
    pub name: String,
    pub state_province: Option<String>,
    pub institution_type: Option<InstitutionType>,
    pub created_at: DateTime<Utc>,
}

impl NewInstitution {
    /// Classify `record` and stamp it with `created_at`.
    #[must_use]
    pub fn from_record(record: &InstitutionRecord, created_at: DateTime<Utc>) -> Self {
        Self {
            alpha_two_code: record.alpha_two_code.clone(),
            country: record.country.clone(),
            name: record.name.clone(),
            state_province: record.state_province.clone(),
            institution_type: classify(Some(&record.name)),
            created_at,
        }
    }

    #[must_use]
    pub fn natural_key(&self) -> NaturalKey<'_> {
        NaturalKey { name: &self.name, alpha_two_code: &self.alpha_two_code }
    }
}

/// A persisted row of the `universities` table. Never updated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstitutionRow {
    pub id: i32,
    pub alpha_two_code: String,
    pub country: String,
    pub name: String,
    pub state_province: Option<String>,
    #[serde(rename = "type")]
    pub institution_type: Option<InstitutionType>,
    pub created_at: DateTime<Utc>,
}

impl InstitutionRow {
    #[must_use]
    pub fn from_new(id: i32, new: NewInstitution) -> Self {
        Self {
            id,
            alpha_two_code: new.alpha_two_code,
            country: new.country,
            name: new.name,
            state_province: new.state_province,
            institution_type: new.institution_type,
            created_at: new.created_at,
        }
    }

    #[must_use]
    pub fn natural_key(&self) -> NaturalKey<'_> {
        NaturalKey { name: &self.name, alpha_two_code: &self.alpha_two_code }
    }
}
