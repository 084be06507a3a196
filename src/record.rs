//! Records — the universal entity shape for the dashboard state tree.
//!
//! DESIGN
//! ======
//! Every entity kind (product, vehicle, contract, seller, …) is a `Record`:
//! a stable identifier plus a flat JSON field map. Panels own their field
//! vocabularies; the substrate only cares about the id. Identifiers are
//! string-or-integer because the dashboards assign both, and they never
//! change after creation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Flat key-value field map. Alias to reduce noise in signatures.
pub type Fields = serde_json::Map<String, Value>;

// =============================================================================
// RECORD ID
// =============================================================================

/// Stable record identifier, unique within its owning collection only.
///
/// Serialized untagged so `7` and `"7"` round-trip as-is — they are distinct
/// identifiers, matching the loose id discipline of the seeded dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl RecordId {
    /// Generate a fresh string identifier for a newly created record.
    #[must_use]
    pub fn generate() -> Self {
        Self::Str(Uuid::new_v4().to_string())
    }
}

impl From<i64> for RecordId {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for RecordId {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for RecordId {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// One entity: an identifier plus its flat field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    /// Create an empty record with the given id.
    #[must_use]
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self { id: id.into(), fields: Fields::new() }
    }

    /// Builder-style field assignment for seeding and tests.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Merge a field map into this record, overwriting on key collision.
    pub fn merge_fields(&mut self, fields: &Fields) {
        for (key, value) in fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
