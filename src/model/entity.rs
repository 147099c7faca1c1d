//! Entity and event references
//!
//! An [`EntityRef`] identifies any addressable actor or target (profile,
//! group, etc.). Identity is defined over the normalized `(type, id)` pair
//! only; `kind` and `display` are metadata. The normalized composite key is
//! exposed directly via [`EntityRef::key`] so callers can use it as a
//! map/set key without a separate comparer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Reference to an addressable entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRef {
    /// Coarse category (e.g. "actor", "resource"); metadata, not identity
    #[serde(default)]
    pub kind: String,

    /// Entity type (e.g. "profile", "group")
    #[serde(rename = "type")]
    pub entity_type: String,

    /// Entity id, unique within its type
    pub id: String,

    /// Human-readable name; metadata, not identity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl EntityRef {
    /// Create a reference with the given type and id
    pub fn new(entity_type: &str, id: &str) -> Self {
        Self {
            kind: String::new(),
            entity_type: entity_type.to_string(),
            id: id.to_string(),
            display: None,
        }
    }

    /// Normalized composite identity key: `type:id`, trimmed and lowercased.
    ///
    /// Two references with the same key are the same entity regardless of
    /// `kind` or `display`.
    pub fn key(&self) -> String {
        format!(
            "{}:{}",
            self.entity_type.trim().to_lowercase(),
            self.id.trim().to_lowercase()
        )
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Reference to the event an inbox item was generated from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRef {
    /// Event category (e.g. "activity", "follow-request")
    pub kind: String,

    /// Id of the originating record
    pub id: String,

    /// Fine-grained event type (e.g. "post.created", "follow-request.approved")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_key: Option<String>,

    /// When the originating event happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
}

impl EventRef {
    pub fn new(kind: &str, id: &str) -> Self {
        Self {
            kind: kind.to_string(),
            id: id.to_string(),
            type_key: None,
            occurred_at: None,
        }
    }
}
