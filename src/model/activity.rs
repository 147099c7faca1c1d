//! Published-activity input record
//!
//! The fan-out entry point receives one [`ActivityRecord`] per published
//! social activity. The record carries just enough to derive the audience
//! (actor, targets, owner) and to build the per-recipient inbox items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::EntityRef;

/// A published social activity to fan out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub tenant_id: String,

    /// Activity id; seeds the per-recipient dedup key
    pub id: String,

    /// Activity type (e.g. "post.created", "comment.replied");
    /// seeds the thread key so same-shape events collapse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_key: Option<String>,

    /// Who performed the activity; their followers are part of the audience
    pub actor: EntityRef,

    /// What the activity is about; each target's subscribers join the audience
    #[serde(default)]
    pub targets: Vec<EntityRef>,

    /// Optional owning entity (e.g. the space a post lives in); its
    /// subscribers join the audience too
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<EntityRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,

    /// Optional display fields carried onto the generated items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ActivityRecord {
    pub fn new(tenant_id: &str, id: &str, actor: EntityRef) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            id: id.to_string(),
            type_key: None,
            actor,
            targets: Vec::new(),
            owner: None,
            occurred_at: None,
            title: None,
            body: None,
        }
    }
}
