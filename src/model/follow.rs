//! Follow/subscribe request model
//!
//! A [`FollowRequest`] captures one relationship-formation request. The
//! status machine is `Pending -> {Approved, Denied}`; decided states are
//! terminal and never re-transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::EntityRef;

/// Kind of relationship being requested. Only these two kinds exist;
/// anything else is rejected at the deserialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    Follow,
    Subscribe,
}

impl RelationKind {
    /// Stable lowercase name used in derived keys and edge records
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Follow => "follow",
            RelationKind::Subscribe => "subscribe",
        }
    }
}

/// Lifecycle status of a follow request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowStatus {
    Pending,
    Approved,
    Denied,
}

impl Default for FollowStatus {
    fn default() -> Self {
        FollowStatus::Pending
    }
}

/// A pending or resolved relationship-formation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowRequest {
    /// Assigned by the orchestrator on creation when empty
    #[serde(default)]
    pub id: String,

    pub tenant_id: String,

    /// Who wants to follow/subscribe
    pub requester: EntityRef,

    /// Who they want to follow/subscribe to
    pub target: EntityRef,

    /// Unique per tenant; derived from requester+target+kind+scope when
    /// the client does not supply one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,

    pub requested_kind: RelationKind,

    /// Optional subscription scope (e.g. a content category)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Optional subscription filter expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    #[serde(default)]
    pub status: FollowStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Who made the decision; `None` for automatic approval
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<EntityRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_reason: Option<String>,
}

impl FollowRequest {
    /// Create a pending request with no keys or timestamps set
    pub fn new(
        tenant_id: &str,
        requester: EntityRef,
        target: EntityRef,
        requested_kind: RelationKind,
    ) -> Self {
        Self {
            id: String::new(),
            tenant_id: tenant_id.to_string(),
            requester,
            target,
            idempotency_key: None,
            requested_kind,
            scope: None,
            filter: None,
            status: FollowStatus::Pending,
            created_at: None,
            decided_by: None,
            decided_at: None,
            decision_reason: None,
        }
    }
}
