//! Relationship service contract
//!
//! The relationship graph is an external collaborator: it owns the edges,
//! answers follower/subscriber queries, decides per-recipient visibility,
//! and creates edges when a follow request is approved. Herald only talks
//! to this boundary; it never stores edges itself.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ActivityRecord, EntityRef, RelationKind};
use crate::types::Result;

/// One directed relationship edge (`from` follows/subscribes-to `to`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub tenant_id: String,
    pub from: EntityRef,
    pub to: EntityRef,
    pub kind: RelationKind,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl RelationshipEdge {
    /// Active edge with the current timestamp
    pub fn active(tenant_id: &str, from: EntityRef, to: EntityRef, kind: RelationKind) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            from,
            to,
            kind,
            is_active: true,
            created_at: Some(Utc::now()),
        }
    }
}

/// Edge query filter: who points at `to` with the given kind
#[derive(Debug, Clone)]
pub struct EdgeFilter {
    pub tenant_id: String,
    pub to: EntityRef,
    pub kind: RelationKind,
    /// `Some(true)` restricts to active edges; `None` matches all
    pub is_active: Option<bool>,
}

impl EdgeFilter {
    /// Active edges of the given kind pointing at `to`
    pub fn active_towards(tenant_id: &str, to: &EntityRef, kind: RelationKind) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            to: to.clone(),
            kind,
            is_active: Some(true),
        }
    }
}

/// Outcome of a per-recipient visibility check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityDecision {
    pub allowed: bool,
    /// Optional machine-readable reason when denied (diagnostic only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VisibilityDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// External relationship graph boundary
#[async_trait]
pub trait RelationshipService: Send + Sync {
    /// Edges matching the filter (used to find followers and subscribers)
    async fn query_edges(&self, filter: &EdgeFilter) -> Result<Vec<RelationshipEdge>>;

    /// Whether `recipient` may see `activity`; distinct from targetability
    async fn can_see(
        &self,
        tenant_id: &str,
        recipient: &EntityRef,
        activity: &ActivityRecord,
    ) -> Result<VisibilityDecision>;

    /// Create or reactivate an edge (called on follow-request approval)
    async fn upsert_edge(&self, edge: RelationshipEdge) -> Result<()>;
}
