//! Persistence contracts for inbox items and follow requests
//!
//! The orchestrator is stateless; all mutable state lives behind these
//! traits. Upsert must be last-write-wins keyed by id so that the
//! lookup-then-write sequences in the orchestrator degrade to "duplicate
//! created under race" rather than corruption; a production store should
//! use a unique constraint or conditional write on the dedup/thread/
//! idempotency keys to close the race entirely.

pub mod memory;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{FollowRequest, InboxItem, InboxPage, InboxQuery};
use crate::types::{HeraldError, Result, ValidationIssue};

pub use memory::{MemoryFollowRequestStore, MemoryInboxStore};

/// Inbox item persistence
#[async_trait]
pub trait InboxStore: Send + Sync {
    /// Insert or replace by `(tenant_id, id)`, last write wins
    async fn upsert(&self, item: InboxItem) -> Result<InboxItem>;

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<InboxItem>>;

    /// Lookup by `(tenant, recipient key, dedup key)`
    async fn find_by_dedup_key(
        &self,
        tenant_id: &str,
        recipient_key: &str,
        dedup_key: &str,
    ) -> Result<Option<InboxItem>>;

    /// Lookup by `(tenant, recipient key, thread key)`
    async fn find_by_thread_key(
        &self,
        tenant_id: &str,
        recipient_key: &str,
        thread_key: &str,
    ) -> Result<Option<InboxItem>>;

    /// Paginated multi-recipient query: `created_at` descending, merged
    /// across the query's recipients before cursor and limit apply
    async fn query(&self, query: &InboxQuery) -> Result<InboxPage>;
}

/// Follow request persistence
#[async_trait]
pub trait FollowRequestStore: Send + Sync {
    /// Insert or replace by `(tenant_id, id)`, last write wins
    async fn upsert(&self, request: FollowRequest) -> Result<FollowRequest>;

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<FollowRequest>>;

    async fn find_by_idempotency_key(
        &self,
        tenant_id: &str,
        key: &str,
    ) -> Result<Option<FollowRequest>>;
}

/// Opaque pagination cursor: position of the last item of the previous
/// page in the `(created_at desc, id desc)` ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Millisecond timestamp of the last returned item
    pub created_at_ms: i64,
    /// Id tiebreak for items sharing a timestamp
    pub id: String,
}

impl Cursor {
    /// Position of an item in the page ordering
    pub fn for_item(item: &InboxItem) -> Self {
        Self {
            created_at_ms: item
                .created_at
                .map(|t| t.timestamp_millis())
                .unwrap_or_default(),
            id: item.id.clone(),
        }
    }

    /// Encode to the opaque token handed to callers
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a caller-supplied token; garbage tokens are a validation error
    pub fn decode(token: &str) -> Result<Self> {
        let invalid = || {
            HeraldError::Validation(vec![ValidationIssue::new(
                "invalid",
                "cursor is not a valid continuation token",
                "cursor",
            )])
        };
        let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
        serde_json::from_slice(&bytes).map_err(|_| invalid())
    }

    /// Whether an item at `(created_at, id)` comes strictly after this
    /// cursor in the descending page ordering
    pub fn is_after(&self, created_at: Option<DateTime<Utc>>, id: &str) -> bool {
        let ts = created_at.map(|t| t.timestamp_millis()).unwrap_or_default();
        match ts.cmp(&self.created_at_ms) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Equal => id < self.id.as_str(),
            std::cmp::Ordering::Greater => false,
        }
    }
}
