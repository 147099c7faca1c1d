//! Inbox item model and query types
//!
//! An [`InboxItem`] is one per-recipient notification record. Items are
//! created by activity fan-out or by the follow-request workflow, mutated
//! by mark-read/archive and thread-merge, and never deleted by this crate
//! (retention is an external concern).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{EntityRef, EventRef};

/// Classification of an inbox item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboxKind {
    /// Informational: something happened that involves the recipient
    Notification,
    /// Actionable: a pending follow/subscribe request awaiting a decision
    Request,
}

/// Lifecycle status of an inbox item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboxStatus {
    Unread,
    Read,
    Archived,
}

impl Default for InboxStatus {
    fn default() -> Self {
        InboxStatus::Unread
    }
}

/// Per-recipient notification record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxItem {
    /// Assigned by the orchestrator on creation when empty
    #[serde(default)]
    pub id: String,

    pub tenant_id: String,

    /// Who this item is for
    pub recipient: EntityRef,

    pub kind: InboxKind,

    /// The event this item was generated from
    pub event: EventRef,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Entities relevant to the event, actor first
    #[serde(default)]
    pub targets: Vec<EntityRef>,

    /// Exact-duplicate suppression key; a second add with the same key for
    /// the same recipient is a no-op returning the existing item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedup_key: Option<String>,

    /// Grouping key; repeated same-shape events collapse into one item
    /// with an incrementing `thread_count`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_key: Option<String>,

    /// Number of events collapsed into this item, always >= 1
    #[serde(default = "default_thread_count")]
    pub thread_count: u32,

    #[serde(default)]
    pub status: InboxStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_thread_count() -> u32 {
    1
}

impl InboxItem {
    /// Create an unread notification-kind item with no keys set
    pub fn new(tenant_id: &str, recipient: EntityRef, kind: InboxKind, event: EventRef) -> Self {
        Self {
            id: String::new(),
            tenant_id: tenant_id.to_string(),
            recipient,
            kind,
            event,
            title: None,
            body: None,
            targets: Vec::new(),
            dedup_key: None,
            thread_key: None,
            thread_count: 1,
            status: InboxStatus::Unread,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Paginated multi-recipient inbox query
///
/// Results are ordered by `created_at` descending, merged across the given
/// recipients before the cursor and limit apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxQuery {
    pub tenant_id: String,

    /// Recipients whose inboxes are merged into one result stream
    pub recipients: Vec<EntityRef>,

    /// Restrict to items in this status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InboxStatus>,

    /// Page size, 1..=200
    pub limit: u32,

    /// Opaque continuation token from a previous page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// One page of inbox query results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxPage {
    pub items: Vec<InboxItem>,

    /// Token for the next page; `None` when exhausted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
