//! In-memory store implementations
//!
//! DashMap-backed stores keyed by `(tenant, id)`. Secondary lookups
//! (dedup/thread/idempotency keys) scan the tenant's entries, which is
//! fine for tests and small single-process deployments; a production
//! store would index those keys.

use std::collections::HashSet;

use dashmap::DashMap;
use tracing::debug;

use super::{Cursor, FollowRequestStore, InboxStore};
use crate::model::{FollowRequest, InboxItem, InboxPage, InboxQuery};
use crate::types::Result;
use async_trait::async_trait;

fn primary_key(tenant_id: &str, id: &str) -> String {
    format!("{tenant_id}\u{1f}{id}")
}

/// In-memory inbox store
#[derive(Default)]
pub struct MemoryInboxStore {
    items: DashMap<String, InboxItem>,
}

impl MemoryInboxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items (test helper)
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl InboxStore for MemoryInboxStore {
    async fn upsert(&self, item: InboxItem) -> Result<InboxItem> {
        debug!(tenant = %item.tenant_id, id = %item.id, "inbox upsert");
        self.items
            .insert(primary_key(&item.tenant_id, &item.id), item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<InboxItem>> {
        Ok(self
            .items
            .get(&primary_key(tenant_id, id))
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_dedup_key(
        &self,
        tenant_id: &str,
        recipient_key: &str,
        dedup_key: &str,
    ) -> Result<Option<InboxItem>> {
        Ok(self.items.iter().find_map(|entry| {
            let item = entry.value();
            (item.tenant_id == tenant_id
                && item.recipient.key() == recipient_key
                && item.dedup_key.as_deref() == Some(dedup_key))
            .then(|| item.clone())
        }))
    }

    async fn find_by_thread_key(
        &self,
        tenant_id: &str,
        recipient_key: &str,
        thread_key: &str,
    ) -> Result<Option<InboxItem>> {
        Ok(self.items.iter().find_map(|entry| {
            let item = entry.value();
            (item.tenant_id == tenant_id
                && item.recipient.key() == recipient_key
                && item.thread_key.as_deref() == Some(thread_key))
            .then(|| item.clone())
        }))
    }

    async fn query(&self, query: &InboxQuery) -> Result<InboxPage> {
        let recipient_keys: HashSet<String> =
            query.recipients.iter().map(|r| r.key()).collect();

        let mut matched: Vec<InboxItem> = self
            .items
            .iter()
            .filter(|entry| {
                let item = entry.value();
                item.tenant_id == query.tenant_id
                    && recipient_keys.contains(&item.recipient.key())
                    && query.status.map_or(true, |status| item.status == status)
            })
            .map(|entry| entry.value().clone())
            .collect();

        // created_at descending, id descending tiebreak
        matched.sort_by(|a, b| {
            let ta = a.created_at.map(|t| t.timestamp_millis()).unwrap_or_default();
            let tb = b.created_at.map(|t| t.timestamp_millis()).unwrap_or_default();
            tb.cmp(&ta).then_with(|| b.id.cmp(&a.id))
        });

        if let Some(token) = &query.cursor {
            let cursor = Cursor::decode(token)?;
            matched.retain(|item| cursor.is_after(item.created_at, &item.id));
        }

        let limit = query.limit as usize;
        let next_cursor = if matched.len() > limit {
            matched
                .get(limit - 1)
                .map(|last| Cursor::for_item(last).encode())
        } else {
            None
        };
        matched.truncate(limit);

        Ok(InboxPage {
            items: matched,
            next_cursor,
        })
    }
}

/// In-memory follow request store
#[derive(Default)]
pub struct MemoryFollowRequestStore {
    requests: DashMap<String, FollowRequest>,
}

impl MemoryFollowRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[async_trait]
impl FollowRequestStore for MemoryFollowRequestStore {
    async fn upsert(&self, request: FollowRequest) -> Result<FollowRequest> {
        debug!(tenant = %request.tenant_id, id = %request.id, "follow request upsert");
        self.requests
            .insert(primary_key(&request.tenant_id, &request.id), request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, tenant_id: &str, id: &str) -> Result<Option<FollowRequest>> {
        Ok(self
            .requests
            .get(&primary_key(tenant_id, id))
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_idempotency_key(
        &self,
        tenant_id: &str,
        key: &str,
    ) -> Result<Option<FollowRequest>> {
        Ok(self.requests.iter().find_map(|entry| {
            let request = entry.value();
            (request.tenant_id == tenant_id
                && request.idempotency_key.as_deref() == Some(key))
            .then(|| request.clone())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityRef, EventRef, InboxKind, InboxStatus, RelationKind};
    use chrono::{TimeZone, Utc};

    fn item(id: &str, recipient: &str, created_ms: i64) -> InboxItem {
        let mut item = InboxItem::new(
            "acme",
            EntityRef::new("profile", recipient),
            InboxKind::Notification,
            EventRef::new("activity", "a-1"),
        );
        item.id = id.to_string();
        item.created_at = Some(Utc.timestamp_millis_opt(created_ms).unwrap());
        item
    }

    #[tokio::test]
    async fn test_upsert_is_last_write_wins() {
        let store = MemoryInboxStore::new();
        let mut first = item("i-1", "alice", 1000);
        first.title = Some("first".to_string());
        store.upsert(first).await.unwrap();

        let mut second = item("i-1", "alice", 1000);
        second.title = Some("second".to_string());
        store.upsert(second).await.unwrap();

        assert_eq!(store.len(), 1);
        let stored = store.find_by_id("acme", "i-1").await.unwrap().unwrap();
        assert_eq!(stored.title.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_secondary_key_lookups() {
        let store = MemoryInboxStore::new();
        let mut a = item("i-1", "alice", 1000);
        a.dedup_key = Some("dd:x".to_string());
        a.thread_key = Some("th:y".to_string());
        store.upsert(a).await.unwrap();

        let recipient_key = EntityRef::new("profile", "alice").key();
        assert!(store
            .find_by_dedup_key("acme", &recipient_key, "dd:x")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_thread_key("acme", &recipient_key, "th:y")
            .await
            .unwrap()
            .is_some());

        // Same keys under another recipient or tenant do not match
        assert!(store
            .find_by_dedup_key("acme", "profile:bob", "dd:x")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_by_dedup_key("other", &recipient_key, "dd:x")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_query_merges_recipients_descending() {
        let store = MemoryInboxStore::new();
        store.upsert(item("i-1", "alice", 1000)).await.unwrap();
        store.upsert(item("i-2", "bob", 3000)).await.unwrap();
        store.upsert(item("i-3", "alice", 2000)).await.unwrap();
        store.upsert(item("i-4", "carol", 4000)).await.unwrap();

        let query = InboxQuery {
            tenant_id: "acme".to_string(),
            recipients: vec![
                EntityRef::new("profile", "alice"),
                EntityRef::new("profile", "bob"),
            ],
            status: None,
            limit: 10,
            cursor: None,
        };
        let page = store.query(&query).await.unwrap();
        let ids: Vec<_> = page.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["i-2", "i-3", "i-1"]);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_query_status_filter() {
        let store = MemoryInboxStore::new();
        let mut read = item("i-1", "alice", 1000);
        read.status = InboxStatus::Read;
        store.upsert(read).await.unwrap();
        store.upsert(item("i-2", "alice", 2000)).await.unwrap();

        let query = InboxQuery {
            tenant_id: "acme".to_string(),
            recipients: vec![EntityRef::new("profile", "alice")],
            status: Some(InboxStatus::Unread),
            limit: 10,
            cursor: None,
        };
        let page = store.query(&query).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "i-2");
    }

    #[tokio::test]
    async fn test_follow_request_idempotency_lookup() {
        let store = MemoryFollowRequestStore::new();
        let mut request = FollowRequest::new(
            "acme",
            EntityRef::new("profile", "alice"),
            EntityRef::new("profile", "bob"),
            RelationKind::Follow,
        );
        request.id = "fr-1".to_string();
        request.idempotency_key = Some("fr:key".to_string());
        store.upsert(request).await.unwrap();

        let found = store
            .find_by_idempotency_key("acme", "fr:key")
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, "fr-1");
        assert!(store
            .find_by_idempotency_key("other", "fr:key")
            .await
            .unwrap()
            .is_none());
    }
}
