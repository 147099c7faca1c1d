//! Notification orchestrator
//!
//! Composes the stores, the relationship service and the policy seams into
//! the two primary workflows:
//!
//! - **Activity fan-out**: derive a deduplicated audience from the
//!   relationship graph, gate each recipient through a visibility check,
//!   and materialize one inbox item per eligible recipient.
//! - **Follow-request lifecycle**: idempotent request creation with an
//!   auto-approve path and a pending-approval path, then terminal
//!   approve/deny transitions that create the relationship edge and notify
//!   the requester.
//!
//! The orchestrator is stateless between calls; all mutable state lives in
//! the injected stores. Validation always runs before any side effect, and
//! per-recipient delivery is independently idempotent, so a retried
//! fan-out converges instead of duplicating.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::HeraldConfig;
use crate::keys;
use crate::model::{
    ActivityRecord, EntityRef, EventRef, FollowRequest, FollowStatus, InboxItem, InboxKind,
    InboxPage, InboxQuery, InboxStatus, RelationKind,
};
use crate::normalize;
use crate::policy::{
    GovernancePolicy, IdGenerator, IdentityExpansion, OpenGovernance, RecipientExpansion,
    UuidGenerator,
};
use crate::relationship::{EdgeFilter, RelationshipEdge, RelationshipService};
use crate::store::{FollowRequestStore, InboxStore};
use crate::types::{HeraldError, Result};
use crate::validate;

/// The core engine: activity fan-out and follow-request governance
pub struct NotificationOrchestrator {
    inbox: Arc<dyn InboxStore>,
    requests: Arc<dyn FollowRequestStore>,
    relationships: Arc<dyn RelationshipService>,
    governance: Arc<dyn GovernancePolicy>,
    expansion: Arc<dyn RecipientExpansion>,
    ids: Arc<dyn IdGenerator>,
    config: HeraldConfig,
}

impl NotificationOrchestrator {
    /// Create an orchestrator with default policies (open governance,
    /// identity expansion, uuid ids)
    pub fn new(
        inbox: Arc<dyn InboxStore>,
        requests: Arc<dyn FollowRequestStore>,
        relationships: Arc<dyn RelationshipService>,
    ) -> Self {
        Self {
            inbox,
            requests,
            relationships,
            governance: Arc::new(OpenGovernance),
            expansion: Arc::new(IdentityExpansion),
            ids: Arc::new(UuidGenerator),
            config: HeraldConfig::default(),
        }
    }

    pub fn with_governance(mut self, governance: Arc<dyn GovernancePolicy>) -> Self {
        self.governance = governance;
        self
    }

    pub fn with_expansion(mut self, expansion: Arc<dyn RecipientExpansion>) -> Self {
        self.expansion = expansion;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_config(mut self, config: HeraldConfig) -> Self {
        self.config = config;
        self
    }

    // ========================================================================
    // Activity fan-out
    // ========================================================================

    /// Fan a published activity out to its derived audience.
    ///
    /// Aborts whole (no partial fan-out) when the actor, any target or the
    /// owner fails the targetability check. Recipients denied by the
    /// visibility check are silently skipped. Returns the delivered items.
    pub async fn on_activity_published(
        &self,
        mut activity: ActivityRecord,
    ) -> Result<Vec<InboxItem>> {
        normalize::activity_record(&mut activity);

        self.ensure_targetable(&activity.tenant_id, &activity.actor, "actor")
            .await?;
        for target in &activity.targets {
            self.ensure_targetable(&activity.tenant_id, target, "target")
                .await?;
        }
        if let Some(owner) = &activity.owner {
            self.ensure_targetable(&activity.tenant_id, owner, "owner")
                .await?;
        }

        let selected = self.select_recipients(&activity).await?;

        let mut expanded = Vec::new();
        for recipient in &selected {
            expanded.extend(
                self.expansion
                    .expand(&activity.tenant_id, recipient)
                    .await?,
            );
        }

        let mut delivered = Vec::new();
        let mut skipped = 0usize;
        for recipient in expanded {
            let decision = self
                .relationships
                .can_see(&activity.tenant_id, &recipient, &activity)
                .await?;
            if !decision.allowed {
                // Expected high-frequency outcome, not a failure
                debug!(
                    tenant = %activity.tenant_id,
                    activity = %activity.id,
                    recipient = %recipient,
                    "recipient not allowed to see activity, skipping"
                );
                skipped += 1;
                continue;
            }
            let item = self.build_activity_item(&activity, &recipient);
            delivered.push(self.add(item).await?);
        }

        info!(
            tenant = %activity.tenant_id,
            activity = %activity.id,
            selected = selected.len(),
            delivered = delivered.len(),
            skipped,
            "activity fan-out complete"
        );
        Ok(delivered)
    }

    /// Union of actor followers, per-target subscribers and owner
    /// subscribers, deduplicated by normalized entity key so a user who is
    /// both follower and subscriber gets exactly one fan-out pass
    async fn select_recipients(&self, activity: &ActivityRecord) -> Result<Vec<EntityRef>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut selected = Vec::new();
        let mut collect = |edges: Vec<RelationshipEdge>| {
            for edge in edges {
                if seen.insert(edge.from.key()) {
                    selected.push(edge.from);
                }
            }
        };

        let followers = self
            .relationships
            .query_edges(&EdgeFilter::active_towards(
                &activity.tenant_id,
                &activity.actor,
                RelationKind::Follow,
            ))
            .await?;
        collect(followers);

        for target in &activity.targets {
            let subscribers = self
                .relationships
                .query_edges(&EdgeFilter::active_towards(
                    &activity.tenant_id,
                    target,
                    RelationKind::Subscribe,
                ))
                .await?;
            collect(subscribers);
        }

        if let Some(owner) = &activity.owner {
            let subscribers = self
                .relationships
                .query_edges(&EdgeFilter::active_towards(
                    &activity.tenant_id,
                    owner,
                    RelationKind::Subscribe,
                ))
                .await?;
            collect(subscribers);
        }

        Ok(selected)
    }

    fn build_activity_item(&self, activity: &ActivityRecord, recipient: &EntityRef) -> InboxItem {
        let mut event = EventRef::new("activity", &activity.id);
        event.type_key = activity.type_key.clone();
        event.occurred_at = activity.occurred_at;

        let mut item = InboxItem::new(
            &activity.tenant_id,
            recipient.clone(),
            InboxKind::Notification,
            event,
        );
        item.title = activity.title.clone();
        item.body = activity.body.clone();
        item.dedup_key = Some(keys::dedup_key(&activity.id, recipient));
        item.thread_key = Some(keys::thread_key(
            activity.targets.first(),
            &activity.actor,
            activity.type_key.as_deref(),
        ));

        let mut targets = activity.targets.clone();
        if !targets.contains(&activity.actor) {
            targets.insert(0, activity.actor.clone());
        }
        item.targets = targets;
        item
    }

    async fn ensure_targetable(
        &self,
        tenant_id: &str,
        entity: &EntityRef,
        role: &str,
    ) -> Result<()> {
        if self.governance.is_targetable(tenant_id, entity).await? {
            return Ok(());
        }
        warn!(tenant = %tenant_id, entity = %entity, role, "entity failed targetability check");
        Err(HeraldError::policy(
            entity.key(),
            format!("{role} is not targetable"),
        ))
    }

    // ========================================================================
    // Item add / dedup / thread-merge
    // ========================================================================

    /// Add one inbox item, suppressing exact duplicates and collapsing
    /// threads.
    ///
    /// A dedup-key hit returns the stored item unchanged. A thread-key hit
    /// increments the stored item's `thread_count` and refreshes
    /// `updated_at`. Otherwise the item is persisted as a new record.
    pub async fn add(&self, mut item: InboxItem) -> Result<InboxItem> {
        normalize::inbox_item(&mut item);
        let issues = validate::inbox_item(&item);
        if !issues.is_empty() {
            return Err(HeraldError::Validation(issues));
        }

        if item.id.is_empty() {
            item.id = self.ids.new_id();
        }
        if item.created_at.is_none() {
            item.created_at = Some(Utc::now());
        }

        let recipient_key = item.recipient.key();

        if let Some(dedup_key) = item.dedup_key.clone().filter(|k| !k.is_empty()) {
            if let Some(existing) = self
                .inbox
                .find_by_dedup_key(&item.tenant_id, &recipient_key, &dedup_key)
                .await?
            {
                debug!(
                    tenant = %item.tenant_id,
                    id = %existing.id,
                    recipient = %item.recipient,
                    "exact duplicate suppressed"
                );
                return Ok(existing);
            }
        }

        if let Some(thread_key) = item.thread_key.clone().filter(|k| !k.is_empty()) {
            if let Some(mut existing) = self
                .inbox
                .find_by_thread_key(&item.tenant_id, &recipient_key, &thread_key)
                .await?
            {
                existing.thread_count += 1;
                existing.updated_at = Some(Utc::now());
                // Product decision: status is NOT reset to Unread on merge.
                // A read or archived thread that receives a new event keeps
                // its status and resurfaces through updated_at only.
                debug!(
                    tenant = %item.tenant_id,
                    id = %existing.id,
                    thread_count = existing.thread_count,
                    "thread merged"
                );
                return self.inbox.upsert(existing).await;
            }
        }

        item.updated_at = item.created_at;
        self.inbox.upsert(item).await
    }

    // ========================================================================
    // Inbox queries and status changes
    // ========================================================================

    /// Paginated multi-recipient inbox query, `created_at` descending
    pub async fn query_inbox(&self, mut query: InboxQuery) -> Result<InboxPage> {
        normalize::inbox_query(&mut query);
        let issues = validate::inbox_query(&query);
        if !issues.is_empty() {
            return Err(HeraldError::Validation(issues));
        }
        // Validation already rejected out-of-range limits; this clamp only
        // matters for callers that bypass it. Never replaces the rejection.
        query.limit = query.limit.min(self.config.max_query_limit);
        self.inbox.query(&query).await
    }

    /// Mark one item as read
    pub async fn mark_read(&self, tenant_id: &str, id: &str) -> Result<InboxItem> {
        self.set_status(tenant_id, id, InboxStatus::Read).await
    }

    /// Archive one item
    pub async fn archive(&self, tenant_id: &str, id: &str) -> Result<InboxItem> {
        self.set_status(tenant_id, id, InboxStatus::Archived).await
    }

    async fn set_status(&self, tenant_id: &str, id: &str, status: InboxStatus) -> Result<InboxItem> {
        let tenant = normalize::tenant_id(Some(tenant_id));
        let mut item = self
            .inbox
            .find_by_id(&tenant, id.trim())
            .await?
            .ok_or_else(|| HeraldError::not_found("inbox item", id))?;
        item.status = status;
        item.updated_at = Some(Utc::now());
        self.inbox.upsert(item).await
    }

    // ========================================================================
    // Follow-request lifecycle
    // ========================================================================

    /// Create a follow/subscribe request.
    ///
    /// Idempotent on the (client-supplied or derived) idempotency key: a
    /// duplicate returns the existing request with no side effects. Routes
    /// to the auto-approve or pending path per the governance policy.
    pub async fn create_follow_request(
        &self,
        mut request: FollowRequest,
    ) -> Result<FollowRequest> {
        normalize::follow_request(&mut request);
        let issues = validate::follow_request(&request);
        if !issues.is_empty() {
            return Err(HeraldError::Validation(issues));
        }

        if !self
            .governance
            .is_targetable(&request.tenant_id, &request.target)
            .await?
        {
            warn!(
                tenant = %request.tenant_id,
                target = %request.target,
                "follow request rejected: target not targetable"
            );
            return Err(HeraldError::policy(
                request.target.key(),
                "target is not targetable",
            ));
        }

        let idempotency_key = match request.idempotency_key.clone().filter(|k| !k.is_empty()) {
            Some(key) => key,
            None => keys::idempotency_key(
                &request.requester,
                &request.target,
                request.requested_kind,
                request.scope.as_deref(),
            ),
        };
        if let Some(existing) = self
            .requests
            .find_by_idempotency_key(&request.tenant_id, &idempotency_key)
            .await?
        {
            debug!(
                tenant = %request.tenant_id,
                id = %existing.id,
                "duplicate follow request suppressed"
            );
            return Ok(existing);
        }
        request.idempotency_key = Some(idempotency_key);

        if request.id.is_empty() {
            request.id = self.ids.new_id();
        }
        if request.created_at.is_none() {
            request.created_at = Some(Utc::now());
        }

        let requires_approval = self
            .governance
            .requires_approval_to_follow(
                &request.tenant_id,
                &request.requester,
                &request.target,
                request.requested_kind,
            )
            .await?;

        if !requires_approval {
            // Auto-approve: the edge exists before the request is persisted
            self.relationships
                .upsert_edge(RelationshipEdge::active(
                    &request.tenant_id,
                    request.requester.clone(),
                    request.target.clone(),
                    request.requested_kind,
                ))
                .await?;
            request.status = FollowStatus::Approved;
            request.decided_at = Some(Utc::now());
            let saved = self.requests.upsert(request).await?;
            info!(
                tenant = %saved.tenant_id,
                id = %saved.id,
                requester = %saved.requester,
                target = %saved.target,
                "follow request auto-approved"
            );
            self.notify_requester_of_decision(&saved).await?;
            return Ok(saved);
        }

        request.status = FollowStatus::Pending;
        let saved = self.requests.upsert(request).await?;
        let approvers = self
            .governance
            .get_approvers(&saved.tenant_id, &saved.target)
            .await?;
        for approver in &approvers {
            self.add(self.build_approval_request_item(&saved, approver))
                .await?;
        }
        info!(
            tenant = %saved.tenant_id,
            id = %saved.id,
            approvers = approvers.len(),
            "follow request pending approval"
        );
        Ok(saved)
    }

    /// Approve a pending request: create the edge, persist the terminal
    /// state, notify the requester
    pub async fn approve_request(
        &self,
        tenant_id: &str,
        request_id: &str,
        decided_by: EntityRef,
        reason: Option<String>,
    ) -> Result<FollowRequest> {
        let mut request = self.load_pending(tenant_id, request_id).await?;

        self.relationships
            .upsert_edge(RelationshipEdge::active(
                &request.tenant_id,
                request.requester.clone(),
                request.target.clone(),
                request.requested_kind,
            ))
            .await?;

        request.status = FollowStatus::Approved;
        self.finish_decision(request, decided_by, reason).await
    }

    /// Deny a pending request: persist the terminal state, notify the
    /// requester; no edge is created
    pub async fn deny_request(
        &self,
        tenant_id: &str,
        request_id: &str,
        decided_by: EntityRef,
        reason: Option<String>,
    ) -> Result<FollowRequest> {
        let mut request = self.load_pending(tenant_id, request_id).await?;
        request.status = FollowStatus::Denied;
        self.finish_decision(request, decided_by, reason).await
    }

    async fn load_pending(&self, tenant_id: &str, request_id: &str) -> Result<FollowRequest> {
        let tenant = normalize::tenant_id(Some(tenant_id));
        let request = self
            .requests
            .find_by_id(&tenant, request_id.trim())
            .await?
            .ok_or_else(|| HeraldError::not_found("follow request", request_id))?;
        if request.status != FollowStatus::Pending {
            return Err(HeraldError::InvalidStatus(format!(
                "follow request {} is {:?}, only Pending requests can be decided",
                request.id, request.status
            )));
        }
        Ok(request)
    }

    async fn finish_decision(
        &self,
        mut request: FollowRequest,
        mut decided_by: EntityRef,
        reason: Option<String>,
    ) -> Result<FollowRequest> {
        normalize::entity_ref(&mut decided_by);
        request.decided_by = Some(decided_by);
        request.decided_at = Some(Utc::now());
        request.decision_reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());

        let saved = self.requests.upsert(request).await?;
        info!(
            tenant = %saved.tenant_id,
            id = %saved.id,
            status = ?saved.status,
            "follow request decided"
        );
        self.notify_requester_of_decision(&saved).await?;
        Ok(saved)
    }

    /// One Request-kind item per approver, carrying requester and target
    fn build_approval_request_item(
        &self,
        request: &FollowRequest,
        approver: &EntityRef,
    ) -> InboxItem {
        let mut event = EventRef::new("follow-request", &request.id);
        event.type_key = Some("follow-request.pending".to_string());
        event.occurred_at = request.created_at;

        let mut item = InboxItem::new(
            &request.tenant_id,
            approver.clone(),
            InboxKind::Request,
            event,
        );
        item.targets = vec![request.requester.clone(), request.target.clone()];
        item.dedup_key = Some(keys::dedup_key(
            &format!("{}:pending", request.id),
            approver,
        ));
        item
    }

    /// Regular notification item telling the requester the outcome
    async fn notify_requester_of_decision(&self, request: &FollowRequest) -> Result<()> {
        let decision = match request.status {
            FollowStatus::Approved => "approved",
            FollowStatus::Denied => "denied",
            FollowStatus::Pending => return Ok(()),
        };

        let mut event = EventRef::new("follow-request", &request.id);
        event.type_key = Some(format!("follow-request.{decision}"));
        event.occurred_at = request.decided_at;

        let mut item = InboxItem::new(
            &request.tenant_id,
            request.requester.clone(),
            InboxKind::Notification,
            event,
        );
        item.targets = vec![request.target.clone()];
        if let Some(decided_by) = &request.decided_by {
            if !item.targets.contains(decided_by) {
                item.targets.push(decided_by.clone());
            }
        }
        item.body = request.decision_reason.clone();
        item.dedup_key = Some(keys::dedup_key(
            &format!("{}:{}", request.id, decision),
            &request.requester,
        ));

        self.add(item).await?;
        Ok(())
    }
}
