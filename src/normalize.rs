//! Input canonicalization
//!
//! Pure, in-place normalization applied before validation or comparison:
//! tenant ids are trimmed and lowercased, every other string field is
//! trimmed. No validation happens here and empty fields stay empty.
//! Normalizing twice yields the same result as once.

use crate::model::{ActivityRecord, EntityRef, EventRef, FollowRequest, InboxItem, InboxQuery};

/// Canonical form of a tenant id: trimmed and lowercased, empty for `None`
pub fn tenant_id(raw: Option<&str>) -> String {
    raw.map(|s| s.trim().to_lowercase()).unwrap_or_default()
}

fn trim_in_place(s: &mut String) {
    let trimmed = s.trim();
    if trimmed.len() != s.len() {
        *s = trimmed.to_string();
    }
}

fn trim_opt(s: &mut Option<String>) {
    if let Some(v) = s {
        trim_in_place(v);
    }
}

/// Trim an entity reference's fields in place
pub fn entity_ref(e: &mut EntityRef) {
    trim_in_place(&mut e.kind);
    trim_in_place(&mut e.entity_type);
    trim_in_place(&mut e.id);
    trim_opt(&mut e.display);
}

/// Trim an event reference's fields in place
pub fn event_ref(e: &mut EventRef) {
    trim_in_place(&mut e.kind);
    trim_in_place(&mut e.id);
    trim_opt(&mut e.type_key);
}

/// Canonicalize an inbox item in place
pub fn inbox_item(item: &mut InboxItem) {
    item.tenant_id = tenant_id(Some(&item.tenant_id));
    trim_in_place(&mut item.id);
    entity_ref(&mut item.recipient);
    event_ref(&mut item.event);
    trim_opt(&mut item.title);
    trim_opt(&mut item.body);
    trim_opt(&mut item.dedup_key);
    trim_opt(&mut item.thread_key);
    for target in &mut item.targets {
        entity_ref(target);
    }
}

/// Canonicalize a follow request in place
pub fn follow_request(request: &mut FollowRequest) {
    request.tenant_id = tenant_id(Some(&request.tenant_id));
    trim_in_place(&mut request.id);
    entity_ref(&mut request.requester);
    entity_ref(&mut request.target);
    trim_opt(&mut request.idempotency_key);
    trim_opt(&mut request.scope);
    trim_opt(&mut request.filter);
    trim_opt(&mut request.decision_reason);
    if let Some(decided_by) = &mut request.decided_by {
        entity_ref(decided_by);
    }
}

/// Canonicalize an inbox query in place
pub fn inbox_query(query: &mut InboxQuery) {
    query.tenant_id = tenant_id(Some(&query.tenant_id));
    trim_opt(&mut query.cursor);
    for recipient in &mut query.recipients {
        entity_ref(recipient);
    }
}

/// Canonicalize a published activity in place
pub fn activity_record(activity: &mut ActivityRecord) {
    activity.tenant_id = tenant_id(Some(&activity.tenant_id));
    trim_in_place(&mut activity.id);
    trim_opt(&mut activity.type_key);
    entity_ref(&mut activity.actor);
    for target in &mut activity.targets {
        entity_ref(target);
    }
    if let Some(owner) = &mut activity.owner {
        entity_ref(owner);
    }
    trim_opt(&mut activity.title);
    trim_opt(&mut activity.body);
}
