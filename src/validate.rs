//! Pure validation rules
//!
//! Every function returns a list of [`ValidationIssue`]s; an empty list
//! means valid. Nothing here throws or touches state. The orchestrator
//! turns a non-empty list into [`HeraldError::Validation`] before any
//! side effect occurs.
//!
//! [`HeraldError::Validation`]: crate::types::HeraldError::Validation

use crate::config::{
    MAX_BODY_LEN, MAX_QUERY_LIMIT, MAX_TARGETS, MAX_TENANT_ID_LEN, MAX_TITLE_LEN,
};
use crate::model::{EntityRef, EventRef, FollowRequest, InboxItem, InboxQuery};
use crate::types::ValidationIssue;

/// Issue codes used across all rules
pub mod codes {
    pub const REQUIRED: &str = "required";
    pub const MAX_LENGTH: &str = "max_length";
    pub const OUT_OF_RANGE: &str = "out_of_range";
}

fn required(value: &str, path: &str, issues: &mut Vec<ValidationIssue>) {
    if value.trim().is_empty() {
        issues.push(ValidationIssue::new(
            codes::REQUIRED,
            format!("{path} is required"),
            path,
        ));
    }
}

fn max_length(value: &str, limit: usize, path: &str, issues: &mut Vec<ValidationIssue>) {
    if value.chars().count() > limit {
        issues.push(ValidationIssue::new(
            codes::MAX_LENGTH,
            format!("{path} exceeds {limit} characters"),
            path,
        ));
    }
}

/// Tenant id: required, at most 100 characters
pub fn tenant_id(tenant: &str, path: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    required(tenant, path, &mut issues);
    max_length(tenant, MAX_TENANT_ID_LEN, path, &mut issues);
    issues
}

/// Entity reference: kind, type and id all required
pub fn entity_ref(entity: &EntityRef, path: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    required(&entity.kind, &format!("{path}.kind"), &mut issues);
    required(&entity.entity_type, &format!("{path}.type"), &mut issues);
    required(&entity.id, &format!("{path}.id"), &mut issues);
    issues
}

/// Event reference: kind and id required
pub fn event_ref(event: &EventRef, path: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    required(&event.kind, &format!("{path}.kind"), &mut issues);
    required(&event.id, &format!("{path}.id"), &mut issues);
    issues
}

/// Inbox item: tenant, recipient, event, display limits, target limits,
/// thread count >= 1
pub fn inbox_item(item: &InboxItem) -> Vec<ValidationIssue> {
    let mut issues = tenant_id(&item.tenant_id, "tenantId");
    issues.extend(entity_ref(&item.recipient, "recipient"));
    issues.extend(event_ref(&item.event, "event"));

    if let Some(title) = &item.title {
        max_length(title, MAX_TITLE_LEN, "title", &mut issues);
    }
    if let Some(body) = &item.body {
        max_length(body, MAX_BODY_LEN, "body", &mut issues);
    }

    if item.targets.len() > MAX_TARGETS {
        issues.push(ValidationIssue::new(
            codes::OUT_OF_RANGE,
            format!("targets exceeds {MAX_TARGETS} entries"),
            "targets",
        ));
    }
    for (i, target) in item.targets.iter().enumerate() {
        issues.extend(entity_ref(target, &format!("targets[{i}]")));
    }

    if item.thread_count < 1 {
        issues.push(ValidationIssue::new(
            codes::OUT_OF_RANGE,
            "threadCount must be at least 1",
            "threadCount",
        ));
    }

    issues
}

/// Follow request: tenant, requester and target as entity references.
/// The requested kind is a closed enum, so no kind rule is needed here;
/// unknown kinds already fail at the deserialization boundary.
pub fn follow_request(request: &FollowRequest) -> Vec<ValidationIssue> {
    let mut issues = tenant_id(&request.tenant_id, "tenantId");
    issues.extend(entity_ref(&request.requester, "requester"));
    issues.extend(entity_ref(&request.target, "target"));
    issues
}

/// Inbox query: tenant, limit 1..=200, each recipient a valid entity ref
pub fn inbox_query(query: &InboxQuery) -> Vec<ValidationIssue> {
    let mut issues = tenant_id(&query.tenant_id, "tenantId");

    if query.limit < 1 || query.limit > MAX_QUERY_LIMIT {
        issues.push(ValidationIssue::new(
            codes::OUT_OF_RANGE,
            format!("limit must be between 1 and {MAX_QUERY_LIMIT}"),
            "limit",
        ));
    }

    for (i, recipient) in query.recipients.iter().enumerate() {
        issues.extend(entity_ref(recipient, &format!("recipients[{i}]")));
    }

    issues
}
