//! Deterministic dedup, thread and idempotency keys
//!
//! Keys are Sha256 digests of the normalized components joined with a
//! non-printable separator, truncated to 16 bytes of hex and prefixed with
//! the key kind. Determinism is the point: retried fan-outs and retried
//! client calls derive the same key and short-circuit on lookup.

use sha2::{Digest, Sha256};

use crate::model::{EntityRef, RelationKind};

/// Joins components unambiguously before hashing
const SEPARATOR: char = '\u{1f}';

fn digest(prefix: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(SEPARATOR.to_string().as_bytes());
        }
        hasher.update(part.as_bytes());
    }
    let hash = hasher.finalize();
    format!("{}:{}", prefix, hex::encode(&hash[..16]))
}

/// Exact-duplicate suppression key for one activity delivered to one recipient
pub fn dedup_key(event_id: &str, recipient: &EntityRef) -> String {
    digest("dd", &[event_id.trim(), &recipient.key()])
}

/// Grouping key for repeated events of the same shape:
/// `(first target or none, actor, activity type)`
pub fn thread_key(
    first_target: Option<&EntityRef>,
    actor: &EntityRef,
    type_key: Option<&str>,
) -> String {
    let target_key = first_target.map(|t| t.key()).unwrap_or_default();
    let type_key = type_key.map(|t| t.trim().to_lowercase()).unwrap_or_default();
    digest("th", &[&target_key, &actor.key(), &type_key])
}

/// Idempotency key for a follow request, derived when the client does not
/// supply one
pub fn idempotency_key(
    requester: &EntityRef,
    target: &EntityRef,
    kind: RelationKind,
    scope: Option<&str>,
) -> String {
    let scope = scope.map(|s| s.trim().to_lowercase()).unwrap_or_default();
    digest(
        "fr",
        &[&requester.key(), &target.key(), kind.as_str(), &scope],
    )
}
