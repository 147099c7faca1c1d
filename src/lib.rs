//! Herald - inbox notification fan-out and follow-request governance
//!
//! "How beautiful upon the mountains are the feet of him who brings good
//! news" - Isaiah 52:7
//!
//! Herald turns a published social activity into per-recipient inbox
//! entries and mediates follow/subscribe requests that may require
//! approval. It owns the inbox item and follow request lifecycles; the
//! relationship graph, identity directory and content stores are external
//! collaborators reached through injected traits.
//!
//! ## Components
//!
//! - **Orchestrator**: activity fan-out and the follow-request state machine
//! - **Normalizer/Validator**: pure canonicalization and rule checks
//! - **Keys**: deterministic dedup, thread and idempotency keys
//! - **Policies**: pluggable recipient expansion and governance seams
//! - **Stores**: abstract persistence contracts plus in-memory defaults

pub mod config;
pub mod keys;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod policy;
pub mod relationship;
pub mod store;
pub mod types;
pub mod validate;

pub use config::HeraldConfig;
pub use model::{
    ActivityRecord, EntityRef, EventRef, FollowRequest, FollowStatus, InboxItem, InboxKind,
    InboxPage, InboxQuery, InboxStatus, RelationKind,
};
pub use orchestrator::NotificationOrchestrator;
pub use policy::{GovernancePolicy, IdGenerator, RecipientExpansion};
pub use relationship::{RelationshipEdge, RelationshipService, VisibilityDecision};
pub use store::{FollowRequestStore, InboxStore, MemoryFollowRequestStore, MemoryInboxStore};
pub use types::{HeraldError, Result, ValidationIssue};
