//! Herald data model
//!
//! Structured records exchanged with callers and persisted through the
//! injected stores. No wire format is implied; everything is plain serde.

pub mod activity;
pub mod entity;
pub mod follow;
pub mod inbox;

pub use activity::ActivityRecord;
pub use entity::{EntityRef, EventRef};
pub use follow::{FollowRequest, FollowStatus, RelationKind};
pub use inbox::{InboxItem, InboxKind, InboxPage, InboxQuery, InboxStatus};
