//! Herald configuration and field limits
//!
//! The limits are part of the external contract: the validator rejects
//! records that exceed them and the orchestrator clamps query limits to
//! the same ceiling.

/// Maximum tenant id length
pub const MAX_TENANT_ID_LEN: usize = 100;

/// Maximum inbox item title length
pub const MAX_TITLE_LEN: usize = 500;

/// Maximum inbox item body length
pub const MAX_BODY_LEN: usize = 2000;

/// Maximum number of targets on one inbox item
pub const MAX_TARGETS: usize = 50;

/// Hard ceiling for inbox query page size
pub const MAX_QUERY_LIMIT: u32 = 200;

/// Tunables for the notification orchestrator
#[derive(Debug, Clone)]
pub struct HeraldConfig {
    /// Page-size ceiling applied to inbox queries (default: 200).
    /// The validator already rejects limits above [`MAX_QUERY_LIMIT`];
    /// this clamp only matters for callers that reach the store path
    /// without going through validation.
    pub max_query_limit: u32,
}

impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            max_query_limit: MAX_QUERY_LIMIT,
        }
    }
}
