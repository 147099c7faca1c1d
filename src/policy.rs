//! Pluggable policy seams
//!
//! Recipient expansion and governance are injected at orchestrator
//! construction, never global. The defaults here are the permissive
//! identity behaviors; deployments replace them without touching the
//! fan-out logic.

use async_trait::async_trait;

use crate::model::{EntityRef, RelationKind};
use crate::types::Result;

/// Maps one resolved recipient to a list of effective recipients.
///
/// Exists so a future broadcast target (e.g. a recipient that represents a
/// team) can expand to its members without changing the orchestrator.
#[async_trait]
pub trait RecipientExpansion: Send + Sync {
    async fn expand(&self, tenant_id: &str, recipient: &EntityRef) -> Result<Vec<EntityRef>>;
}

/// Default expansion: one recipient in, the same recipient out
pub struct IdentityExpansion;

#[async_trait]
impl RecipientExpansion for IdentityExpansion {
    async fn expand(&self, _tenant_id: &str, recipient: &EntityRef) -> Result<Vec<EntityRef>> {
        Ok(vec![recipient.clone()])
    }
}

/// Governance decisions for targetability and relationship approval
#[async_trait]
pub trait GovernancePolicy: Send + Sync {
    /// `false` means the entity must not receive notifications or be
    /// followed (e.g. a deactivated account)
    async fn is_targetable(&self, tenant_id: &str, entity: &EntityRef) -> Result<bool>;

    /// Whether a follow/subscribe request to `target` needs a decision
    async fn requires_approval_to_follow(
        &self,
        tenant_id: &str,
        requester: &EntityRef,
        target: &EntityRef,
        kind: RelationKind,
    ) -> Result<bool>;

    /// Who gets notified when a request to `target` awaits a decision
    async fn get_approvers(&self, tenant_id: &str, target: &EntityRef) -> Result<Vec<EntityRef>>;
}

/// Default governance: everything is targetable, nothing needs approval,
/// and the target itself is its only approver.
pub struct OpenGovernance;

#[async_trait]
impl GovernancePolicy for OpenGovernance {
    async fn is_targetable(&self, _tenant_id: &str, _entity: &EntityRef) -> Result<bool> {
        Ok(true)
    }

    async fn requires_approval_to_follow(
        &self,
        _tenant_id: &str,
        _requester: &EntityRef,
        _target: &EntityRef,
        _kind: RelationKind,
    ) -> Result<bool> {
        Ok(false)
    }

    async fn get_approvers(&self, _tenant_id: &str, target: &EntityRef) -> Result<Vec<EntityRef>> {
        Ok(vec![target.clone()])
    }
}

/// Injected id source; any collision-resistant scheme is acceptable
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}

/// Default id source: random uuid v4, hyphenless
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}
