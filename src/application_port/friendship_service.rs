use crate::domain_model::*;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("concurrent update on the same account pair")]
    ConcurrentConflict,
}

impl RelationError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RelationError::StoreUnavailable(_) | RelationError::ConcurrentConflict
        )
    }
}

/// What `send_request` did to the pair.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", content = "edge", rename_all = "snake_case")]
pub enum SendOutcome {
    /// A fresh pending edge was stored.
    Created(FriendshipEdge),
    /// The same invite was already pending.
    AlreadyPending(FriendshipEdge),
    /// The other side had already invited the requester; the edge is now accepted.
    AutoAccepted(FriendshipEdge),
    AlreadyFriends(FriendshipEdge),
}

impl SendOutcome {
    pub fn edge(&self) -> &FriendshipEdge {
        match self {
            SendOutcome::Created(edge)
            | SendOutcome::AlreadyPending(edge)
            | SendOutcome::AutoAccepted(edge)
            | SendOutcome::AlreadyFriends(edge) => edge,
        }
    }
}

/// The friendship state machine. Every call names the acting account first.
#[async_trait::async_trait]
pub trait FriendshipService: Send + Sync {
    async fn send_request(
        &self,
        requester: &AccountId,
        addressee: &AccountId,
    ) -> Result<SendOutcome, RelationError>;

    async fn accept_request(
        &self,
        addressee: &AccountId,
        requester: &AccountId,
    ) -> Result<FriendshipEdge, RelationError>;

    async fn reject_request(
        &self,
        addressee: &AccountId,
        requester: &AccountId,
    ) -> Result<(), RelationError>;

    async fn cancel_invitation(
        &self,
        requester: &AccountId,
        addressee: &AccountId,
    ) -> Result<(), RelationError>;

    async fn unfriend(&self, me: &AccountId, friend: &AccountId) -> Result<(), RelationError>;

    async fn resolve_status(
        &self,
        viewer: &AccountId,
        target: &AccountId,
    ) -> Result<ViewerStatus, RelationError>;
}
