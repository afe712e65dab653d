use crate::application_port::*;
use crate::domain_model::*;

pub enum EdgeClaim {
    /// This call stored the pending edge.
    Won(FriendshipEdge),
    /// The pair was already occupied by this edge.
    Existing(FriendshipEdge),
}

/// Edge storage keyed by the normalized account pair.
///
/// Mutations are atomic per pair. `update_status` and `delete_edge` are
/// compare-and-swap on the expected edge's id and status and fail with
/// `RelationError::ConcurrentConflict` when the stored edge moved on.
#[async_trait::async_trait]
pub trait FriendshipRepo: Send + Sync {
    async fn find_edge(
        &self,
        a: &AccountId,
        b: &AccountId,
    ) -> Result<Option<FriendshipEdge>, RelationError>;

    async fn insert_edge(
        &self,
        requester: &AccountId,
        addressee: &AccountId,
    ) -> Result<EdgeClaim, RelationError>;

    async fn update_status(
        &self,
        expected: &FriendshipEdge,
        status: FriendshipStatus,
    ) -> Result<FriendshipEdge, RelationError>;

    async fn delete_edge(&self, expected: &FriendshipEdge) -> Result<(), RelationError>;

    /// Every edge touching `account`, either side, any status, in a stable order.
    async fn edges_involving(
        &self,
        account: &AccountId,
    ) -> Result<Vec<FriendshipEdge>, RelationError>;
}
