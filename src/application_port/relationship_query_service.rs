use crate::application_port::RelationError;
use crate::domain_model::*;
use serde::Serialize;

/// One row of the requests inbox: the edge plus the account on the other side.
#[derive(Debug, Clone, Serialize)]
pub struct FriendRequestEntry {
    pub edge: FriendshipEdge,
    pub counterpart: Account,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FriendRequests {
    /// Invites addressed to the account.
    pub received: Vec<FriendRequestEntry>,
    /// Invites the account sent that are still unanswered.
    pub sent: Vec<FriendRequestEntry>,
}

#[async_trait::async_trait]
pub trait RelationshipQueryService: Send + Sync {
    async fn friends(&self, account: &AccountId) -> Result<Vec<Account>, RelationError>;

    /// Accounts with no relationship history at all with `account`.
    async fn non_friends(&self, account: &AccountId) -> Result<Vec<Account>, RelationError>;

    async fn pending_received(
        &self,
        account: &AccountId,
    ) -> Result<Vec<FriendshipEdge>, RelationError>;

    async fn pending_sent(&self, account: &AccountId)
    -> Result<Vec<FriendshipEdge>, RelationError>;

    async fn search_friends_by_name(
        &self,
        account: &AccountId,
        partial_name: &str,
    ) -> Result<Vec<Account>, RelationError>;

    async fn friend_requests(&self, account: &AccountId) -> Result<FriendRequests, RelationError>;

    async fn are_friends(&self, a: &AccountId, b: &AccountId) -> Result<bool, RelationError>;

    async fn friend_by_id(
        &self,
        viewer: &AccountId,
        friend: &AccountId,
    ) -> Result<Option<Account>, RelationError>;
}
