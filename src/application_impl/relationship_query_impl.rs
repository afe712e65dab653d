use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

pub struct RealRelationshipQueryService {
    friendship_repo: Arc<dyn FriendshipRepo>,
    account_directory: Arc<dyn AccountDirectory>,
}

impl RealRelationshipQueryService {
    pub fn new(
        friendship_repo: Arc<dyn FriendshipRepo>,
        account_directory: Arc<dyn AccountDirectory>,
    ) -> Self {
        Self {
            friendship_repo,
            account_directory,
        }
    }

    async fn accounts_for(&self, ids: &[AccountId]) -> Result<Vec<Account>, RelationError> {
        let accounts = self.account_directory.get_accounts(ids).await?;
        if accounts.len() < ids.len() {
            warn!(
                missing = ids.len() - accounts.len(),
                "friendship edges reference accounts unknown to the directory"
            );
        }
        Ok(accounts)
    }

    async fn pending_edges(
        &self,
        account: &AccountId,
        side: fn(&FriendshipEdge) -> &AccountId,
    ) -> Result<Vec<FriendshipEdge>, RelationError> {
        Ok(self
            .friendship_repo
            .edges_involving(account)
            .await?
            .into_iter()
            .filter(|edge| edge.is_pending() && side(edge) == account)
            .collect())
    }

    async fn with_counterparts(
        &self,
        account: &AccountId,
        edges: Vec<FriendshipEdge>,
    ) -> Result<Vec<FriendRequestEntry>, RelationError> {
        let ids: Vec<AccountId> = edges.iter().map(|e| e.other(account).clone()).collect();
        let mut by_id: HashMap<AccountId, Account> = self
            .accounts_for(&ids)
            .await?
            .into_iter()
            .map(|a| (a.account_id.clone(), a))
            .collect();

        Ok(edges
            .into_iter()
            .filter_map(|edge| {
                let counterpart = by_id.remove(edge.other(account))?;
                Some(FriendRequestEntry { edge, counterpart })
            })
            .collect())
    }
}

fn requester_of(edge: &FriendshipEdge) -> &AccountId {
    &edge.requester
}

fn addressee_of(edge: &FriendshipEdge) -> &AccountId {
    &edge.addressee
}

#[async_trait::async_trait]
impl RelationshipQueryService for RealRelationshipQueryService {
    async fn friends(&self, account: &AccountId) -> Result<Vec<Account>, RelationError> {
        let friend_ids: Vec<AccountId> = self
            .friendship_repo
            .edges_involving(account)
            .await?
            .iter()
            .filter(|edge| edge.is_accepted())
            .map(|edge| edge.other(account).clone())
            .collect();

        self.accounts_for(&friend_ids).await
    }

    async fn non_friends(&self, account: &AccountId) -> Result<Vec<Account>, RelationError> {
        let (edges, roster) = futures_util::try_join!(
            self.friendship_repo.edges_involving(account),
            self.account_directory.list_accounts(),
        )?;

        let related: HashSet<&AccountId> = edges.iter().map(|edge| edge.other(account)).collect();

        Ok(roster
            .into_iter()
            .filter(|a| &a.account_id != account && !related.contains(&a.account_id))
            .collect())
    }

    async fn pending_received(
        &self,
        account: &AccountId,
    ) -> Result<Vec<FriendshipEdge>, RelationError> {
        self.pending_edges(account, addressee_of).await
    }

    async fn pending_sent(
        &self,
        account: &AccountId,
    ) -> Result<Vec<FriendshipEdge>, RelationError> {
        self.pending_edges(account, requester_of).await
    }

    async fn search_friends_by_name(
        &self,
        account: &AccountId,
        partial_name: &str,
    ) -> Result<Vec<Account>, RelationError> {
        let needle = partial_name.to_lowercase();
        Ok(self
            .friends(account)
            .await?
            .into_iter()
            .filter(|friend| friend.display_name.to_lowercase().contains(&needle))
            .collect())
    }

    async fn friend_requests(&self, account: &AccountId) -> Result<FriendRequests, RelationError> {
        let (received, sent): (Vec<_>, Vec<_>) = self
            .friendship_repo
            .edges_involving(account)
            .await?
            .into_iter()
            .filter(FriendshipEdge::is_pending)
            .partition(|edge| &edge.addressee == account);

        Ok(FriendRequests {
            received: self.with_counterparts(account, received).await?,
            sent: self.with_counterparts(account, sent).await?,
        })
    }

    async fn are_friends(&self, a: &AccountId, b: &AccountId) -> Result<bool, RelationError> {
        if a == b {
            return Ok(false);
        }
        Ok(self
            .friendship_repo
            .find_edge(a, b)
            .await?
            .is_some_and(|edge| edge.is_accepted()))
    }

    async fn friend_by_id(
        &self,
        viewer: &AccountId,
        friend: &AccountId,
    ) -> Result<Option<Account>, RelationError> {
        if !self.are_friends(viewer, friend).await? {
            return Ok(None);
        }
        Ok(self
            .accounts_for(std::slice::from_ref(friend))
            .await?
            .into_iter()
            .next())
    }
}
