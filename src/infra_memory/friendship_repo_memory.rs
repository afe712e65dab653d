use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::BTreeSet;

/// Process-local edge store.
///
/// The pair map is the uniqueness boundary: every mutation runs while holding
/// the map entry for its pair, so two writers on one pair serialize. The
/// per-account index is maintained under that same entry guard.
#[derive(Default)]
pub struct InMemoryFriendshipRepo {
    edges: DashMap<AccountPair, FriendshipEdge>,
    by_account: DashMap<AccountId, BTreeSet<AccountPair>>,
}

impl InMemoryFriendshipRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn index(&self, edge: &FriendshipEdge) {
        let pair = edge.pair();
        for account in [&edge.requester, &edge.addressee] {
            self.by_account
                .entry(account.clone())
                .or_default()
                .insert(pair.clone());
        }
    }

    fn unindex(&self, edge: &FriendshipEdge) {
        let pair = edge.pair();
        for account in [&edge.requester, &edge.addressee] {
            if let Some(mut pairs) = self.by_account.get_mut(account) {
                pairs.remove(&pair);
            }
            self.by_account.remove_if(account, |_, pairs| pairs.is_empty());
        }
    }
}

#[async_trait::async_trait]
impl FriendshipRepo for InMemoryFriendshipRepo {
    async fn find_edge(
        &self,
        a: &AccountId,
        b: &AccountId,
    ) -> Result<Option<FriendshipEdge>, RelationError> {
        Ok(self
            .edges
            .get(&AccountPair::new(a, b))
            .map(|edge| edge.value().clone()))
    }

    async fn insert_edge(
        &self,
        requester: &AccountId,
        addressee: &AccountId,
    ) -> Result<EdgeClaim, RelationError> {
        if requester == addressee {
            return Err(RelationError::InvalidOperation(
                "cannot store a friendship with self".to_string(),
            ));
        }

        match self.edges.entry(AccountPair::new(requester, addressee)) {
            Entry::Occupied(occupied) => Ok(EdgeClaim::Existing(occupied.get().clone())),
            Entry::Vacant(vacant) => {
                let edge = FriendshipEdge::new_pending(requester.clone(), addressee.clone());
                self.index(&edge);
                vacant.insert(edge.clone());
                Ok(EdgeClaim::Won(edge))
            }
        }
    }

    async fn update_status(
        &self,
        expected: &FriendshipEdge,
        status: FriendshipStatus,
    ) -> Result<FriendshipEdge, RelationError> {
        match self.edges.entry(expected.pair()) {
            Entry::Occupied(mut occupied) if occupied.get().same_revision(expected) => {
                let edge = occupied.get_mut();
                edge.status = status;
                edge.updated_at = Utc::now();
                Ok(edge.clone())
            }
            _ => Err(RelationError::ConcurrentConflict),
        }
    }

    async fn delete_edge(&self, expected: &FriendshipEdge) -> Result<(), RelationError> {
        match self.edges.entry(expected.pair()) {
            Entry::Occupied(occupied) if occupied.get().same_revision(expected) => {
                self.unindex(occupied.get());
                occupied.remove();
                Ok(())
            }
            _ => Err(RelationError::ConcurrentConflict),
        }
    }

    async fn edges_involving(
        &self,
        account: &AccountId,
    ) -> Result<Vec<FriendshipEdge>, RelationError> {
        let pairs = match self.by_account.get(account) {
            Some(pairs) => pairs.value().clone(),
            None => return Ok(Vec::new()),
        };

        // index and pair map are read separately; a pair deleted in between is skipped
        Ok(pairs
            .iter()
            .filter_map(|pair| self.edges.get(pair).map(|edge| edge.value().clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn id(s: &str) -> AccountId {
        AccountId::from(s)
    }

    #[tokio::test]
    async fn insert_claims_pair_in_either_orientation() {
        let repo = InMemoryFriendshipRepo::new();

        let first = repo.insert_edge(&id("u1"), &id("u2")).await.unwrap();
        let second = repo.insert_edge(&id("u2"), &id("u1")).await.unwrap();

        let won = match first {
            EdgeClaim::Won(edge) => edge,
            EdgeClaim::Existing(_) => panic!("first insert must win"),
        };
        match second {
            EdgeClaim::Existing(edge) => assert_eq!(edge, won),
            EdgeClaim::Won(_) => panic!("pair already occupied"),
        }
        assert_eq!(repo.edge_count(), 1);
        assert_eq!(repo.find_edge(&id("u2"), &id("u1")).await.unwrap(), Some(won));
    }

    #[tokio::test]
    async fn lookups_are_case_sensitive() {
        let repo = InMemoryFriendshipRepo::new();
        repo.insert_edge(&id("u1"), &id("u2")).await.unwrap();

        assert!(repo.find_edge(&id("U1"), &id("u2")).await.unwrap().is_none());
        assert!(repo.edges_involving(&id("U1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_compare_and_swap_is_a_conflict() {
        let repo = InMemoryFriendshipRepo::new();
        let EdgeClaim::Won(pending) = repo.insert_edge(&id("u1"), &id("u2")).await.unwrap() else {
            panic!("expected a fresh edge");
        };

        let accepted = repo
            .update_status(&pending, FriendshipStatus::Accepted)
            .await
            .unwrap();
        assert!(accepted.is_accepted());

        // the pending snapshot is stale now
        assert!(matches!(
            repo.update_status(&pending, FriendshipStatus::Accepted).await,
            Err(RelationError::ConcurrentConflict)
        ));
        assert!(matches!(
            repo.delete_edge(&pending).await,
            Err(RelationError::ConcurrentConflict)
        ));

        repo.delete_edge(&accepted).await.unwrap();
        assert!(matches!(
            repo.delete_edge(&accepted).await,
            Err(RelationError::ConcurrentConflict)
        ));
    }

    #[tokio::test]
    async fn delete_clears_the_account_index() {
        let repo = InMemoryFriendshipRepo::new();
        let EdgeClaim::Won(edge) = repo.insert_edge(&id("u1"), &id("u2")).await.unwrap() else {
            panic!("expected a fresh edge");
        };
        repo.insert_edge(&id("u3"), &id("u1")).await.unwrap();

        assert_eq!(repo.edges_involving(&id("u1")).await.unwrap().len(), 2);

        repo.delete_edge(&edge).await.unwrap();

        let left = repo.edges_involving(&id("u1")).await.unwrap();
        assert_eq!(left.len(), 1);
        assert!(left[0].involves(&id("u3")));
        assert!(repo.edges_involving(&id("u2")).await.unwrap().is_empty());
        assert!(!repo.by_account.contains_key(&id("u2")));
        assert!(repo.by_account.contains_key(&id("u1")));
    }

    #[tokio::test]
    async fn index_drops_accounts_without_edges() {
        let repo = InMemoryFriendshipRepo::new();
        for peer in ["u2", "u3", "u4"] {
            let EdgeClaim::Won(edge) = repo.insert_edge(&id("u1"), &id(peer)).await.unwrap() else {
                panic!("expected a fresh edge");
            };
            repo.delete_edge(&edge).await.unwrap();
        }

        assert_eq!(repo.edge_count(), 0);
        assert!(repo.by_account.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_leave_one_edge() {
        let repo = Arc::new(InMemoryFriendshipRepo::new());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    if i % 2 == 0 {
                        repo.insert_edge(&id("a"), &id("b")).await
                    } else {
                        repo.insert_edge(&id("b"), &id("a")).await
                    }
                })
            })
            .collect();

        let mut won = 0;
        for handle in handles {
            if let EdgeClaim::Won(_) = handle.await.unwrap().unwrap() {
                won += 1;
            }
        }

        assert_eq!(won, 1);
        assert_eq!(repo.edge_count(), 1);
    }
}
