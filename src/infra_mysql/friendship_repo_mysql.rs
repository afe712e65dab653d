use super::util::{decode_edge, id_bytes, is_dup_key, run, timed};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use sqlx::MySqlPool;
use std::time::Duration;

const SELECT_BY_PAIR: &str = r#"
SELECT friendship_id, requester_id, addressee_id, status, created_at, updated_at
FROM friendship
WHERE account_min = ? AND account_max = ?
"#;

const SELECT_BY_ACCOUNT: &str = r#"
SELECT friendship_id, requester_id, addressee_id, status, created_at, updated_at
FROM friendship
WHERE requester_id = ? OR addressee_id = ?
ORDER BY created_at ASC, friendship_id ASC
"#;

/// Edge store over the `friendship` table.
///
/// `UNIQUE (account_min, account_max)` is the one-edge-per-pair guard;
/// transitions are single conditional statements, so no transaction is held.
pub struct MySqlFriendshipRepo {
    pool: MySqlPool,
    timeout: Duration,
}

impl MySqlFriendshipRepo {
    pub fn new(pool: MySqlPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait::async_trait]
impl FriendshipRepo for MySqlFriendshipRepo {
    async fn find_edge(
        &self,
        a: &AccountId,
        b: &AccountId,
    ) -> Result<Option<FriendshipEdge>, RelationError> {
        let pair = AccountPair::new(a, b);

        let row = run(
            self.timeout,
            "select friendship",
            sqlx::query(SELECT_BY_PAIR)
                .bind(id_bytes(AccountPair::min(&pair)))
                .bind(id_bytes(AccountPair::max(&pair)))
                .fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(decode_edge).transpose()
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

        let edge = FriendshipEdge::new_pending(requester.clone(), addressee.clone());
        let pair = edge.pair();

        let res = timed(
            self.timeout,
            "insert friendship",
            sqlx::query(
                r#"
INSERT INTO friendship
    (friendship_id, account_min, account_max, requester_id, addressee_id, status, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#,
            )
            .bind(edge.friendship_id)
            .bind(id_bytes(AccountPair::min(&pair)))
            .bind(id_bytes(AccountPair::max(&pair)))
            .bind(id_bytes(&edge.requester))
            .bind(id_bytes(&edge.addressee))
            .bind(edge.status.as_str())
            .bind(edge.created_at)
            .bind(edge.updated_at)
            .execute(&self.pool),
        )
        .await?;

        match res {
            Ok(_) => Ok(EdgeClaim::Won(edge)),
            Err(e) if is_dup_key(&e) => match self.find_edge(requester, addressee).await? {
                Some(existing) => Ok(EdgeClaim::Existing(existing)),
                // the occupying edge was deleted before we could read it
                None => Err(RelationError::ConcurrentConflict),
            },
            Err(e) => Err(RelationError::StoreUnavailable(format!(
                "insert friendship: {e}"
            ))),
        }
    }

    async fn update_status(
        &self,
        expected: &FriendshipEdge,
        status: FriendshipStatus,
    ) -> Result<FriendshipEdge, RelationError> {
        let pair = expected.pair();
        let updated_at = Utc::now();

        let res = run(
            self.timeout,
            "update friendship status",
            sqlx::query(
                r#"
UPDATE friendship
SET status = ?, updated_at = ?
WHERE account_min = ? AND account_max = ? AND friendship_id = ? AND status = ?
"#,
            )
            .bind(status.as_str())
            .bind(updated_at)
            .bind(id_bytes(AccountPair::min(&pair)))
            .bind(id_bytes(AccountPair::max(&pair)))
            .bind(expected.friendship_id)
            .bind(expected.status.as_str())
            .execute(&self.pool),
        )
        .await?;

        if res.rows_affected() == 0 {
            return Err(RelationError::ConcurrentConflict);
        }

        Ok(FriendshipEdge {
            status,
            updated_at,
            ..expected.clone()
        })
    }

    async fn delete_edge(&self, expected: &FriendshipEdge) -> Result<(), RelationError> {
        let pair = expected.pair();

        let res = run(
            self.timeout,
            "delete friendship",
            sqlx::query(
                r#"
DELETE FROM friendship
WHERE account_min = ? AND account_max = ? AND friendship_id = ? AND status = ?
"#,
            )
            .bind(id_bytes(AccountPair::min(&pair)))
            .bind(id_bytes(AccountPair::max(&pair)))
            .bind(expected.friendship_id)
            .bind(expected.status.as_str())
            .execute(&self.pool),
        )
        .await?;

        if res.rows_affected() == 0 {
            return Err(RelationError::ConcurrentConflict);
        }

        Ok(())
    }

    async fn edges_involving(
        &self,
        account: &AccountId,
    ) -> Result<Vec<FriendshipEdge>, RelationError> {
        let rows = run(
            self.timeout,
            "list friendships",
            sqlx::query(SELECT_BY_ACCOUNT)
                .bind(id_bytes(account))
                .bind(id_bytes(account))
                .fetch_all(&self.pool),
        )
        .await?;

        rows.iter().map(decode_edge).collect()
    }
}
