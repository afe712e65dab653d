use crate::application_port::*;
use crate::domain_model::*;
use sqlx::Row;
use sqlx::mysql::{MySqlDatabaseError, MySqlRow};
use std::future::Future;
use std::time::Duration;

pub fn is_dup_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return mysql_err.number() == 1062; // ER_DUP_ENTRY
        }
    }

    false
}

/// Bounds a store call; a timeout becomes `StoreUnavailable`, the inner
/// sqlx result is handed back untouched.
pub async fn timed<T, F>(
    timeout: Duration,
    what: &str,
    fut: F,
) -> Result<Result<T, sqlx::Error>, RelationError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    tokio::time::timeout(timeout, fut).await.map_err(|_| {
        RelationError::StoreUnavailable(format!("{what}: timed out after {timeout:?}"))
    })
}

/// Like [`timed`], with sqlx errors mapped to `StoreUnavailable` as well.
pub async fn run<T, F>(timeout: Duration, what: &str, fut: F) -> Result<T, RelationError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    timed(timeout, what, fut)
        .await?
        .map_err(|e| RelationError::StoreUnavailable(format!("{what}: {e}")))
}

/// Id columns are `VARBINARY`; bound and read back as raw bytes.
pub fn id_bytes(id: &AccountId) -> &[u8] {
    id.as_str().as_bytes()
}

pub fn account_id_from_bytes(bytes: Vec<u8>) -> Result<AccountId, RelationError> {
    String::from_utf8(bytes)
        .map(AccountId::from)
        .map_err(|e| RelationError::StoreUnavailable(format!("decode account id: {e}")))
}

pub fn decode_account_id(row: &MySqlRow, column: &str) -> Result<AccountId, RelationError> {
    let bytes: Vec<u8> = row
        .try_get(column)
        .map_err(|e| RelationError::StoreUnavailable(format!("decode {column}: {e}")))?;
    account_id_from_bytes(bytes)
}

pub fn decode_edge(row: &MySqlRow) -> Result<FriendshipEdge, RelationError> {
    let decode =
        |e: sqlx::Error| RelationError::StoreUnavailable(format!("decode friendship: {e}"));

    let status = row
        .try_get::<String, _>("status")
        .map_err(decode)?
        .parse::<FriendshipStatus>()
        .map_err(RelationError::StoreUnavailable)?;

    Ok(FriendshipEdge {
        friendship_id: row.try_get("friendship_id").map_err(decode)?,
        requester: decode_account_id(row, "requester_id")?,
        addressee: decode_account_id(row, "addressee_id")?,
        status,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stalled_call_times_out_as_store_unavailable() {
        let res = run(
            Duration::from_millis(5),
            "select friendship",
            std::future::pending::<Result<(), sqlx::Error>>(),
        )
        .await;

        match res {
            Err(err @ RelationError::StoreUnavailable(_)) => {
                assert!(err.is_retryable());
                assert!(err.to_string().contains("timed out"));
            }
            other => panic!("expected StoreUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn timed_hands_back_sqlx_errors_untouched() {
        let res = timed(Duration::from_secs(1), "insert friendship", async {
            Err::<(), _>(sqlx::Error::RowNotFound)
        })
        .await
        .unwrap();

        assert!(matches!(res, Err(sqlx::Error::RowNotFound)));
    }

    #[tokio::test]
    async fn sqlx_errors_become_store_unavailable() {
        let res = run(Duration::from_secs(1), "list friendships", async {
            Err::<(), _>(sqlx::Error::PoolTimedOut)
        })
        .await;

        assert!(matches!(res, Err(RelationError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn completed_call_passes_through() {
        let res = run(Duration::from_secs(1), "select friendship", async {
            Ok::<_, sqlx::Error>(7)
        })
        .await;

        assert_eq!(res.unwrap(), 7);
    }

    #[test]
    fn only_database_errors_are_dup_keys() {
        assert!(!is_dup_key(&sqlx::Error::RowNotFound));
        assert!(!is_dup_key(&sqlx::Error::PoolTimedOut));
    }

    #[test]
    fn account_ids_keep_their_exact_bytes() {
        let padded = account_id_from_bytes(b"u1 ".to_vec()).unwrap();
        assert_eq!(padded.as_str(), "u1 ");
        assert_ne!(padded, AccountId::from("u1"));
        assert_eq!(id_bytes(&padded), b"u1 ");

        assert!(matches!(
            account_id_from_bytes(vec![0xff, 0xfe]),
            Err(RelationError::StoreUnavailable(_))
        ));
    }
}
