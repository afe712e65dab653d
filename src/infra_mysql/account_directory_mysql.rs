use super::util::{decode_account_id, id_bytes, run};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::collections::HashMap;
use std::time::Duration;

pub struct MySqlAccountDirectory {
    pool: MySqlPool,
    timeout: Duration,
}

impl MySqlAccountDirectory {
    pub fn new(pool: MySqlPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

fn decode_account(row: &MySqlRow) -> Result<Account, RelationError> {
    let decode = |e: sqlx::Error| RelationError::StoreUnavailable(format!("decode account: {e}"));
    Ok(Account {
        account_id: decode_account_id(row, "account_id")?,
        display_name: row.try_get("display_name").map_err(decode)?,
    })
}

#[async_trait::async_trait]
impl AccountDirectory for MySqlAccountDirectory {
    async fn get_accounts(&self, ids: &[AccountId]) -> Result<Vec<Account>, RelationError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT account_id, display_name FROM account WHERE account_id IN ({placeholders})"
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id_bytes(id));
        }

        let rows = run(self.timeout, "select accounts", query.fetch_all(&self.pool)).await?;

        let mut by_id = rows
            .iter()
            .map(|row| decode_account(row).map(|a| (a.account_id.clone(), a)))
            .collect::<Result<HashMap<_, _>, _>>()?;

        // keep the caller's order
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, RelationError> {
        let rows = run(
            self.timeout,
            "list accounts",
            sqlx::query("SELECT account_id, display_name FROM account ORDER BY account_id")
                .fetch_all(&self.pool),
        )
        .await?;

        rows.iter().map(decode_account).collect()
    }
}
