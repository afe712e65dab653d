use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

#[derive(Default)]
pub struct InMemoryAccountDirectory {
    accounts: DashMap<AccountId, Account>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let directory = Self::new();
        for account in accounts {
            directory.upsert(account);
        }
        directory
    }

    pub fn upsert(&self, account: Account) {
        self.accounts.insert(account.account_id.clone(), account);
    }
}

#[async_trait::async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn get_accounts(&self, ids: &[AccountId]) -> Result<Vec<Account>, RelationError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.accounts.get(id).map(|a| a.value().clone()))
            .collect())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, RelationError> {
        let mut roster: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        roster.sort_by(|a, b| a.account_id.cmp(&b.account_id));
        Ok(roster)
    }
}
