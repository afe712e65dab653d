use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::settings::{Settings, StoreBackend};
use anyhow::anyhow;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The friendship services wired against one store backend.
pub struct FriendshipEngine {
    pub friendship_service: Arc<dyn FriendshipService>,
    pub query_service: Arc<dyn RelationshipQueryService>,
    pool: Option<MySqlPool>,
}

impl FriendshipEngine {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        match settings.store.backend {
            StoreBackend::Memory => {
                let accounts = settings
                    .directory
                    .accounts
                    .iter()
                    .map(|seed| Account::new(seed.id.as_str(), seed.display_name.as_str()));
                info!(
                    accounts = settings.directory.accounts.len(),
                    "using in-memory friendship store"
                );
                Ok(Self::in_memory(accounts))
            }
            StoreBackend::Mysql => {
                let dsn = settings
                    .store
                    .dsn
                    .as_deref()
                    .ok_or_else(|| anyhow!("store.dsn is required for the mysql backend"))?;
                let timeout = Duration::from_millis(settings.store.timeout_ms);

                let pool = MySqlPoolOptions::new()
                    .max_connections(settings.store.max_connections)
                    .acquire_timeout(timeout)
                    .connect(dsn)
                    .await?;

                let friendship_repo: Arc<dyn FriendshipRepo> =
                    Arc::new(MySqlFriendshipRepo::new(pool.clone(), timeout));
                let account_directory: Arc<dyn AccountDirectory> =
                    Arc::new(MySqlAccountDirectory::new(pool.clone(), timeout));

                info!(timeout_ms = settings.store.timeout_ms, "using mysql friendship store");
                Ok(Self::from_parts(friendship_repo, account_directory, Some(pool)))
            }
        }
    }

    pub fn in_memory(accounts: impl IntoIterator<Item = Account>) -> Self {
        let friendship_repo: Arc<dyn FriendshipRepo> = Arc::new(InMemoryFriendshipRepo::new());
        let account_directory: Arc<dyn AccountDirectory> =
            Arc::new(InMemoryAccountDirectory::with_accounts(accounts));
        Self::from_parts(friendship_repo, account_directory, None)
    }

    fn from_parts(
        friendship_repo: Arc<dyn FriendshipRepo>,
        account_directory: Arc<dyn AccountDirectory>,
        pool: Option<MySqlPool>,
    ) -> Self {
        let friendship_service: Arc<dyn FriendshipService> =
            Arc::new(RealFriendshipService::new(friendship_repo.clone()));
        let query_service: Arc<dyn RelationshipQueryService> = Arc::new(
            RealRelationshipQueryService::new(friendship_repo, account_directory),
        );

        Self {
            friendship_service,
            query_service,
            pool,
        }
    }

    pub async fn shutdown(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
        info!("friendship engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::parse_settings_str;

    #[tokio::test]
    async fn memory_backend_uses_seed_roster() {
        let settings = parse_settings_str(
            r#"
[log]
filter = "info"

[store]
backend = "memory"

[[directory.accounts]]
id = "u1"
display_name = "Ada"

[[directory.accounts]]
id = "u2"
display_name = "Grace"
"#,
        )
        .unwrap();

        let engine = FriendshipEngine::try_new(&settings).await.unwrap();
        let candidates = engine.query_service.non_friends(&"u1".into()).await.unwrap();
        assert_eq!(candidates, vec![Account::new("u2", "Grace")]);
        engine.shutdown().await;
    }

    #[tokio::test]
    async fn mysql_backend_needs_a_dsn() {
        let settings = parse_settings_str(
            r#"
[log]
filter = "info"

[store]
backend = "mysql"
"#,
        )
        .unwrap();

        assert!(FriendshipEngine::try_new(&settings).await.is_err());
    }
}
