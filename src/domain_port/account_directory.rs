use crate::application_port::*;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Accounts for `ids`, in the same order. Unknown ids are left out.
    async fn get_accounts(&self, ids: &[AccountId]) -> Result<Vec<Account>, RelationError>;

    /// The full roster.
    async fn list_accounts(&self) -> Result<Vec<Account>, RelationError>;
}
