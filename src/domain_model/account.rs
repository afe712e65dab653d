use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque account identifier handed out by the account directory.
/// Compared byte-for-byte, never case-folded.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        AccountId(s.to_owned())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        AccountId(s)
    }
}

/// Unordered pair of accounts, stored as `(min, max)`.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct AccountPair(AccountId, AccountId);

impl AccountPair {
    pub fn new(a: &AccountId, b: &AccountId) -> Self {
        if a < b {
            Self(a.clone(), b.clone())
        } else {
            Self(b.clone(), a.clone())
        }
    }

    pub fn min(&self) -> &AccountId {
        &self.0
    }

    pub fn max(&self) -> &AccountId {
        &self.1
    }

    pub fn contains(&self, account: &AccountId) -> bool {
        &self.0 == account || &self.1 == account
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub display_name: String,
}

impl Account {
    pub fn new(account_id: impl Into<AccountId>, display_name: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            display_name: display_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_order_independent() {
        let a = AccountId::from("alice");
        let b = AccountId::from("bob");

        assert_eq!(AccountPair::new(&a, &b), AccountPair::new(&b, &a));
        assert_eq!(AccountPair::min(&AccountPair::new(&b, &a)), &a);
        assert_eq!(AccountPair::max(&AccountPair::new(&b, &a)), &b);
    }

    #[test]
    fn pair_key_is_case_sensitive() {
        let lower = AccountId::from("u1");
        let upper = AccountId::from("U1");
        let other = AccountId::from("u2");

        assert_ne!(
            AccountPair::new(&lower, &other),
            AccountPair::new(&upper, &other)
        );
        assert!(!AccountPair::new(&lower, &other).contains(&upper));
    }
}
