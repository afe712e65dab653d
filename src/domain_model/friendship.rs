use crate::domain_model::{AccountId, AccountPair};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct FriendshipId(pub uuid::Uuid);

impl FriendshipId {
    pub fn new_v4() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for FriendshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
        }
    }
}

impl FromStr for FriendshipStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FriendshipStatus::Pending),
            "accepted" => Ok(FriendshipStatus::Accepted),
            other => Err(format!("unknown friendship status: {other}")),
        }
    }
}

/// A stored relationship between two accounts.
///
/// `requester` and `addressee` keep whoever originated the invite even after
/// acceptance; only while `Pending` does the direction carry meaning.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct FriendshipEdge {
    pub friendship_id: FriendshipId,
    pub requester: AccountId,
    pub addressee: AccountId,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FriendshipEdge {
    pub fn new_pending(requester: AccountId, addressee: AccountId) -> Self {
        let now = Utc::now();
        Self {
            friendship_id: FriendshipId::new_v4(),
            requester,
            addressee,
            status: FriendshipStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn pair(&self) -> AccountPair {
        AccountPair::new(&self.requester, &self.addressee)
    }

    pub fn is_pending(&self) -> bool {
        self.status == FriendshipStatus::Pending
    }

    pub fn is_accepted(&self) -> bool {
        self.status == FriendshipStatus::Accepted
    }

    pub fn involves(&self, account: &AccountId) -> bool {
        &self.requester == account || &self.addressee == account
    }

    /// The side of the edge that is not `account`.
    pub fn other(&self, account: &AccountId) -> &AccountId {
        if &self.requester == account {
            &self.addressee
        } else {
            &self.requester
        }
    }

    /// Same edge identity and state, used as the compare-and-swap guard.
    pub fn same_revision(&self, other: &FriendshipEdge) -> bool {
        self.friendship_id == other.friendship_id && self.status == other.status
    }
}

/// Relationship state as seen from the viewing account.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerStatus {
    CurrentUser,
    NotFriends,
    PendingSent,
    PendingReceived,
    Friends,
}

impl fmt::Display for ViewerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViewerStatus::CurrentUser => "current_user",
            ViewerStatus::NotFriends => "not_friends",
            ViewerStatus::PendingSent => "pending_sent",
            ViewerStatus::PendingReceived => "pending_received",
            ViewerStatus::Friends => "friends",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_side_of_edge() {
        let edge = FriendshipEdge::new_pending("u1".into(), "u2".into());

        assert_eq!(edge.other(&"u1".into()), &AccountId::from("u2"));
        assert_eq!(edge.other(&"u2".into()), &AccountId::from("u1"));
        assert!(edge.involves(&"u2".into()));
        assert!(!edge.involves(&"u3".into()));
    }

    #[test]
    fn status_text_round_trips_through_storage_form() {
        for status in [FriendshipStatus::Pending, FriendshipStatus::Accepted] {
            assert_eq!(status.as_str().parse::<FriendshipStatus>(), Ok(status));
        }
        assert!("Accepted".parse::<FriendshipStatus>().is_err());
    }

    #[test]
    fn fresh_edges_get_distinct_ids() {
        let first = FriendshipEdge::new_pending("u1".into(), "u2".into());
        let second = FriendshipEdge::new_pending("u1".into(), "u2".into());

        assert_eq!(first.pair(), second.pair());
        assert!(!first.same_revision(&second));
    }
}
