use crate::domain_model::*;

/// Viewer-relative status for the edge stored between `viewer` and `target`.
pub fn viewer_status(
    viewer: &AccountId,
    target: &AccountId,
    edge: Option<&FriendshipEdge>,
) -> ViewerStatus {
    if viewer == target {
        return ViewerStatus::CurrentUser;
    }

    match edge {
        None => ViewerStatus::NotFriends,
        Some(edge) if edge.is_accepted() => ViewerStatus::Friends,
        Some(edge) if &edge.requester == viewer => ViewerStatus::PendingSent,
        Some(_) => ViewerStatus::PendingReceived,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_wins_over_any_edge() {
        let u1 = AccountId::from("u1");
        assert_eq!(viewer_status(&u1, &u1, None), ViewerStatus::CurrentUser);
    }

    #[test]
    fn pending_direction_depends_on_viewer() {
        let u1 = AccountId::from("u1");
        let u2 = AccountId::from("u2");
        let edge = FriendshipEdge::new_pending(u1.clone(), u2.clone());

        assert_eq!(viewer_status(&u1, &u2, Some(&edge)), ViewerStatus::PendingSent);
        assert_eq!(viewer_status(&u2, &u1, Some(&edge)), ViewerStatus::PendingReceived);
        assert_eq!(viewer_status(&u1, &u2, None), ViewerStatus::NotFriends);
    }

    #[test]
    fn accepted_is_symmetric() {
        let u1 = AccountId::from("u1");
        let u2 = AccountId::from("u2");
        let mut edge = FriendshipEdge::new_pending(u1.clone(), u2.clone());
        edge.status = FriendshipStatus::Accepted;

        assert_eq!(viewer_status(&u1, &u2, Some(&edge)), ViewerStatus::Friends);
        assert_eq!(viewer_status(&u2, &u1, Some(&edge)), ViewerStatus::Friends);
    }
}
