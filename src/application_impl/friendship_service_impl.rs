use crate::application_impl::viewer_status;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
enum Side {
    Requester,
    Addressee,
}

pub struct RealFriendshipService {
    friendship_repo: Arc<dyn FriendshipRepo>,
}

impl RealFriendshipService {
    pub fn new(friendship_repo: Arc<dyn FriendshipRepo>) -> Self {
        Self { friendship_repo }
    }

    async fn send_request_once(
        &self,
        requester: &AccountId,
        addressee: &AccountId,
    ) -> Result<SendOutcome, RelationError> {
        let existing = match self.friendship_repo.find_edge(requester, addressee).await? {
            Some(edge) => edge,
            None => match self
                .friendship_repo
                .insert_edge(requester, addressee)
                .await?
            {
                EdgeClaim::Won(edge) => {
                    info!(
                        %requester,
                        %addressee,
                        friendship_id = %edge.friendship_id,
                        "friend request sent"
                    );
                    return Ok(SendOutcome::Created(edge));
                }
                // lost the insert race; decide against the winner's edge
                EdgeClaim::Existing(edge) => edge,
            },
        };

        match existing.status {
            FriendshipStatus::Accepted => Ok(SendOutcome::AlreadyFriends(existing)),
            FriendshipStatus::Pending if &existing.requester == requester => {
                debug!(%requester, %addressee, "friend request already pending");
                Ok(SendOutcome::AlreadyPending(existing))
            }
            FriendshipStatus::Pending => {
                // crossed invite: the acting account is the stored addressee
                let edge = self
                    .friendship_repo
                    .update_status(&existing, FriendshipStatus::Accepted)
                    .await?;
                info!(
                    %requester,
                    %addressee,
                    friendship_id = %edge.friendship_id,
                    "crossed friend requests auto-accepted"
                );
                Ok(SendOutcome::AutoAccepted(edge))
            }
        }
    }

    async fn find_pending(
        &self,
        acting: &AccountId,
        other: &AccountId,
        side: Side,
    ) -> Result<FriendshipEdge, RelationError> {
        let edge = self
            .friendship_repo
            .find_edge(acting, other)
            .await?
            .filter(FriendshipEdge::is_pending)
            .ok_or_else(|| {
                RelationError::NotFound(format!(
                    "no pending friend request between {acting} and {other}"
                ))
            })?;

        let allowed = match side {
            Side::Requester => &edge.requester == acting,
            Side::Addressee => &edge.addressee == acting,
        };
        if !allowed {
            return Err(RelationError::Forbidden(format!(
                "{acting} is not the {} of this friend request",
                match side {
                    Side::Requester => "requester",
                    Side::Addressee => "addressee",
                }
            )));
        }

        Ok(edge)
    }

    async fn accept_request_once(
        &self,
        addressee: &AccountId,
        requester: &AccountId,
    ) -> Result<FriendshipEdge, RelationError> {
        let pending = self
            .find_pending(addressee, requester, Side::Addressee)
            .await?;
        let edge = self
            .friendship_repo
            .update_status(&pending, FriendshipStatus::Accepted)
            .await?;
        info!(
            %requester,
            %addressee,
            friendship_id = %edge.friendship_id,
            "friend request accepted"
        );
        Ok(edge)
    }

    async fn reject_request_once(
        &self,
        addressee: &AccountId,
        requester: &AccountId,
    ) -> Result<(), RelationError> {
        let pending = self
            .find_pending(addressee, requester, Side::Addressee)
            .await?;
        self.friendship_repo.delete_edge(&pending).await?;
        info!(%requester, %addressee, "friend request rejected");
        Ok(())
    }

    async fn cancel_invitation_once(
        &self,
        requester: &AccountId,
        addressee: &AccountId,
    ) -> Result<(), RelationError> {
        let pending = self
            .find_pending(requester, addressee, Side::Requester)
            .await?;
        self.friendship_repo.delete_edge(&pending).await?;
        info!(%requester, %addressee, "friend invitation cancelled");
        Ok(())
    }

    async fn unfriend_once(&self, me: &AccountId, friend: &AccountId) -> Result<(), RelationError> {
        let edge = self
            .friendship_repo
            .find_edge(me, friend)
            .await?
            .filter(FriendshipEdge::is_accepted)
            .ok_or_else(|| RelationError::NotFound(format!("{me} and {friend} are not friends")))?;
        self.friendship_repo.delete_edge(&edge).await?;
        info!(%me, %friend, "friendship removed");
        Ok(())
    }
}

fn ensure_distinct(
    acting: &AccountId,
    target: &AccountId,
    action: &str,
) -> Result<(), RelationError> {
    if acting == target {
        return Err(RelationError::InvalidOperation(format!("cannot {action} with self")));
    }
    Ok(())
}

fn log_retry(op: &str, acting: &AccountId, target: &AccountId) {
    warn!(%acting, %target, "{op} lost a race on the account pair, retrying once");
}

#[async_trait::async_trait]
impl FriendshipService for RealFriendshipService {
    async fn send_request(
        &self,
        requester: &AccountId,
        addressee: &AccountId,
    ) -> Result<SendOutcome, RelationError> {
        ensure_distinct(requester, addressee, "send a friend request")?;
        match self.send_request_once(requester, addressee).await {
            Err(RelationError::ConcurrentConflict) => {
                log_retry("send_request", requester, addressee);
                self.send_request_once(requester, addressee).await
            }
            other => other,
        }
    }

    async fn accept_request(
        &self,
        addressee: &AccountId,
        requester: &AccountId,
    ) -> Result<FriendshipEdge, RelationError> {
        ensure_distinct(addressee, requester, "accept a friend request")?;
        match self.accept_request_once(addressee, requester).await {
            Err(RelationError::ConcurrentConflict) => {
                log_retry("accept_request", addressee, requester);
                self.accept_request_once(addressee, requester).await
            }
            other => other,
        }
    }

    async fn reject_request(
        &self,
        addressee: &AccountId,
        requester: &AccountId,
    ) -> Result<(), RelationError> {
        ensure_distinct(addressee, requester, "reject a friend request")?;
        match self.reject_request_once(addressee, requester).await {
            Err(RelationError::ConcurrentConflict) => {
                log_retry("reject_request", addressee, requester);
                self.reject_request_once(addressee, requester).await
            }
            other => other,
        }
    }

    async fn cancel_invitation(
        &self,
        requester: &AccountId,
        addressee: &AccountId,
    ) -> Result<(), RelationError> {
        ensure_distinct(requester, addressee, "cancel a friend invitation")?;
        match self.cancel_invitation_once(requester, addressee).await {
            Err(RelationError::ConcurrentConflict) => {
                log_retry("cancel_invitation", requester, addressee);
                self.cancel_invitation_once(requester, addressee).await
            }
            other => other,
        }
    }

    async fn unfriend(&self, me: &AccountId, friend: &AccountId) -> Result<(), RelationError> {
        ensure_distinct(me, friend, "unfriend")?;
        match self.unfriend_once(me, friend).await {
            Err(RelationError::ConcurrentConflict) => {
                log_retry("unfriend", me, friend);
                self.unfriend_once(me, friend).await
            }
            other => other,
        }
    }

    async fn resolve_status(
        &self,
        viewer: &AccountId,
        target: &AccountId,
    ) -> Result<ViewerStatus, RelationError> {
        if viewer == target {
            return Ok(ViewerStatus::CurrentUser);
        }
        let edge = self.friendship_repo.find_edge(viewer, target).await?;
        Ok(viewer_status(viewer, target, edge.as_ref()))
    }
}
