//! The membership state machine.
//!
//! Every mutating operation follows the same pattern: guard on the current
//! state or role, apply a single atomic conditional mutation, emit an event,
//! and return whether the transition occurred. Guard failures are `Ok(false)`
//! and never errors; only structural failures propagate.
//!
//! The guard and the mutation are one storage call
//! ([`MembershipRepository::set_state`] / [`set_role`]), a compare-and-set on
//! the expected prior value, so a concurrent transition on the same
//! membership cannot interleave between guard and write — the loser simply
//! observes `false`.

use chrono::Utc;

use crate::events::{dispatch, TeamEvent};
use crate::repository::{InvitationGateway, MembershipRepository};
use crate::types::{Membership, MembershipRole, MembershipState};
use crate::MembershipError;

/// Validated mutations over individual memberships.
pub struct MembershipTransitions<M, G>
where
    M: MembershipRepository,
    G: InvitationGateway,
{
    memberships: M,
    invitations: G,
}

impl<M, G> MembershipTransitions<M, G>
where
    M: MembershipRepository,
    G: InvitationGateway,
{
    /// Creates a new `MembershipTransitions` engine.
    pub fn new(memberships: M, invitations: G) -> Self {
        Self {
            memberships,
            invitations,
        }
    }

    /// Promote a member to manager.
    ///
    /// Requires the current role to be `Member`; `Owner` is never reachable
    /// this way.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "promote_member", skip_all, err)
    )]
    pub async fn promote(
        &self,
        membership: &Membership,
        by: i64,
    ) -> Result<bool, MembershipError> {
        let Some(updated) = self
            .memberships
            .set_role(membership.id, MembershipRole::Member, MembershipRole::Manager)
            .await?
        else {
            return Ok(false);
        };

        dispatch(TeamEvent::PromotedMember {
            team_id: updated.team_id,
            membership: updated.clone(),
            by: Some(by),
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "cohort_teams",
            "msg=\"member promoted\", team_id={}, membership_id={}, by={}",
            updated.team_id,
            updated.id,
            by
        );

        Ok(true)
    }

    /// Demote a manager back to member.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "demote_member", skip_all, err)
    )]
    pub async fn demote(
        &self,
        membership: &Membership,
        by: i64,
    ) -> Result<bool, MembershipError> {
        let Some(updated) = self
            .memberships
            .set_role(membership.id, MembershipRole::Manager, MembershipRole::Member)
            .await?
        else {
            return Ok(false);
        };

        dispatch(TeamEvent::DemotedMember {
            team_id: updated.team_id,
            membership: updated.clone(),
            by: Some(by),
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "cohort_teams",
            "msg=\"member demoted\", team_id={}, membership_id={}, by={}",
            updated.team_id,
            updated.id,
            by
        );

        Ok(true)
    }

    /// Accept an application.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "accept_membership", skip_all, err)
    )]
    pub async fn accept(
        &self,
        membership: &Membership,
        by: i64,
    ) -> Result<bool, MembershipError> {
        let Some(updated) = self
            .memberships
            .set_state(membership.id, MembershipState::Applied, MembershipState::Accepted)
            .await?
        else {
            return Ok(false);
        };

        dispatch(TeamEvent::AcceptedMembership {
            team_id: updated.team_id,
            membership: updated.clone(),
            by: Some(by),
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "cohort_teams",
            "msg=\"application accepted\", team_id={}, membership_id={}, by={}",
            updated.team_id,
            updated.id,
            by
        );

        Ok(true)
    }

    /// Reject an application.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "reject_membership", skip_all, err)
    )]
    pub async fn reject(
        &self,
        membership: &Membership,
        by: i64,
    ) -> Result<bool, MembershipError> {
        let Some(updated) = self
            .memberships
            .set_state(membership.id, MembershipState::Applied, MembershipState::Rejected)
            .await?
        else {
            return Ok(false);
        };

        dispatch(TeamEvent::RejectedMembership {
            team_id: updated.team_id,
            membership: updated.clone(),
            by: Some(by),
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "cohort_teams",
            "msg=\"application rejected\", team_id={}, membership_id={}, by={}",
            updated.team_id,
            updated.id,
            by
        );

        Ok(true)
    }

    /// Mark a pending invitation as completed by the invitee.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "joined_team", skip_all, err)
    )]
    pub async fn joined(&self, membership: &Membership) -> Result<bool, MembershipError> {
        let Some(updated) = self
            .memberships
            .set_state(membership.id, MembershipState::Invited, MembershipState::Accepted)
            .await?
        else {
            return Ok(false);
        };

        dispatch(TeamEvent::JoinedTeam {
            team_id: updated.team_id,
            membership: updated.clone(),
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "cohort_teams",
            "msg=\"invitee joined\", team_id={}, membership_id={}",
            updated.team_id,
            updated.id
        );

        Ok(true)
    }

    /// Re-trigger delivery of a pending invitation.
    ///
    /// Requires the membership to be `Invited` and bound to an invitation.
    /// No state mutation happens here; a delivery failure propagates as
    /// [`MembershipError::Delivery`] for the caller to retry.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "resend_invite", skip_all, err)
    )]
    pub async fn resend_invite(
        &self,
        membership: &Membership,
        by: Option<i64>,
    ) -> Result<bool, MembershipError> {
        if membership.state != MembershipState::Invited {
            return Ok(false);
        }
        let Some(invitation_id) = membership.invitation_id else {
            return Ok(false);
        };

        self.invitations.send(invitation_id).await?;

        dispatch(TeamEvent::ResentInvite {
            team_id: membership.team_id,
            membership: membership.clone(),
            by,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "cohort_teams",
            "msg=\"invite resent\", team_id={}, membership_id={}, invitation_id={}",
            membership.team_id,
            membership.id,
            invitation_id
        );

        Ok(true)
    }

    /// Delete a membership unconditionally.
    ///
    /// Used for removing members and revoking pending invitations alike.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "remove_member", skip_all, err)
    )]
    pub async fn remove(
        &self,
        membership: &Membership,
        by: Option<i64>,
    ) -> Result<(), MembershipError> {
        self.memberships.delete(membership.id).await?;

        dispatch(TeamEvent::RemovedMember {
            team_id: membership.team_id,
            membership: membership.clone(),
            by,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "cohort_teams",
            "msg=\"member removed\", team_id={}, membership_id={}",
            membership.team_id,
            membership.id
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockInvitationGateway, MockMembershipRepository};
    use crate::repository::MembershipDefaults;

    async fn seed(
        repo: &MockMembershipRepository,
        state: MembershipState,
        role: MembershipRole,
    ) -> Membership {
        let (membership, created) = repo
            .get_or_create_for_user(1, 2, MembershipDefaults { role, state })
            .await
            .unwrap();
        assert!(created);
        membership
    }

    fn engine(
        repo: MockMembershipRepository,
    ) -> MembershipTransitions<MockMembershipRepository, MockInvitationGateway> {
        MembershipTransitions::new(repo, MockInvitationGateway::new())
    }

    #[tokio::test]
    async fn test_promote_then_demote_is_fixed_point() {
        let repo = MockMembershipRepository::new();
        let membership = seed(&repo, MembershipState::AutoJoined, MembershipRole::Member).await;
        let engine = engine(repo);

        assert!(engine.promote(&membership, 1).await.unwrap());
        let promoted = engine
            .memberships
            .find_by_id(membership.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(promoted.role, MembershipRole::Manager);

        assert!(engine.demote(&promoted, 1).await.unwrap());
        let demoted = engine
            .memberships
            .find_by_id(membership.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(demoted.role, MembershipRole::Member);
    }

    #[tokio::test]
    async fn test_promote_requires_member_role() {
        let repo = MockMembershipRepository::new();
        let membership = seed(&repo, MembershipState::Accepted, MembershipRole::Manager).await;
        let engine = engine(repo);

        assert!(!engine.promote(&membership, 1).await.unwrap());
        let row = engine
            .memberships
            .find_by_id(membership.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.role, MembershipRole::Manager);
    }

    #[tokio::test]
    async fn test_demote_requires_manager_role() {
        let repo = MockMembershipRepository::new();
        let membership = seed(&repo, MembershipState::Accepted, MembershipRole::Member).await;
        let engine = engine(repo);

        assert!(!engine.demote(&membership, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_accept_from_applied() {
        let repo = MockMembershipRepository::new();
        let membership = seed(&repo, MembershipState::Applied, MembershipRole::Member).await;
        let engine = engine(repo);

        assert!(engine.accept(&membership, 9).await.unwrap());
        let row = engine
            .memberships
            .find_by_id(membership.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.state, MembershipState::Accepted);

        // accept and reject are exclusive: the application is gone
        assert!(!engine.reject(&row, 9).await.unwrap());
        let row = engine
            .memberships
            .find_by_id(membership.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.state, MembershipState::Accepted);
    }

    #[tokio::test]
    async fn test_accept_guard_rejects_other_states() {
        for state in [
            MembershipState::Invited,
            MembershipState::Accepted,
            MembershipState::Rejected,
            MembershipState::Waitlisted,
            MembershipState::AutoJoined,
        ] {
            let repo = MockMembershipRepository::new();
            let membership = seed(&repo, state, MembershipRole::Member).await;
            let engine = engine(repo);

            assert!(
                !engine.accept(&membership, 1).await.unwrap(),
                "accept should fail from {state:?}"
            );
            let row = engine
                .memberships
                .find_by_id(membership.id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(row.state, state);
        }
    }

    #[tokio::test]
    async fn test_reject_from_applied() {
        let repo = MockMembershipRepository::new();
        let membership = seed(&repo, MembershipState::Applied, MembershipRole::Member).await;
        let engine = engine(repo);

        assert!(engine.reject(&membership, 9).await.unwrap());
        let row = engine
            .memberships
            .find_by_id(membership.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.state, MembershipState::Rejected);
    }

    #[tokio::test]
    async fn test_joined_from_invited() {
        let repo = MockMembershipRepository::new();
        let membership = seed(&repo, MembershipState::Invited, MembershipRole::Member).await;
        let engine = engine(repo);

        assert!(engine.joined(&membership).await.unwrap());
        let row = engine
            .memberships
            .find_by_id(membership.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.state, MembershipState::Accepted);

        // second call is a no-op
        assert!(!engine.joined(&row).await.unwrap());
    }

    #[tokio::test]
    async fn test_resend_invite() {
        let repo = MockMembershipRepository::new();
        let gateway = MockInvitationGateway::new();
        let invitation = gateway
            .create_invitation(1, "invitee@example.com", None)
            .await
            .unwrap();
        let membership = repo
            .get_or_create_for_invitation(
                1,
                invitation.id,
                MembershipDefaults {
                    role: MembershipRole::Member,
                    state: MembershipState::Invited,
                },
            )
            .await
            .unwrap()
            .0;

        let engine = MembershipTransitions::new(repo, gateway);
        assert!(engine.resend_invite(&membership, Some(1)).await.unwrap());
        assert_eq!(engine.invitations.deliveries(), vec![invitation.id]);
    }

    #[tokio::test]
    async fn test_resend_invite_requires_invitation() {
        let repo = MockMembershipRepository::new();
        // invited state but no invitation bound (direct add under invite access)
        let membership = seed(&repo, MembershipState::Invited, MembershipRole::Member).await;
        let engine = engine(repo);

        assert!(!engine.resend_invite(&membership, None).await.unwrap());
    }

    #[tokio::test]
    async fn test_resend_invite_requires_invited_state() {
        let repo = MockMembershipRepository::new();
        let gateway = MockInvitationGateway::new();
        let invitation = gateway
            .create_invitation(1, "invitee@example.com", None)
            .await
            .unwrap();
        let membership = repo
            .get_or_create_for_invitation(
                1,
                invitation.id,
                MembershipDefaults {
                    role: MembershipRole::Member,
                    state: MembershipState::Accepted,
                },
            )
            .await
            .unwrap()
            .0;

        let engine = MembershipTransitions::new(repo, gateway);
        assert!(!engine.resend_invite(&membership, None).await.unwrap());
        assert!(engine.invitations.deliveries().is_empty());
    }

    #[tokio::test]
    async fn test_remove_is_unconditional() {
        for (state, role) in [
            (MembershipState::Applied, MembershipRole::Member),
            (MembershipState::Invited, MembershipRole::Member),
            (MembershipState::Accepted, MembershipRole::Owner),
        ] {
            let repo = MockMembershipRepository::new();
            let membership = seed(&repo, state, role).await;
            let engine = engine(repo);

            engine.remove(&membership, Some(1)).await.unwrap();
            assert!(engine
                .memberships
                .find_by_id(membership.id)
                .await
                .unwrap()
                .is_none());
        }
    }
}
