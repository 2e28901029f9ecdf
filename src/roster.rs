//! Per-team membership registry.
//!
//! [`TeamRoster`] resolves users to their membership, role, and state,
//! computes the derived membership views, and owns the membership-creating
//! commands (`create_team`, `add_member`, `add_user`, `invite_user`, `apply`,
//! `join`, `leave`). State and role transitions on existing memberships live
//! in [`crate::transitions::MembershipTransitions`].

use chrono::Utc;

use crate::config::TeamsConfig;
use crate::events::{dispatch, TeamEvent};
use crate::policy;
use crate::repository::{
    CreateTeam, InvitationGateway, MembershipDefaults, MembershipRepository, StaffDirectory,
    TeamRepository,
};
use crate::slug::create_slug;
use crate::types::{
    ManagerAccess, MemberAccess, Membership, MembershipRole, MembershipState, Team,
};
use crate::MembershipError;

/// Membership registry over one set of storage collaborators.
pub struct TeamRoster<T, M, G, S>
where
    T: TeamRepository,
    M: MembershipRepository,
    G: InvitationGateway,
    S: StaffDirectory,
{
    teams: T,
    memberships: M,
    invitations: G,
    staff: S,
    config: TeamsConfig,
}

impl<T, M, G, S> TeamRoster<T, M, G, S>
where
    T: TeamRepository,
    M: MembershipRepository,
    G: InvitationGateway,
    S: StaffDirectory,
{
    /// Creates a new `TeamRoster` with default configuration.
    pub fn new(teams: T, memberships: M, invitations: G, staff: S) -> Self {
        Self::with_config(teams, memberships, invitations, staff, TeamsConfig::default())
    }

    /// Creates a new `TeamRoster` with custom configuration.
    pub fn with_config(
        teams: T,
        memberships: M,
        invitations: G,
        staff: S,
        config: TeamsConfig,
    ) -> Self {
        Self {
            teams,
            memberships,
            invitations,
            staff,
            config,
        }
    }

    // ---- queries ----------------------------------------------------------

    /// The user's membership in the team, if any.
    pub async fn for_user(
        &self,
        team: &Team,
        user_id: i64,
    ) -> Result<Option<Membership>, MembershipError> {
        self.memberships.find_by_team_and_user(team.id, user_id).await
    }

    /// The user's membership state, if any.
    pub async fn state_for(
        &self,
        team: &Team,
        user_id: i64,
    ) -> Result<Option<MembershipState>, MembershipError> {
        Ok(self.for_user(team, user_id).await?.map(|m| m.state))
    }

    /// The user's effective role, folding in the global-staff override.
    pub async fn role_for(
        &self,
        team: &Team,
        user_id: i64,
    ) -> Result<Option<MembershipRole>, MembershipError> {
        let is_staff = self.staff.is_staff(user_id).await?;
        let stored = self.for_user(team, user_id).await?.map(|m| m.role);
        Ok(policy::effective_role(stored, is_staff))
    }

    /// Can the user join the team directly?
    pub async fn can_join(&self, team: &Team, user_id: i64) -> Result<bool, MembershipError> {
        let membership = self.for_user(team, user_id).await?;
        Ok(policy::can_join(team, membership.as_ref()))
    }

    /// Can the user leave the team?
    pub async fn can_leave(&self, team: &Team, user_id: i64) -> Result<bool, MembershipError> {
        let membership = self.for_user(team, user_id).await?;
        Ok(policy::can_leave(membership.as_ref()))
    }

    /// Can the user apply for membership?
    pub async fn can_apply(&self, team: &Team, user_id: i64) -> Result<bool, MembershipError> {
        let membership = self.for_user(team, user_id).await?;
        Ok(policy::can_apply(team, membership.as_ref()))
    }

    async fn filtered(
        &self,
        team: &Team,
        keep: impl Fn(&Membership) -> bool,
    ) -> Result<Vec<Membership>, MembershipError> {
        let mut rows = self.memberships.find_by_team(team.id).await?;
        rows.retain(|m| keep(m));
        Ok(rows)
    }

    /// Memberships awaiting a manager's decision.
    pub async fn applicants(&self, team: &Team) -> Result<Vec<Membership>, MembershipError> {
        self.filtered(team, |m| m.state == MembershipState::Applied).await
    }

    /// Pending invitations.
    pub async fn invitees(&self, team: &Team) -> Result<Vec<Membership>, MembershipError> {
        self.filtered(team, |m| m.state == MembershipState::Invited).await
    }

    /// Invitations the invitee turned down.
    pub async fn declines(&self, team: &Team) -> Result<Vec<Membership>, MembershipError> {
        self.filtered(team, |m| m.state == MembershipState::Declined).await
    }

    /// Applications a manager turned down.
    pub async fn rejections(&self, team: &Team) -> Result<Vec<Membership>, MembershipError> {
        self.filtered(team, |m| m.state == MembershipState::Rejected).await
    }

    /// Memberships held back until a seat opens.
    pub async fn waitlisted(&self, team: &Team) -> Result<Vec<Membership>, MembershipError> {
        self.filtered(team, |m| m.state == MembershipState::Waitlisted).await
    }

    /// Everyone on the team: accepted and auto-joined memberships.
    pub async fn acceptances(&self, team: &Team) -> Result<Vec<Membership>, MembershipError> {
        self.filtered(team, |m| m.state.is_acceptance()).await
    }

    /// Acceptances with the plain member role.
    pub async fn members(&self, team: &Team) -> Result<Vec<Membership>, MembershipError> {
        self.filtered(team, |m| {
            m.state.is_acceptance() && m.role == MembershipRole::Member
        })
        .await
    }

    /// Acceptances with the manager role.
    pub async fn managers(&self, team: &Team) -> Result<Vec<Membership>, MembershipError> {
        self.filtered(team, |m| {
            m.state.is_acceptance() && m.role == MembershipRole::Manager
        })
        .await
    }

    /// Acceptances with the owner role.
    pub async fn owners(&self, team: &Team) -> Result<Vec<Membership>, MembershipError> {
        self.filtered(team, |m| {
            m.state.is_acceptance() && m.role == MembershipRole::Owner
        })
        .await
    }

    /// Is the user on the team (any acceptance state)?
    pub async fn is_on_team(&self, team: &Team, user_id: i64) -> Result<bool, MembershipError> {
        let membership = self.for_user(team, user_id).await?;
        Ok(membership.is_some_and(|m| m.state.is_acceptance()))
    }

    /// Is the user an accepted plain member?
    pub async fn is_member(&self, team: &Team, user_id: i64) -> Result<bool, MembershipError> {
        let membership = self.for_user(team, user_id).await?;
        Ok(membership.is_some_and(|m| m.state.is_acceptance() && m.is_member()))
    }

    /// Is the user an accepted manager?
    pub async fn is_manager(&self, team: &Team, user_id: i64) -> Result<bool, MembershipError> {
        let membership = self.for_user(team, user_id).await?;
        Ok(membership.is_some_and(|m| m.state.is_acceptance() && m.is_manager()))
    }

    /// Is the user an accepted owner?
    pub async fn is_owner(&self, team: &Team, user_id: i64) -> Result<bool, MembershipError> {
        let membership = self.for_user(team, user_id).await?;
        Ok(membership.is_some_and(|m| m.state.is_acceptance() && m.is_owner()))
    }

    /// Manager-tier check gating administrative actions.
    pub async fn is_owner_or_manager(
        &self,
        team: &Team,
        user_id: i64,
    ) -> Result<bool, MembershipError> {
        let membership = self.for_user(team, user_id).await?;
        Ok(membership
            .is_some_and(|m| m.state.is_acceptance() && policy::is_manager_tier(m.role)))
    }

    // ---- commands ---------------------------------------------------------

    /// Create a team with the configured default access modes.
    ///
    /// The creator becomes the implicit first owner through an auto-joined
    /// membership.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "create_team", skip_all, err)
    )]
    pub async fn create_team(
        &self,
        name: &str,
        creator_id: i64,
    ) -> Result<Team, MembershipError> {
        self.create_team_with_access(
            name,
            self.config.default_member_access,
            self.config.default_manager_access,
            creator_id,
        )
        .await
    }

    /// Create a team with explicit access modes.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "create_team", skip_all, err)
    )]
    pub async fn create_team_with_access(
        &self,
        name: &str,
        member_access: MemberAccess,
        manager_access: ManagerAccess,
        creator_id: i64,
    ) -> Result<Team, MembershipError> {
        let slug = create_slug(name, self.config.slug_max_length);
        let team = self
            .teams
            .create(CreateTeam {
                name: name.to_owned(),
                slug,
                member_access,
                manager_access,
                creator_id,
            })
            .await?;

        let (membership, _) = self
            .memberships
            .get_or_create_for_user(
                team.id,
                creator_id,
                MembershipDefaults {
                    role: MembershipRole::Owner,
                    state: MembershipState::AutoJoined,
                },
            )
            .await?;

        dispatch(TeamEvent::AddedMember {
            team_id: team.id,
            membership,
            by: None,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "cohort_teams",
            "msg=\"team created\", team_id={}, slug=\"{}\", creator_id={}",
            team.id,
            team.slug,
            creator_id
        );

        Ok(team)
    }

    /// Idempotent get-or-create of a membership for a user.
    ///
    /// Defaults to `role = Member`, `state = AutoJoined`. An existing
    /// membership is returned unchanged; the defaults never overwrite it.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "add_member", skip_all, err)
    )]
    pub async fn add_member(
        &self,
        team: &Team,
        user_id: i64,
        role: Option<MembershipRole>,
        state: Option<MembershipState>,
        by: Option<i64>,
    ) -> Result<Membership, MembershipError> {
        let (membership, created) = self
            .memberships
            .get_or_create_for_user(
                team.id,
                user_id,
                MembershipDefaults {
                    role: role.unwrap_or(MembershipRole::Member),
                    state: state.unwrap_or(MembershipState::AutoJoined),
                },
            )
            .await?;

        dispatch(TeamEvent::AddedMember {
            team_id: team.id,
            membership: membership.clone(),
            by,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "cohort_teams",
            "msg=\"member added\", team_id={}, membership_id={}, user_id={}, created={}",
            team.id,
            membership.id,
            user_id,
            created
        );

        Ok(membership)
    }

    /// Add a user at a chosen role, honoring the team's manager access mode.
    ///
    /// When `manager_access == Invite` the membership starts `Invited` and
    /// the user must complete the join; otherwise it is live immediately as
    /// `AutoJoined`. On an existing membership the stored role wins.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "add_user", skip_all, err)
    )]
    pub async fn add_user(
        &self,
        team: &Team,
        user_id: i64,
        role: MembershipRole,
        by: Option<i64>,
    ) -> Result<Membership, MembershipError> {
        let state = if team.manager_access == ManagerAccess::Invite {
            MembershipState::Invited
        } else {
            MembershipState::AutoJoined
        };

        let (membership, created) = self
            .memberships
            .get_or_create_for_user(team.id, user_id, MembershipDefaults { role, state })
            .await?;

        dispatch(TeamEvent::AddedMember {
            team_id: team.id,
            membership: membership.clone(),
            by,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "cohort_teams",
            "msg=\"user added\", team_id={}, membership_id={}, user_id={}, state={}, created={}",
            team.id,
            membership.id,
            user_id,
            membership.state.as_str(),
            created
        );

        Ok(membership)
    }

    /// Invite someone by email address.
    ///
    /// Returns `None` without touching anything when an invitation for the
    /// address is already outstanding — callers must check for presence. The
    /// membership is persisted before delivery is triggered; a delivery
    /// failure is logged and left to the gateway to retry, it never rolls
    /// back the membership.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "invite_user", skip_all, err)
    )]
    pub async fn invite_user(
        &self,
        team: &Team,
        from_user_id: i64,
        to_email: &str,
        role: MembershipRole,
        message: Option<&str>,
    ) -> Result<Option<Membership>, MembershipError> {
        if self.invitations.invitation_exists_for(to_email).await? {
            return Ok(None);
        }

        let invitation = self
            .invitations
            .create_invitation(from_user_id, to_email, message)
            .await?;

        let (membership, _) = self
            .memberships
            .get_or_create_for_invitation(
                team.id,
                invitation.id,
                MembershipDefaults {
                    role,
                    state: MembershipState::Invited,
                },
            )
            .await?;

        if let Err(e) = self.invitations.send(invitation.id).await {
            log::error!(
                target: "cohort_teams",
                "msg=\"invitation delivery failed\", team_id={}, invitation_id={}, error=\"{e}\"",
                team.id,
                invitation.id
            );
        }

        dispatch(TeamEvent::InvitedUser {
            team_id: team.id,
            membership: membership.clone(),
            by: Some(from_user_id),
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "cohort_teams",
            "msg=\"user invited\", team_id={}, membership_id={}, invitation_id={}, email=\"{}\"",
            team.id,
            membership.id,
            invitation.id,
            to_email
        );

        Ok(Some(membership))
    }

    /// Apply for membership in a team that admits by application.
    ///
    /// Returns `None` when the policy does not permit an application.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "apply", skip_all, err))]
    pub async fn apply(
        &self,
        team: &Team,
        user_id: i64,
    ) -> Result<Option<Membership>, MembershipError> {
        if !self.can_apply(team, user_id).await? {
            return Ok(None);
        }

        let (membership, _) = self
            .memberships
            .get_or_create_for_user(
                team.id,
                user_id,
                MembershipDefaults {
                    role: MembershipRole::Member,
                    state: MembershipState::Applied,
                },
            )
            .await?;

        log::info!(
            target: "cohort_teams",
            "msg=\"application received\", team_id={}, membership_id={}, user_id={}",
            team.id,
            membership.id,
            user_id
        );

        Ok(Some(membership))
    }

    /// Join the team directly.
    ///
    /// For an open team this creates an auto-joined member. A user holding a
    /// pending invitation completes it: the membership moves `Invited` →
    /// `Accepted` and `JoinedTeam` is emitted. Returns `None` when the
    /// policy does not permit a join.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "join", skip_all, err))]
    pub async fn join(
        &self,
        team: &Team,
        user_id: i64,
    ) -> Result<Option<Membership>, MembershipError> {
        let existing = self.for_user(team, user_id).await?;
        if !policy::can_join(team, existing.as_ref()) {
            return Ok(None);
        }

        match existing {
            None => {
                let membership = self
                    .add_member(team, user_id, None, None, Some(user_id))
                    .await?;
                Ok(Some(membership))
            }
            Some(invited) => {
                let Some(updated) = self
                    .memberships
                    .set_state(
                        invited.id,
                        MembershipState::Invited,
                        MembershipState::Accepted,
                    )
                    .await?
                else {
                    // a concurrent transition consumed the invitation
                    return Ok(None);
                };

                dispatch(TeamEvent::JoinedTeam {
                    team_id: team.id,
                    membership: updated.clone(),
                    at: Utc::now(),
                })
                .await;

                log::info!(
                    target: "cohort_teams",
                    "msg=\"invitee joined\", team_id={}, membership_id={}",
                    team.id,
                    updated.id
                );

                Ok(Some(updated))
            }
        }
    }

    /// Leave the team. Only plain members can leave.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "leave", skip_all, err))]
    pub async fn leave(&self, team: &Team, user_id: i64) -> Result<bool, MembershipError> {
        let Some(membership) = self.for_user(team, user_id).await? else {
            return Ok(false);
        };
        if !policy::can_leave(Some(&membership)) {
            return Ok(false);
        }

        self.memberships
            .delete_by_team_and_user(team.id, user_id)
            .await?;

        dispatch(TeamEvent::RemovedMember {
            team_id: team.id,
            membership,
            by: Some(user_id),
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "cohort_teams",
            "msg=\"member left\", team_id={}, user_id={}",
            team.id,
            user_id
        );

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{
        MockInvitationGateway, MockMembershipRepository, MockStaffDirectory, MockTeamRepository,
    };

    fn roster() -> TeamRoster<
        MockTeamRepository,
        MockMembershipRepository,
        MockInvitationGateway,
        MockStaffDirectory,
    > {
        TeamRoster::new(
            MockTeamRepository::new(),
            MockMembershipRepository::new(),
            MockInvitationGateway::new(),
            MockStaffDirectory::new(),
        )
    }

    async fn team_with(
        roster: &TeamRoster<
            MockTeamRepository,
            MockMembershipRepository,
            MockInvitationGateway,
            MockStaffDirectory,
        >,
        member_access: MemberAccess,
        manager_access: ManagerAccess,
    ) -> Team {
        roster
            .create_team_with_access("Test Team", member_access, manager_access, 1)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_team_derives_slug_and_owner() {
        let roster = roster();
        let team = roster.create_team("Ops & Infra", 1).await.unwrap();

        assert_eq!(team.slug, "ops-infra");
        assert_eq!(team.creator_id, 1);

        assert!(roster.is_owner(&team, 1).await.unwrap());
        let owners = roster.owners(&team).await.unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].state, MembershipState::AutoJoined);
    }

    #[tokio::test]
    async fn test_create_team_duplicate_slug_conflicts() {
        let roster = roster();
        roster.create_team("Test Team", 1).await.unwrap();

        let err = roster.create_team("Test Team", 2).await.unwrap_err();
        assert_eq!(err, MembershipError::Conflict);
    }

    #[tokio::test]
    async fn test_add_member_defaults_and_idempotency() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Open, ManagerAccess::Add).await;

        let first = roster
            .add_member(&team, 2, None, None, Some(1))
            .await
            .unwrap();
        assert_eq!(first.role, MembershipRole::Member);
        assert_eq!(first.state, MembershipState::AutoJoined);

        // second call returns the same row, ignoring new defaults
        let second = roster
            .add_member(
                &team,
                2,
                Some(MembershipRole::Manager),
                Some(MembershipState::Applied),
                Some(1),
            )
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.role, MembershipRole::Member);
    }

    #[tokio::test]
    async fn test_add_user_invite_access_starts_invited() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Invitation, ManagerAccess::Invite).await;

        let membership = roster
            .add_user(&team, 2, MembershipRole::Member, Some(1))
            .await
            .unwrap();
        assert_eq!(membership.state, MembershipState::Invited);
        assert!(membership.invitation_id.is_none());
    }

    #[tokio::test]
    async fn test_add_user_add_access_is_live_immediately() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Open, ManagerAccess::Add).await;

        let membership = roster
            .add_user(&team, 2, MembershipRole::Manager, Some(1))
            .await
            .unwrap();
        assert_eq!(membership.state, MembershipState::AutoJoined);
        assert_eq!(membership.role, MembershipRole::Manager);
        assert!(roster.is_manager(&team, 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_invite_user_creates_bound_membership() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Invitation, ManagerAccess::Invite).await;

        let membership = roster
            .invite_user(&team, 1, "invitee@example.com", MembershipRole::Member, None)
            .await
            .unwrap()
            .expect("first invite should create a membership");

        assert_eq!(membership.state, MembershipState::Invited);
        assert!(membership.user_id.is_none());
        let invitation_id = membership.invitation_id.expect("bound invitation");
        // delivery was triggered once
        assert_eq!(roster.invitations.deliveries(), vec![invitation_id]);
    }

    #[tokio::test]
    async fn test_invite_user_duplicate_email_is_noop() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Invitation, ManagerAccess::Invite).await;

        roster
            .invite_user(&team, 1, "invitee@example.com", MembershipRole::Member, None)
            .await
            .unwrap();
        let second = roster
            .invite_user(
                &team,
                1,
                "invitee@example.com",
                MembershipRole::Manager,
                Some("again"),
            )
            .await
            .unwrap();

        assert!(second.is_none());
        assert_eq!(roster.invitees(&team).await.unwrap().len(), 1);
        assert_eq!(roster.invitations.deliveries().len(), 1);
    }

    #[tokio::test]
    async fn test_invite_user_survives_delivery_failure() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Invitation, ManagerAccess::Invite).await;
        roster.invitations.set_fail_sends(true);

        let membership = roster
            .invite_user(&team, 1, "invitee@example.com", MembershipRole::Member, None)
            .await
            .unwrap()
            .expect("membership persists despite delivery failure");

        assert_eq!(membership.state, MembershipState::Invited);
        assert!(roster.invitations.deliveries().is_empty());
    }

    #[tokio::test]
    async fn test_apply_flow() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Application, ManagerAccess::Add).await;

        assert!(roster.can_apply(&team, 2).await.unwrap());
        let membership = roster.apply(&team, 2).await.unwrap().unwrap();
        assert_eq!(membership.state, MembershipState::Applied);

        // a membership now exists, so a second application is refused
        assert!(!roster.can_apply(&team, 2).await.unwrap());
        assert!(roster.apply(&team, 2).await.unwrap().is_none());
        assert_eq!(roster.applicants(&team).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_refused_on_open_team() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Open, ManagerAccess::Add).await;

        assert!(roster.apply(&team, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_join_open_team() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Open, ManagerAccess::Add).await;

        assert!(roster.can_join(&team, 2).await.unwrap());
        let membership = roster.join(&team, 2).await.unwrap().unwrap();
        assert_eq!(membership.state, MembershipState::AutoJoined);
        assert_eq!(membership.role, MembershipRole::Member);

        // once on the team the join capability is gone
        assert!(!roster.can_join(&team, 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_join_refused_on_invitation_team() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Invitation, ManagerAccess::Invite).await;

        assert!(!roster.can_join(&team, 2).await.unwrap());
        assert!(roster.join(&team, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_join_completes_pending_invitation() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Invitation, ManagerAccess::Invite).await;
        roster
            .add_user(&team, 2, MembershipRole::Member, Some(1))
            .await
            .unwrap();

        // invited users can join regardless of member access
        assert!(roster.can_join(&team, 2).await.unwrap());
        let membership = roster.join(&team, 2).await.unwrap().unwrap();
        assert_eq!(membership.state, MembershipState::Accepted);
        assert!(roster.is_on_team(&team, 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_leave_only_for_members() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Open, ManagerAccess::Add).await;
        roster.join(&team, 2).await.unwrap();

        // the owner cannot leave
        assert!(!roster.can_leave(&team, 1).await.unwrap());
        assert!(!roster.leave(&team, 1).await.unwrap());

        assert!(roster.can_leave(&team, 2).await.unwrap());
        assert!(roster.leave(&team, 2).await.unwrap());
        assert!(roster.for_user(&team, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_role_for_staff_override() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Open, ManagerAccess::Add).await;
        roster.staff.grant_staff(7);

        // staff with no membership still reads as manager
        assert_eq!(
            roster.role_for(&team, 7).await.unwrap(),
            Some(MembershipRole::Manager)
        );
        // and the stored owner role is never demoted by the override
        roster.staff.grant_staff(1);
        assert_eq!(
            roster.role_for(&team, 1).await.unwrap(),
            Some(MembershipRole::Owner)
        );
        // non-staff non-members have no role
        assert_eq!(roster.role_for(&team, 8).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_state_for() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Application, ManagerAccess::Add).await;

        assert_eq!(roster.state_for(&team, 2).await.unwrap(), None);
        roster.apply(&team, 2).await.unwrap();
        assert_eq!(
            roster.state_for(&team, 2).await.unwrap(),
            Some(MembershipState::Applied)
        );
    }

    #[tokio::test]
    async fn test_derived_views() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Application, ManagerAccess::Add).await;

        roster.apply(&team, 2).await.unwrap();
        roster
            .add_member(
                &team,
                3,
                Some(MembershipRole::Manager),
                Some(MembershipState::Accepted),
                Some(1),
            )
            .await
            .unwrap();
        roster
            .add_member(
                &team,
                4,
                None,
                Some(MembershipState::Waitlisted),
                Some(1),
            )
            .await
            .unwrap();

        assert_eq!(roster.applicants(&team).await.unwrap().len(), 1);
        assert_eq!(roster.waitlisted(&team).await.unwrap().len(), 1);
        assert_eq!(roster.managers(&team).await.unwrap().len(), 1);
        assert_eq!(roster.owners(&team).await.unwrap().len(), 1);
        // owner + accepted manager are on the roster; applicant and waitlisted are not
        assert_eq!(roster.acceptances(&team).await.unwrap().len(), 2);
        assert!(roster.members(&team).await.unwrap().is_empty());
        assert!(roster.declines(&team).await.unwrap().is_empty());
        assert!(roster.rejections(&team).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_is_owner_or_manager() {
        let roster = roster();
        let team = team_with(&roster, MemberAccess::Open, ManagerAccess::Add).await;
        roster.join(&team, 2).await.unwrap();

        assert!(roster.is_owner_or_manager(&team, 1).await.unwrap());
        assert!(!roster.is_owner_or_manager(&team, 2).await.unwrap());

        // a pending applicant is not manager-tier even with a manager role
        let team2 = roster
            .create_team_with_access("Other", MemberAccess::Application, ManagerAccess::Add, 1)
            .await
            .unwrap();
        roster
            .add_member(
                &team2,
                5,
                Some(MembershipRole::Manager),
                Some(MembershipState::Applied),
                Some(1),
            )
            .await
            .unwrap();
        assert!(!roster.is_owner_or_manager(&team2, 5).await.unwrap());
    }
}
