//! Team access policy evaluation.
//!
//! Pure functions of a team's configured access modes and a user's current
//! membership. No storage access and no side effects, so they can be called
//! repeatedly and concurrently without coordination. [`crate::roster::TeamRoster`]
//! wraps these with the membership lookup.

use crate::types::{Membership, MembershipRole, MembershipState, MemberAccess, Team};

/// Can the user join the team directly?
///
/// True when the team is open and the user has no membership yet, or when
/// the user holds a pending invitation (regardless of the access mode).
pub fn can_join(team: &Team, membership: Option<&Membership>) -> bool {
    match membership {
        None => team.member_access == MemberAccess::Open,
        Some(m) => m.state == MembershipState::Invited,
    }
}

/// Can the user leave the team?
///
/// Only plain members can leave; managers and owners must first be demoted
/// or have the membership removed by another manager.
pub fn can_leave(membership: Option<&Membership>) -> bool {
    membership.is_some_and(|m| m.role == MembershipRole::Member)
}

/// Can the user apply for membership?
///
/// True when the team admits by application and the user has no membership
/// yet, in any state.
pub fn can_apply(team: &Team, membership: Option<&Membership>) -> bool {
    team.member_access == MemberAccess::Application && membership.is_none()
}

/// Effective role of a user, folding in the global-staff override.
///
/// Staff are reported at least `Manager` everywhere: the effective role is
/// the maximum of the stored role and `Manager`. A staff user with no
/// membership still evaluates to `Manager`.
pub fn effective_role(
    stored: Option<MembershipRole>,
    is_staff: bool,
) -> Option<MembershipRole> {
    if is_staff {
        Some(stored.map_or(MembershipRole::Manager, |role| {
            role.max(MembershipRole::Manager)
        }))
    } else {
        stored
    }
}

/// Is the role in the manager tier (`Manager` or `Owner`)?
///
/// The standard check gating administrative actions: invite, promote,
/// demote, remove, resend.
pub fn is_manager_tier(role: MembershipRole) -> bool {
    role >= MembershipRole::Manager
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::ManagerAccess;

    fn team(member_access: MemberAccess) -> Team {
        let now = Utc::now();
        Team {
            id: 1,
            name: "Test Team".to_owned(),
            slug: "test-team".to_owned(),
            member_access,
            manager_access: ManagerAccess::Add,
            creator_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn membership(state: MembershipState, role: MembershipRole) -> Membership {
        let now = Utc::now();
        Membership {
            id: 1,
            team_id: 1,
            user_id: Some(2),
            invitation_id: None,
            state,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_can_join_open_team_without_membership() {
        assert!(can_join(&team(MemberAccess::Open), None));
        assert!(!can_join(&team(MemberAccess::Application), None));
        assert!(!can_join(&team(MemberAccess::Invitation), None));
    }

    #[test]
    fn test_can_join_with_pending_invitation() {
        let m = membership(MembershipState::Invited, MembershipRole::Member);

        // an invitation admits the user regardless of the access mode
        assert!(can_join(&team(MemberAccess::Open), Some(&m)));
        assert!(can_join(&team(MemberAccess::Application), Some(&m)));
        assert!(can_join(&team(MemberAccess::Invitation), Some(&m)));
    }

    #[test]
    fn test_can_join_rejected_for_other_states() {
        for state in [
            MembershipState::Applied,
            MembershipState::Declined,
            MembershipState::Rejected,
            MembershipState::Accepted,
            MembershipState::Waitlisted,
            MembershipState::AutoJoined,
        ] {
            let m = membership(state, MembershipRole::Member);
            assert!(
                !can_join(&team(MemberAccess::Open), Some(&m)),
                "state {state:?} should not admit a join"
            );
        }
    }

    #[test]
    fn test_can_leave_only_members() {
        for state in [
            MembershipState::Applied,
            MembershipState::Invited,
            MembershipState::Accepted,
            MembershipState::AutoJoined,
        ] {
            let member = membership(state, MembershipRole::Member);
            let manager = membership(state, MembershipRole::Manager);
            let owner = membership(state, MembershipRole::Owner);

            assert!(can_leave(Some(&member)));
            assert!(!can_leave(Some(&manager)));
            assert!(!can_leave(Some(&owner)));
        }
        assert!(!can_leave(None));
    }

    #[test]
    fn test_can_apply() {
        assert!(can_apply(&team(MemberAccess::Application), None));
        assert!(!can_apply(&team(MemberAccess::Open), None));
        assert!(!can_apply(&team(MemberAccess::Invitation), None));

        // any existing membership blocks a new application
        let m = membership(MembershipState::Rejected, MembershipRole::Member);
        assert!(!can_apply(&team(MemberAccess::Application), Some(&m)));
    }

    #[test]
    fn test_effective_role_staff_override() {
        assert_eq!(effective_role(None, false), None);
        assert_eq!(effective_role(None, true), Some(MembershipRole::Manager));
        assert_eq!(
            effective_role(Some(MembershipRole::Member), true),
            Some(MembershipRole::Manager)
        );
        // the override never demotes an owner
        assert_eq!(
            effective_role(Some(MembershipRole::Owner), true),
            Some(MembershipRole::Owner)
        );
        assert_eq!(
            effective_role(Some(MembershipRole::Member), false),
            Some(MembershipRole::Member)
        );
    }

    #[test]
    fn test_is_manager_tier() {
        assert!(!is_manager_tier(MembershipRole::Member));
        assert!(is_manager_tier(MembershipRole::Manager));
        assert!(is_manager_tier(MembershipRole::Owner));
    }
}
