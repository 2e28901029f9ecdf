//! Storage and collaborator traits.
//!
//! The core consumes these abstractions and never defines storage itself.
//! Implement them for your database or service layer; enable the `mocks`
//! feature for in-memory implementations useful in tests.
//!
//! Get-or-create operations must be atomic with respect to the membership
//! uniqueness constraint `(team_id, user_id, invitation_id)` — a storage
//! unique index plus a single upsert-style call, not a check-then-insert
//! pair. `set_state` and `set_role` are compare-and-set on a single row so a
//! guard-then-mutate sequence cannot interleave with a concurrent transition.

use async_trait::async_trait;

use crate::types::{
    JoinInvitation, ManagerAccess, MemberAccess, Membership, MembershipRole, MembershipState, Team,
};
use crate::MembershipError;

#[derive(Debug, Clone)]
pub struct CreateTeam {
    pub name: String,
    pub slug: String,
    pub member_access: MemberAccess,
    pub manager_access: ManagerAccess,
    pub creator_id: i64,
}

#[derive(Debug, Clone)]
pub struct CreateMembership {
    pub team_id: i64,
    pub user_id: Option<i64>,
    pub invitation_id: Option<i64>,
    pub state: MembershipState,
    pub role: MembershipRole,
}

/// Role and state assigned when a get-or-create call inserts a new row.
///
/// An existing row keeps whatever it was created with; defaults never
/// overwrite it.
#[derive(Debug, Clone, Copy)]
pub struct MembershipDefaults {
    pub role: MembershipRole,
    pub state: MembershipState,
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Fails with [`MembershipError::Conflict`] when the slug is taken.
    async fn create(&self, data: CreateTeam) -> Result<Team, MembershipError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Team>, MembershipError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Team>, MembershipError>;
    /// Updates the display name. The slug is immutable after creation.
    async fn update_name(&self, id: i64, name: &str) -> Result<Team, MembershipError>;
    async fn delete(&self, id: i64) -> Result<(), MembershipError>;
}

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn create(&self, data: CreateMembership) -> Result<Membership, MembershipError>;

    /// Atomic get-or-create keyed by `(team_id, user_id)`.
    ///
    /// Returns the membership and whether it was created by this call.
    async fn get_or_create_for_user(
        &self,
        team_id: i64,
        user_id: i64,
        defaults: MembershipDefaults,
    ) -> Result<(Membership, bool), MembershipError>;

    /// Atomic get-or-create keyed by `(team_id, invitation_id)`.
    async fn get_or_create_for_invitation(
        &self,
        team_id: i64,
        invitation_id: i64,
        defaults: MembershipDefaults,
    ) -> Result<(Membership, bool), MembershipError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Membership>, MembershipError>;
    async fn find_by_team_and_user(
        &self,
        team_id: i64,
        user_id: i64,
    ) -> Result<Option<Membership>, MembershipError>;
    async fn find_by_team(&self, team_id: i64) -> Result<Vec<Membership>, MembershipError>;
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Membership>, MembershipError>;

    /// Compare-and-set the state of one membership.
    ///
    /// Returns the updated row, or `None` when the stored state no longer
    /// equals `expected` — the guard failed or a concurrent transition won.
    async fn set_state(
        &self,
        id: i64,
        expected: MembershipState,
        next: MembershipState,
    ) -> Result<Option<Membership>, MembershipError>;

    /// Compare-and-set the role of one membership. Same contract as
    /// [`set_state`](Self::set_state).
    async fn set_role(
        &self,
        id: i64,
        expected: MembershipRole,
        next: MembershipRole,
    ) -> Result<Option<Membership>, MembershipError>;

    async fn delete(&self, id: i64) -> Result<(), MembershipError>;
    async fn delete_by_team_and_user(
        &self,
        team_id: i64,
        user_id: i64,
    ) -> Result<(), MembershipError>;
}

/// Invitation delivery capability.
///
/// Creating the invitation record and delivering it are separate calls:
/// membership state is persisted durably first, and a delivery failure is
/// surfaced for retry rather than rolling the state change back.
#[async_trait]
pub trait InvitationGateway: Send + Sync {
    async fn create_invitation(
        &self,
        from_user_id: i64,
        to_email: &str,
        message: Option<&str>,
    ) -> Result<JoinInvitation, MembershipError>;

    /// Trigger (or re-trigger) delivery of an invitation. At-least-once.
    async fn send(&self, invitation_id: i64) -> Result<(), MembershipError>;

    /// Is there an outstanding invitation for this email address?
    async fn invitation_exists_for(&self, email: &str) -> Result<bool, MembershipError>;
}

/// User-identity lookup for the global-staff authorization override.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn is_staff(&self, user_id: i64) -> Result<bool, MembershipError>;
}

// Shared-handle impls: a single storage handle (connection pool, mock) can
// back both a roster and a transition engine.

#[async_trait]
impl<T: TeamRepository + ?Sized> TeamRepository for std::sync::Arc<T> {
    async fn create(&self, data: CreateTeam) -> Result<Team, MembershipError> {
        (**self).create(data).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Team>, MembershipError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Team>, MembershipError> {
        (**self).find_by_slug(slug).await
    }

    async fn update_name(&self, id: i64, name: &str) -> Result<Team, MembershipError> {
        (**self).update_name(id, name).await
    }

    async fn delete(&self, id: i64) -> Result<(), MembershipError> {
        (**self).delete(id).await
    }
}

#[async_trait]
impl<T: MembershipRepository + ?Sized> MembershipRepository for std::sync::Arc<T> {
    async fn create(&self, data: CreateMembership) -> Result<Membership, MembershipError> {
        (**self).create(data).await
    }

    async fn get_or_create_for_user(
        &self,
        team_id: i64,
        user_id: i64,
        defaults: MembershipDefaults,
    ) -> Result<(Membership, bool), MembershipError> {
        (**self)
            .get_or_create_for_user(team_id, user_id, defaults)
            .await
    }

    async fn get_or_create_for_invitation(
        &self,
        team_id: i64,
        invitation_id: i64,
        defaults: MembershipDefaults,
    ) -> Result<(Membership, bool), MembershipError> {
        (**self)
            .get_or_create_for_invitation(team_id, invitation_id, defaults)
            .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Membership>, MembershipError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_team_and_user(
        &self,
        team_id: i64,
        user_id: i64,
    ) -> Result<Option<Membership>, MembershipError> {
        (**self).find_by_team_and_user(team_id, user_id).await
    }

    async fn find_by_team(&self, team_id: i64) -> Result<Vec<Membership>, MembershipError> {
        (**self).find_by_team(team_id).await
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Membership>, MembershipError> {
        (**self).find_by_user(user_id).await
    }

    async fn set_state(
        &self,
        id: i64,
        expected: MembershipState,
        next: MembershipState,
    ) -> Result<Option<Membership>, MembershipError> {
        (**self).set_state(id, expected, next).await
    }

    async fn set_role(
        &self,
        id: i64,
        expected: MembershipRole,
        next: MembershipRole,
    ) -> Result<Option<Membership>, MembershipError> {
        (**self).set_role(id, expected, next).await
    }

    async fn delete(&self, id: i64) -> Result<(), MembershipError> {
        (**self).delete(id).await
    }

    async fn delete_by_team_and_user(
        &self,
        team_id: i64,
        user_id: i64,
    ) -> Result<(), MembershipError> {
        (**self).delete_by_team_and_user(team_id, user_id).await
    }
}

#[async_trait]
impl<T: InvitationGateway + ?Sized> InvitationGateway for std::sync::Arc<T> {
    async fn create_invitation(
        &self,
        from_user_id: i64,
        to_email: &str,
        message: Option<&str>,
    ) -> Result<JoinInvitation, MembershipError> {
        (**self)
            .create_invitation(from_user_id, to_email, message)
            .await
    }

    async fn send(&self, invitation_id: i64) -> Result<(), MembershipError> {
        (**self).send(invitation_id).await
    }

    async fn invitation_exists_for(&self, email: &str) -> Result<bool, MembershipError> {
        (**self).invitation_exists_for(email).await
    }
}

#[async_trait]
impl<T: StaffDirectory + ?Sized> StaffDirectory for std::sync::Arc<T> {
    async fn is_staff(&self, user_id: i64) -> Result<bool, MembershipError> {
        (**self).is_staff(user_id).await
    }
}
