//! In-memory implementations of the storage and collaborator traits.
//!
//! Available in tests and behind the `mocks` feature. The membership mock
//! honors the contracts real backends must provide: the uniqueness triple
//! `(team_id, user_id, invitation_id)` is enforced under a single write lock
//! held across lookup and insert, and `set_state`/`set_role` are
//! compare-and-set under the same lock.

#![allow(clippy::significant_drop_tightening)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use crate::repository::{
    CreateMembership, CreateTeam, InvitationGateway, MembershipDefaults, MembershipRepository,
    StaffDirectory, TeamRepository,
};
use crate::types::{JoinInvitation, Membership, MembershipRole, MembershipState, Team};
use crate::MembershipError;

pub struct MockTeamRepository {
    teams: RwLock<HashMap<i64, Team>>,
    next_id: AtomicI64,
}

impl MockTeamRepository {
    pub fn new() -> Self {
        Self {
            teams: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MockTeamRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TeamRepository for MockTeamRepository {
    async fn create(&self, data: CreateTeam) -> Result<Team, MembershipError> {
        let mut teams = self
            .teams
            .write()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;

        // slug uniqueness is a storage constraint
        if teams.values().any(|t| t.slug == data.slug) {
            return Err(MembershipError::Conflict);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let team = Team {
            id,
            name: data.name,
            slug: data.slug,
            member_access: data.member_access,
            manager_access: data.manager_access,
            creator_id: data.creator_id,
            created_at: now,
            updated_at: now,
        };
        teams.insert(id, team.clone());

        Ok(team)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Team>, MembershipError> {
        let teams = self
            .teams
            .read()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        Ok(teams.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Team>, MembershipError> {
        let teams = self
            .teams
            .read()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        Ok(teams.values().find(|t| t.slug == slug).cloned())
    }

    async fn update_name(&self, id: i64, name: &str) -> Result<Team, MembershipError> {
        let mut teams = self
            .teams
            .write()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;

        let team = teams.get_mut(&id).ok_or(MembershipError::NotFound)?;
        name.clone_into(&mut team.name);
        team.updated_at = Utc::now();

        Ok(team.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), MembershipError> {
        let mut teams = self
            .teams
            .write()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        teams.remove(&id);
        Ok(())
    }
}

pub struct MockMembershipRepository {
    memberships: RwLock<HashMap<i64, Membership>>,
    next_id: AtomicI64,
}

impl MockMembershipRepository {
    pub fn new() -> Self {
        Self {
            memberships: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Insert while the write lock is held, enforcing the uniqueness triple.
    fn insert_locked(
        &self,
        memberships: &mut HashMap<i64, Membership>,
        data: CreateMembership,
    ) -> Result<Membership, MembershipError> {
        let duplicate = memberships.values().any(|m| {
            m.team_id == data.team_id
                && m.user_id == data.user_id
                && m.invitation_id == data.invitation_id
        });
        if duplicate {
            return Err(MembershipError::Conflict);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let membership = Membership {
            id,
            team_id: data.team_id,
            user_id: data.user_id,
            invitation_id: data.invitation_id,
            state: data.state,
            role: data.role,
            created_at: now,
            updated_at: now,
        };
        memberships.insert(id, membership.clone());
        Ok(membership)
    }
}

impl Default for MockMembershipRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MembershipRepository for MockMembershipRepository {
    async fn create(&self, data: CreateMembership) -> Result<Membership, MembershipError> {
        let mut memberships = self
            .memberships
            .write()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        self.insert_locked(&mut memberships, data)
    }

    async fn get_or_create_for_user(
        &self,
        team_id: i64,
        user_id: i64,
        defaults: MembershipDefaults,
    ) -> Result<(Membership, bool), MembershipError> {
        // lookup and insert under one write lock: two racing calls cannot
        // both observe "absent"
        let mut memberships = self
            .memberships
            .write()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;

        if let Some(existing) = memberships
            .values()
            .find(|m| m.team_id == team_id && m.user_id == Some(user_id))
        {
            return Ok((existing.clone(), false));
        }

        let membership = self.insert_locked(
            &mut memberships,
            CreateMembership {
                team_id,
                user_id: Some(user_id),
                invitation_id: None,
                state: defaults.state,
                role: defaults.role,
            },
        )?;
        Ok((membership, true))
    }

    async fn get_or_create_for_invitation(
        &self,
        team_id: i64,
        invitation_id: i64,
        defaults: MembershipDefaults,
    ) -> Result<(Membership, bool), MembershipError> {
        let mut memberships = self
            .memberships
            .write()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;

        if let Some(existing) = memberships
            .values()
            .find(|m| m.team_id == team_id && m.invitation_id == Some(invitation_id))
        {
            return Ok((existing.clone(), false));
        }

        let membership = self.insert_locked(
            &mut memberships,
            CreateMembership {
                team_id,
                user_id: None,
                invitation_id: Some(invitation_id),
                state: defaults.state,
                role: defaults.role,
            },
        )?;
        Ok((membership, true))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Membership>, MembershipError> {
        let memberships = self
            .memberships
            .read()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        Ok(memberships.get(&id).cloned())
    }

    async fn find_by_team_and_user(
        &self,
        team_id: i64,
        user_id: i64,
    ) -> Result<Option<Membership>, MembershipError> {
        let memberships = self
            .memberships
            .read()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        Ok(memberships
            .values()
            .find(|m| m.team_id == team_id && m.user_id == Some(user_id))
            .cloned())
    }

    async fn find_by_team(&self, team_id: i64) -> Result<Vec<Membership>, MembershipError> {
        let memberships = self
            .memberships
            .read()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        let mut rows: Vec<Membership> = memberships
            .values()
            .filter(|m| m.team_id == team_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.id);
        Ok(rows)
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Membership>, MembershipError> {
        let memberships = self
            .memberships
            .read()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        let mut rows: Vec<Membership> = memberships
            .values()
            .filter(|m| m.user_id == Some(user_id))
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.id);
        Ok(rows)
    }

    async fn set_state(
        &self,
        id: i64,
        expected: MembershipState,
        next: MembershipState,
    ) -> Result<Option<Membership>, MembershipError> {
        let mut memberships = self
            .memberships
            .write()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;

        let membership = memberships.get_mut(&id).ok_or(MembershipError::NotFound)?;
        if membership.state != expected {
            return Ok(None);
        }
        membership.state = next;
        membership.updated_at = Utc::now();

        Ok(Some(membership.clone()))
    }

    async fn set_role(
        &self,
        id: i64,
        expected: MembershipRole,
        next: MembershipRole,
    ) -> Result<Option<Membership>, MembershipError> {
        let mut memberships = self
            .memberships
            .write()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;

        let membership = memberships.get_mut(&id).ok_or(MembershipError::NotFound)?;
        if membership.role != expected {
            return Ok(None);
        }
        membership.role = next;
        membership.updated_at = Utc::now();

        Ok(Some(membership.clone()))
    }

    async fn delete(&self, id: i64) -> Result<(), MembershipError> {
        let mut memberships = self
            .memberships
            .write()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        memberships.remove(&id);
        Ok(())
    }

    async fn delete_by_team_and_user(
        &self,
        team_id: i64,
        user_id: i64,
    ) -> Result<(), MembershipError> {
        let mut memberships = self
            .memberships
            .write()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        memberships.retain(|_, m| !(m.team_id == team_id && m.user_id == Some(user_id)));
        Ok(())
    }
}

/// In-memory invitation gateway that records deliveries instead of sending.
pub struct MockInvitationGateway {
    invitations: RwLock<HashMap<i64, JoinInvitation>>,
    next_id: AtomicI64,
    /// Log of invitation ids in delivery order.
    deliveries: Mutex<Vec<i64>>,
    fail_sends: AtomicBool,
}

impl MockInvitationGateway {
    pub fn new() -> Self {
        Self {
            invitations: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            deliveries: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
        }
    }

    /// All deliveries triggered so far, in order.
    pub fn deliveries(&self) -> Vec<i64> {
        self.deliveries.lock().map(|d| d.clone()).unwrap_or_default()
    }

    /// Make subsequent `send` calls fail, for exercising delivery-failure
    /// handling.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockInvitationGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InvitationGateway for MockInvitationGateway {
    async fn create_invitation(
        &self,
        from_user_id: i64,
        to_email: &str,
        message: Option<&str>,
    ) -> Result<JoinInvitation, MembershipError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let invitation = JoinInvitation {
            id,
            from_user_id,
            to_email: to_email.to_owned(),
            message: message.map(str::to_owned),
            created_at: Utc::now(),
        };

        let mut invitations = self
            .invitations
            .write()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        invitations.insert(id, invitation.clone());

        Ok(invitation)
    }

    async fn send(&self, invitation_id: i64) -> Result<(), MembershipError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(MembershipError::Delivery("smtp unavailable".into()));
        }

        let invitations = self
            .invitations
            .read()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        if !invitations.contains_key(&invitation_id) {
            return Err(MembershipError::NotFound);
        }

        let mut deliveries = self
            .deliveries
            .lock()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        deliveries.push(invitation_id);
        Ok(())
    }

    async fn invitation_exists_for(&self, email: &str) -> Result<bool, MembershipError> {
        let invitations = self
            .invitations
            .read()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        Ok(invitations.values().any(|i| i.to_email == email))
    }
}

/// In-memory staff directory.
pub struct MockStaffDirectory {
    staff: RwLock<HashSet<i64>>,
}

impl MockStaffDirectory {
    pub fn new() -> Self {
        Self {
            staff: RwLock::new(HashSet::new()),
        }
    }

    pub fn grant_staff(&self, user_id: i64) {
        if let Ok(mut staff) = self.staff.write() {
            staff.insert(user_id);
        }
    }
}

impl Default for MockStaffDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StaffDirectory for MockStaffDirectory {
    async fn is_staff(&self, user_id: i64) -> Result<bool, MembershipError> {
        let staff = self
            .staff
            .read()
            .map_err(|_| MembershipError::Internal("lock poisoned".into()))?;
        Ok(staff.contains(&user_id))
    }
}
