//! Core types for team membership management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How ordinary users gain membership in a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberAccess {
    /// Anyone may join directly.
    Open,
    /// Users apply and a manager accepts or rejects.
    Application,
    /// Members only get in by invitation.
    Invitation,
}

impl MemberAccess {
    /// Storage form of the access mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Application => "application",
            Self::Invitation => "invitation",
        }
    }

    /// Parse from the storage form.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "application" => Some(Self::Application),
            "invitation" => Some(Self::Invitation),
            _ => None,
        }
    }
}

/// How managers bring new people into a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManagerAccess {
    /// Managers add users directly; the membership is live immediately.
    Add,
    /// Managers invite users, who must explicitly join.
    Invite,
}

impl ManagerAccess {
    /// Storage form of the access mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Invite => "invite",
        }
    }

    /// Parse from the storage form.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Self::Add),
            "invite" => Some(Self::Invite),
            _ => None,
        }
    }
}

/// Lifecycle stage of a membership request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MembershipState {
    /// The user asked to join and awaits a manager's decision.
    Applied,
    /// The user was invited and has not yet responded.
    Invited,
    /// The invitee turned the invitation down.
    Declined,
    /// A manager turned the application down.
    Rejected,
    /// The application or invitation was approved.
    Accepted,
    /// Held back until a seat opens up.
    Waitlisted,
    /// Created without requiring approval.
    AutoJoined,
}

impl MembershipState {
    /// Storage form of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Invited => "invited",
            Self::Declined => "declined",
            Self::Rejected => "rejected",
            Self::Accepted => "accepted",
            Self::Waitlisted => "waitlisted",
            Self::AutoJoined => "auto-joined",
        }
    }

    /// Parse from the storage form.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "applied" => Some(Self::Applied),
            "invited" => Some(Self::Invited),
            "declined" => Some(Self::Declined),
            "rejected" => Some(Self::Rejected),
            "accepted" => Some(Self::Accepted),
            "waitlisted" => Some(Self::Waitlisted),
            "auto-joined" => Some(Self::AutoJoined),
            _ => None,
        }
    }

    /// True for states that count as being on the team.
    ///
    /// Both approved applications and auto-joined memberships qualify.
    pub fn is_acceptance(self) -> bool {
        matches!(self, Self::Accepted | Self::AutoJoined)
    }
}

/// Privilege tier within a membership.
///
/// The derived ordering is the authorization ordering:
/// `Member < Manager < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MembershipRole {
    Member,
    Manager,
    Owner,
}

impl MembershipRole {
    /// Storage form of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Manager => "manager",
            Self::Owner => "owner",
        }
    }

    /// Parse from the storage form.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "member" => Some(Self::Member),
            "manager" => Some(Self::Manager),
            "owner" => Some(Self::Owner),
            _ => None,
        }
    }
}

/// A team is an organizational unit that groups users together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier.
    pub id: i64,
    /// Human-readable team name.
    pub name: String,
    /// URL-friendly unique identifier, derived from the name at creation.
    pub slug: String,
    /// How ordinary users gain membership.
    pub member_access: MemberAccess,
    /// How managers bring new people in.
    pub manager_access: ManagerAccess,
    /// User ID of the team creator (the implicit first owner).
    pub creator_id: i64,
    /// When the team was created.
    pub created_at: DateTime<Utc>,
    /// When the team was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A user's relationship record to a team: approval state plus role.
///
/// Either `user_id` or `invitation_id` may be absent — a pending email
/// invitation has no linked account yet. The triple
/// `(team_id, user_id, invitation_id)` is unique in storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    /// Unique identifier.
    pub id: i64,
    /// The team this membership belongs to.
    pub team_id: i64,
    /// The member's user account, once linked.
    pub user_id: Option<i64>,
    /// The pending invitation this membership was created from, if any.
    pub invitation_id: Option<i64>,
    /// Lifecycle stage of the membership request.
    pub state: MembershipState,
    /// Privilege tier.
    pub role: MembershipRole,
    /// When the membership was created.
    pub created_at: DateTime<Utc>,
    /// When the membership was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    pub fn is_owner(&self) -> bool {
        self.role == MembershipRole::Owner
    }

    pub fn is_manager(&self) -> bool {
        self.role == MembershipRole::Manager
    }

    pub fn is_member(&self) -> bool {
        self.role == MembershipRole::Member
    }
}

/// Handle onto an invitation held by the external delivery collaborator.
///
/// The core only tracks the handle; composing and delivering the actual
/// invitation email is the gateway's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinInvitation {
    /// Unique identifier.
    pub id: i64,
    /// The user who sent the invitation.
    pub from_user_id: i64,
    /// Email of the invitee.
    pub to_email: String,
    /// Optional personal message included with the invitation.
    pub message: Option<String>,
    /// When the invitation was created.
    pub created_at: DateTime<Utc>,
}
