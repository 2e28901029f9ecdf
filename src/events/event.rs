use chrono::{DateTime, Utc};

use crate::types::Membership;

/// Membership events emitted by roster commands and transitions.
///
/// Each event carries the team, a snapshot of the membership as committed,
/// and the acting user where one exists. Events are always fired; register
/// listeners via [`register_event_listeners`](crate::register_event_listeners)
/// to handle them.
#[derive(Debug, Clone)]
pub enum TeamEvent {
    /// A membership was created through `add_member`, `add_user`, `join`,
    /// or team creation.
    AddedMember {
        team_id: i64,
        membership: Membership,
        by: Option<i64>,
        at: DateTime<Utc>,
    },
    /// An invitation was created and a membership bound to it.
    InvitedUser {
        team_id: i64,
        membership: Membership,
        by: Option<i64>,
        at: DateTime<Utc>,
    },

    // role transitions
    PromotedMember {
        team_id: i64,
        membership: Membership,
        by: Option<i64>,
        at: DateTime<Utc>,
    },
    DemotedMember {
        team_id: i64,
        membership: Membership,
        by: Option<i64>,
        at: DateTime<Utc>,
    },

    // state transitions
    AcceptedMembership {
        team_id: i64,
        membership: Membership,
        by: Option<i64>,
        at: DateTime<Utc>,
    },
    RejectedMembership {
        team_id: i64,
        membership: Membership,
        by: Option<i64>,
        at: DateTime<Utc>,
    },
    /// An invitee completed their pending invitation. No actor: the invitee
    /// themselves triggered it.
    JoinedTeam {
        team_id: i64,
        membership: Membership,
        at: DateTime<Utc>,
    },
    ResentInvite {
        team_id: i64,
        membership: Membership,
        by: Option<i64>,
        at: DateTime<Utc>,
    },
    /// The membership was deleted. The snapshot is the last committed row.
    RemovedMember {
        team_id: i64,
        membership: Membership,
        by: Option<i64>,
        at: DateTime<Utc>,
    },
}

impl TeamEvent {
    /// Returns a dot-separated event name for logging/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddedMember { .. } => "team.member.added",
            Self::InvitedUser { .. } => "team.user.invited",
            Self::PromotedMember { .. } => "team.member.promoted",
            Self::DemotedMember { .. } => "team.member.demoted",
            Self::AcceptedMembership { .. } => "team.membership.accepted",
            Self::RejectedMembership { .. } => "team.membership.rejected",
            Self::JoinedTeam { .. } => "team.member.joined",
            Self::ResentInvite { .. } => "team.invite.resent",
            Self::RemovedMember { .. } => "team.member.removed",
        }
    }

    /// Returns the timestamp when this event occurred.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::AddedMember { at, .. }
            | Self::InvitedUser { at, .. }
            | Self::PromotedMember { at, .. }
            | Self::DemotedMember { at, .. }
            | Self::AcceptedMembership { at, .. }
            | Self::RejectedMembership { at, .. }
            | Self::JoinedTeam { at, .. }
            | Self::ResentInvite { at, .. }
            | Self::RemovedMember { at, .. } => *at,
        }
    }

    /// The membership snapshot carried by the event.
    pub fn membership(&self) -> &Membership {
        match self {
            Self::AddedMember { membership, .. }
            | Self::InvitedUser { membership, .. }
            | Self::PromotedMember { membership, .. }
            | Self::DemotedMember { membership, .. }
            | Self::AcceptedMembership { membership, .. }
            | Self::RejectedMembership { membership, .. }
            | Self::JoinedTeam { membership, .. }
            | Self::ResentInvite { membership, .. }
            | Self::RemovedMember { membership, .. } => membership,
        }
    }

    /// The acting user, when the event has one.
    pub fn actor(&self) -> Option<i64> {
        match self {
            Self::AddedMember { by, .. }
            | Self::InvitedUser { by, .. }
            | Self::PromotedMember { by, .. }
            | Self::DemotedMember { by, .. }
            | Self::AcceptedMembership { by, .. }
            | Self::RejectedMembership { by, .. }
            | Self::ResentInvite { by, .. }
            | Self::RemovedMember { by, .. } => *by,
            Self::JoinedTeam { .. } => None,
        }
    }
}
