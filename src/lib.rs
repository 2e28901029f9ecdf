//! Team membership lifecycles: access policies, invitations, and the
//! membership state machine.
//!
//! The crate is a library-level contract, not a network-facing service. It
//! consumes storage, invitation delivery, and identity lookup through the
//! traits in [`repository`], evaluates capabilities with the pure functions
//! in [`policy`], and mutates memberships through [`roster::TeamRoster`] and
//! [`transitions::MembershipTransitions`]. Every committed mutation emits a
//! [`events::TeamEvent`] so auditing and notification stay decoupled from
//! the transition logic.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use cohort::mocks::{MockInvitationGateway, MockMembershipRepository,
//!     MockStaffDirectory, MockTeamRepository};
//! use cohort::roster::TeamRoster;
//!
//! let roster = TeamRoster::new(
//!     MockTeamRepository::new(),
//!     MockMembershipRepository::new(),
//!     MockInvitationGateway::new(),
//!     MockStaffDirectory::new(),
//! );
//!
//! let team = roster.create_team("Ops", 1).await?;
//! roster.add_member(&team, 2, None, None, Some(1)).await?;
//! ```

use std::fmt;

pub mod config;
pub mod events;
pub mod policy;
pub mod repository;
pub mod roster;
pub mod slug;
pub mod transitions;
pub mod types;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use config::TeamsConfig;
pub use events::{register_event_listeners, TeamEvent};
pub use repository::{
    CreateMembership, CreateTeam, InvitationGateway, MembershipDefaults, MembershipRepository,
    StaffDirectory, TeamRepository,
};
pub use roster::TeamRoster;
pub use transitions::MembershipTransitions;
pub use types::{
    JoinInvitation, ManagerAccess, MemberAccess, Membership, MembershipRole, MembershipState, Team,
};

/// Structural failures surfaced by storage and collaborators.
///
/// Expected precondition failures — a transition guard that does not hold, a
/// duplicate invitation, a missing membership under a capability check — are
/// represented as `false`/`None` returns, never as errors. Only the failures
/// below propagate.
#[derive(Debug, Clone, PartialEq)]
pub enum MembershipError {
    /// A referenced row does not exist.
    NotFound,
    /// Unique-constraint or optimistic-lock conflict. Callers should retry
    /// once before surfacing it.
    Conflict,
    /// The storage backend failed.
    Storage(String),
    /// Invitation delivery failed.
    Delivery(String),
    /// Invariant break inside the process, e.g. a poisoned lock.
    Internal(String),
}

impl std::error::Error for MembershipError {}

impl fmt::Display for MembershipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipError::NotFound => write!(f, "Not found"),
            MembershipError::Conflict => write!(f, "Conflicting concurrent update"),
            MembershipError::Storage(msg) => write!(f, "Storage error: {msg}"),
            MembershipError::Delivery(msg) => write!(f, "Invitation delivery error: {msg}"),
            MembershipError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(MembershipError::NotFound.to_string(), "Not found");
        assert_eq!(
            MembershipError::Storage("connection refused".into()).to_string(),
            "Storage error: connection refused"
        );
        assert_eq!(
            MembershipError::Conflict.to_string(),
            "Conflicting concurrent update"
        );
    }
}
