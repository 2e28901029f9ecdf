//! Configuration for the cohort membership library.
//!
//! # Example
//!
//! ```rust
//! use cohort::config::TeamsConfig;
//! use cohort::types::{ManagerAccess, MemberAccess};
//!
//! // Use defaults
//! let config = TeamsConfig::default();
//!
//! // Or customize
//! let config = TeamsConfig {
//!     default_member_access: MemberAccess::Application,
//!     default_manager_access: ManagerAccess::Invite,
//!     ..Default::default()
//! };
//! ```

use crate::types::{ManagerAccess, MemberAccess};

/// Settings applied when creating teams.
///
/// Use `TeamsConfig::default()` for sensible production defaults.
#[derive(Debug, Clone)]
pub struct TeamsConfig {
    /// Access mode assigned to new teams when the caller does not choose one.
    ///
    /// Default: `Open`
    pub default_member_access: MemberAccess,

    /// Manager access mode assigned to new teams when the caller does not
    /// choose one.
    ///
    /// Default: `Add`
    pub default_manager_access: ManagerAccess,

    /// Maximum length of a derived team slug, in bytes.
    ///
    /// Default: 50
    pub slug_max_length: usize,
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            default_member_access: MemberAccess::Open,
            default_manager_access: ManagerAccess::Add,
            slug_max_length: 50,
        }
    }
}

impl TeamsConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration for closed teams: membership by invitation
    /// only, managers invite rather than add directly.
    pub fn closed() -> Self {
        Self {
            default_member_access: MemberAccess::Invitation,
            default_manager_access: ManagerAccess::Invite,
            slug_max_length: 50,
        }
    }
}
