//! Event system for membership mutations.
//!
//! Events are fired from every committed roster command and transition. If no
//! listeners are registered, they are silently ignored (zero overhead).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cohort::register_event_listeners;
//! use cohort::events::listeners::LoggingListener;
//!
//! fn main() {
//!     // register listeners at startup
//!     register_event_listeners(|registry| {
//!         registry.listen(LoggingListener::new());
//!     });
//!
//!     // events will now be logged
//! }
//! ```
//!
//! # Custom Listeners
//!
//! Implement the [`Listener`] trait to create custom event handlers:
//!
//! ```rust,ignore
//! use cohort::events::{Listener, TeamEvent};
//! use async_trait::async_trait;
//!
//! struct AuditListener;
//!
//! #[async_trait]
//! impl Listener for AuditListener {
//!     async fn handle(&self, event: &TeamEvent) {
//!         match event {
//!             TeamEvent::RemovedMember { .. } => {
//!                 // append to the audit trail
//!             }
//!             _ => {}
//!         }
//!     }
//! }
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::TeamEvent;
pub use listener::Listener;
pub use registry::{dispatch, register_event_listeners};
