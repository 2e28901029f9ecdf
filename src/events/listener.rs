use async_trait::async_trait;

use super::TeamEvent;

/// Trait for handling membership events asynchronously.
///
/// Implement this trait to create custom event listeners. Listeners can
/// perform any async operation: logging, sending notifications, appending
/// to an audit trail, etc.
///
/// # Example
///
/// ```rust,ignore
/// use cohort::events::{Listener, TeamEvent};
/// use async_trait::async_trait;
///
/// struct NotifyManagersListener {
///     webhook_url: String,
/// }
///
/// #[async_trait]
/// impl Listener for NotifyManagersListener {
///     async fn handle(&self, event: &TeamEvent) {
///         if let TeamEvent::AcceptedMembership { team_id, .. } = event {
///             // post to the team channel
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Handle a membership event.
    ///
    /// This method is called for every event dispatched. Filter by matching
    /// on the event variant to handle specific events.
    async fn handle(&self, event: &TeamEvent);
}
