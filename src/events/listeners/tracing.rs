use async_trait::async_trait;

use crate::events::{Listener, TeamEvent};

/// Emits membership events as tracing events.
///
/// Requires the `tracing` feature to be enabled.
///
/// # Example
///
/// ```rust,ignore
/// use cohort::register_event_listeners;
/// use cohort::events::listeners::TracingListener;
///
/// register_event_listeners(|registry| {
///     registry.listen(TracingListener);
/// });
/// ```
pub struct TracingListener;

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &TeamEvent) {
        tracing::info!(
            target: "cohort::events",
            event_name = event.name(),
            ?event,
            "team event"
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::{Membership, MembershipRole, MembershipState};

    #[tokio::test]
    async fn test_tracing_listener_handle() {
        let listener = TracingListener;
        let now = Utc::now();
        let event = TeamEvent::JoinedTeam {
            team_id: 1,
            membership: Membership {
                id: 1,
                team_id: 1,
                user_id: Some(2),
                invitation_id: Some(3),
                state: MembershipState::Accepted,
                role: MembershipRole::Member,
                created_at: now,
                updated_at: now,
            },
            at: now,
        };

        // should not panic
        listener.handle(&event).await;
    }
}
