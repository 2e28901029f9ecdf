use async_trait::async_trait;

use crate::events::{Listener, TeamEvent};

/// Logs all membership events using the `log` crate.
///
/// # Example
///
/// ```rust,ignore
/// use cohort::register_event_listeners;
/// use cohort::events::listeners::LoggingListener;
///
/// register_event_listeners(|registry| {
///     registry.listen(LoggingListener::new());
/// });
/// ```
pub struct LoggingListener {
    level: log::Level,
}

impl LoggingListener {
    /// Creates a new logging listener at INFO level.
    pub fn new() -> Self {
        Self {
            level: log::Level::Info,
        }
    }

    /// Creates a new logging listener at the specified level.
    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Listener for LoggingListener {
    async fn handle(&self, event: &TeamEvent) {
        log::log!(
            target: "cohort::events",
            self.level,
            "event={} {:?}",
            event.name(),
            event
        );
    }
}
