use crate::notifier::{Level, MessageSink};
use tracing::{error, info, warn};

/// Forwards messages to the tracing subscriber at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl MessageSink for TracingSink {
    fn send(&self, level: Level, message: &str) {
        match level {
            Level::Info => info!(target: "hubber_diff::report", "{}", message),
            Level::Warn => warn!(target: "hubber_diff::report", "{}", message),
            Level::Error => error!(target: "hubber_diff::report", "{}", message),
        }
    }
}
