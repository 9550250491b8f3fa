// Notifier module: leveled message sinks and diff report rendering.

pub mod console;
pub mod report;

pub use console::TracingSink;
pub use report::{render_report, render_stats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Receives human-readable findings.
pub trait MessageSink {
    fn send(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.send(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.send(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.send(Level::Error, message);
    }
}
