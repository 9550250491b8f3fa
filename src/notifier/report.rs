use crate::analyzer::{DiffReport, FieldChange, Signal, SnapshotStats};
use crate::notifier::{Level, MessageSink};

fn level_for(change: &FieldChange) -> Level {
    match change.signal() {
        Signal::Positive => Level::Info,
        Signal::Alert => Level::Error,
    }
}

/// Narrates a diff: addition/deletion counts always, then one message per field change.
pub fn render_report(report: &DiffReport, sink: &dyn MessageSink) {
    let count_level = |n: usize| if n > 0 { Level::Warn } else { Level::Info };

    sink.send(
        count_level(report.additions.len()),
        &format!("Additions were made: {}", report.additions.len()),
    );
    sink.send(
        count_level(report.deletions.len()),
        &format!("Deletions were made: {}", report.deletions.len()),
    );

    for offer in &report.changes {
        for change in &offer.changes {
            sink.send(level_for(change), &format!("Offer {}: {}", offer.id, change));
        }
    }
}

pub fn render_stats(path: &str, stats: &SnapshotStats, sink: &dyn MessageSink) {
    sink.info(&format!("Total offers in {}: {}", path, stats.total));
    if stats.unique != stats.total {
        sink.warn(&format!(
            "Duplicate offer ids in {}: {} elements collapsed into {} offers",
            path, stats.total, stats.unique
        ));
    }
    sink.info(&format!("Total available offers: {}", stats.available));
    sink.info(&format!("Total unavailable offers: {}", stats.unavailable));
}
