// Analyzer module: snapshot comparison and per-snapshot statistics.

pub mod differ;
pub mod snapshot_analysis;

// Re-export the main Analyzer implementation for ease of use.
pub use differ::{DiffReport, FieldChange, OfferChanges, Signal, compare_offers, diff};
pub use snapshot_analysis::{Analyzer, AnalyzerImpl, SnapshotStats};
