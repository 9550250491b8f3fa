use crate::analyzer::differ::{self, DiffReport};
use crate::model::{Feed, OfferSet};

/// Trait defining the interface for a snapshot analyzer.
pub trait Analyzer {
    fn calculate_stats(&self, feed: &Feed) -> SnapshotStats;
    fn compare(&self, older: &OfferSet, newer: &OfferSet) -> DiffReport;
}

/// Implementation of the snapshot analyzer.
pub struct AnalyzerImpl;

impl AnalyzerImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnalyzerImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for AnalyzerImpl {
    /// Counts offers by availability. `total` counts offer elements, so
    /// duplicates collapsed by the parser still show up there.
    fn calculate_stats(&self, feed: &Feed) -> SnapshotStats {
        let available = feed.offers.iter().filter(|o| o.available).count();
        SnapshotStats {
            total: feed.offer_elements,
            unique: feed.offers.len(),
            available,
            unavailable: feed.offers.len() - available,
            categories: feed.categories.len(),
        }
    }

    fn compare(&self, older: &OfferSet, newer: &OfferSet) -> DiffReport {
        differ::diff(older, newer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotStats {
    pub total: usize,
    pub unique: usize,
    pub available: usize,
    pub unavailable: usize,
    pub categories: usize,
}
