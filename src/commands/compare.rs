use crate::analyzer::{Analyzer, AnalyzerImpl, DiffReport};
use crate::commands::CommandError;
use crate::model::Feed;
use crate::notifier::{MessageSink, render_report, render_stats};
use crate::parser::OfferFeedParser;
use crate::storage::Storage;
use crate::storage::exports::SnapshotPair;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum CompareOutcome {
    NothingToCompare,
    Compared { pair: SnapshotPair, report: DiffReport },
}

/// Diffs the two snapshots chosen by `select` from the exports folder listing and
/// narrates the result to `sink`.
pub fn compare_latest<F>(
    storage: &dyn Storage,
    exports_folder: &str,
    select: F,
    sink: &dyn MessageSink,
) -> Result<CompareOutcome, CommandError>
where
    F: Fn(&[String]) -> Option<SnapshotPair>,
{
    let files = storage.list_files(exports_folder)?;
    let Some(pair) = select(&files) else {
        sink.info("There are no files to compare. Exiting ...");
        return Ok(CompareOutcome::NothingToCompare);
    };

    let parser = OfferFeedParser::new();
    let analyzer = AnalyzerImpl::new();

    let older = load_snapshot(storage, &parser, &analyzer, &pair.older, sink)?;
    let newer = load_snapshot(storage, &parser, &analyzer, &pair.newer, sink)?;

    info!("Comparing {} with {}", pair.older, pair.newer);
    let report = analyzer.compare(&older.offers, &newer.offers);
    render_report(&report, sink);
    info!(
        "Comparison done: {} additions, {} deletions, {} field changes",
        report.additions.len(),
        report.deletions.len(),
        report.change_count()
    );

    Ok(CompareOutcome::Compared { pair, report })
}

fn load_snapshot(
    storage: &dyn Storage,
    parser: &OfferFeedParser,
    analyzer: &AnalyzerImpl,
    path: &str,
    sink: &dyn MessageSink,
) -> Result<Feed, CommandError> {
    sink.info(&format!("Start parsing export file: {path}"));
    let bytes = storage.read(path)?;
    let feed = parser.parse_bytes(&bytes).map_err(|source| CommandError::Parse {
        path: path.to_string(),
        source,
    })?;
    render_stats(path, &analyzer.calculate_stats(&feed), sink);
    Ok(feed)
}
