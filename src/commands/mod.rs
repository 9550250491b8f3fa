// Commands: the download and compare-latest driver steps.

pub mod compare;
pub mod download;

use crate::model::{FetchError, ParserError, StorageError};
use thiserror::Error;

pub use compare::{CompareOutcome, compare_latest};
pub use download::{DownloadOutcome, download};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParserError,
    },
    #[error("no offers URL configured (set offers_url or HUBBER_OFFERS_URL)")]
    MissingOffersUrl,
}
