use crate::commands::CommandError;
use crate::scraper::FeedSource;
use crate::storage::{Storage, exports};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The newest stored export already carries the feed's timestamp.
    UpToDate { last_modified: DateTime<Utc> },
    Saved { path: String },
}

/// Stores a new `export_<timestamp>.xml` snapshot unless the feed has not changed
/// since the latest stored one.
pub async fn download(
    source: &dyn FeedSource,
    storage: &dyn Storage,
    exports_folder: &str,
) -> Result<DownloadOutcome, CommandError> {
    let last_modified = match source.last_modified().await? {
        Some(dt) => dt,
        None => {
            warn!("Feed has no usable Last-Modified header, falling back to current time");
            Utc::now()
        }
    };
    let timestamp = last_modified.timestamp();

    let files = storage.list_files(exports_folder)?;
    let stored = exports::latest(&files).and_then(|p| exports::timestamp_from_path(p));
    if stored == Some(timestamp.to_string().as_str()) {
        warn!(
            "File has not been updated since {} (timestamp {}). Nothing to download.",
            last_modified.to_rfc3339(),
            timestamp
        );
        return Ok(DownloadOutcome::UpToDate { last_modified });
    }

    info!("Updates are available, downloading feed...");
    let body = source.fetch().await?;

    let path = exports::export_path(exports_folder, timestamp);
    storage.write(&path, &body)?;
    info!("File {} has been saved successfully", path);

    Ok(DownloadOutcome::Saved { path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FetchError;
    use crate::storage::FsStorage;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct StaticFeed {
        last_modified: Option<DateTime<Utc>>,
        body: &'static str,
        fetches: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl FeedSource for StaticFeed {
        async fn last_modified(&self) -> Result<Option<DateTime<Utc>>, FetchError> {
            Ok(self.last_modified)
        }

        async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.as_bytes().to_vec())
        }
    }

    fn feed_at(timestamp: i64) -> StaticFeed {
        StaticFeed {
            last_modified: Utc.timestamp_opt(timestamp, 0).single(),
            body: "<yml_catalog/>",
            fetches: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn saves_new_snapshot() {
        let dir = TempDir::new().unwrap();
        let storage = FsStorage::new(dir.path());
        storage.write("exports/export_100.xml", b"old").unwrap();
        let feed = feed_at(200);

        let outcome = download(&feed, &storage, "exports").await.unwrap();
        assert_eq!(
            outcome,
            DownloadOutcome::Saved {
                path: "exports/export_200.xml".into()
            }
        );
        assert_eq!(storage.read("exports/export_200.xml").unwrap(), b"<yml_catalog/>");
    }

    #[tokio::test]
    async fn skips_when_timestamp_matches_latest_export() {
        let dir = TempDir::new().unwrap();
        let storage = FsStorage::new(dir.path());
        storage.write("exports/export_100.xml", b"old").unwrap();
        storage.write("exports/export_200.xml", b"newest").unwrap();
        let feed = feed_at(200);

        let outcome = download(&feed, &storage, "exports").await.unwrap();
        assert!(matches!(outcome, DownloadOutcome::UpToDate { .. }));
        assert_eq!(feed.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(storage.list_files("exports").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn first_download_into_empty_storage() {
        let dir = TempDir::new().unwrap();
        let storage = FsStorage::new(dir.path());
        let outcome = download(&feed_at(5), &storage, "exports").await.unwrap();
        assert_eq!(
            outcome,
            DownloadOutcome::Saved {
                path: "exports/export_5.xml".into()
            }
        );
    }

    #[tokio::test]
    async fn failed_store_leaves_no_export_behind() {
        let dir = TempDir::new().unwrap();
        let storage = FsStorage::new(dir.path());
        storage.write("exports/export_100.xml", b"old").unwrap();
        std::fs::create_dir_all(dir.path().join("exports/export_200.xml")).unwrap();

        let err = download(&feed_at(200), &storage, "exports").await.unwrap_err();
        assert!(matches!(err, CommandError::Storage(_)), "{err:?}");
        assert_eq!(storage.list_files("exports").unwrap(), vec!["exports/export_100.xml"]);
    }
}
