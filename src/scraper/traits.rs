use crate::model::FetchError;
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// `Last-Modified` of the remote feed, `None` when the header is missing or unreadable.
    async fn last_modified(&self) -> Result<Option<DateTime<Utc>>, FetchError>;
    async fn fetch(&self) -> Result<Vec<u8>, FetchError>;
}
