// Scraper module: access to the remote offers feed.

pub mod fetcher;
pub mod traits;

pub use fetcher::HttpFeedSource;
pub use traits::FeedSource;
