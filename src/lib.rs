// Catalog export snapshots: download, parse and compare.

pub mod analyzer;
pub mod commands;
pub mod config;
pub mod model;
pub mod notifier;
pub mod parser;
pub mod scraper;
pub mod storage;
pub mod utils;
