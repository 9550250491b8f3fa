// Parser module: export feed documents into offer sets.

pub mod offer_parser;

pub use offer_parser::{OfferFeedParser, Parser};
