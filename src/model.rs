// Core structs: Offer, Param, OfferSet, Category, Feed and error kinds
use std::collections::BTreeMap;
use std::collections::btree_map;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub id: String,
    pub available: bool,
    pub price: f64,
    pub old_price: f64,
    pub currency_id: String,
    pub category_id: i64,
    pub pictures: Vec<String>,
    pub name: String,
    pub profit_commission: f64,
    pub profit: f64,
    pub vendor: String,
    pub vendor_code: String,
    pub description: String,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub id: Option<i64>,
    pub value_id: Option<i64>,
    pub name: String,
    pub value_text: String,
}

/// One snapshot's offers keyed by offer id, iterated in ascending id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferSet {
    offers: BTreeMap<String, Offer>,
}

impl OfferSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-or-replace keyed by `offer.id`. Returns the offer that was replaced, if any.
    pub fn insert(&mut self, offer: Offer) -> Option<Offer> {
        self.offers.insert(offer.id.clone(), offer)
    }

    pub fn get(&self, id: &str) -> Option<&Offer> {
        self.offers.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.offers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.offers.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, Offer> {
        self.offers.values()
    }
}

impl FromIterator<Offer> for OfferSet {
    fn from_iter<I: IntoIterator<Item = Offer>>(iter: I) -> Self {
        let mut set = Self::new();
        for offer in iter {
            set.insert(offer);
        }
        set
    }
}

impl<'a> IntoIterator for &'a OfferSet {
    type Item = &'a Offer;
    type IntoIter = btree_map::Values<'a, String, Offer>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Every attribute of the category element, `id` included.
    pub attributes: BTreeMap<String, String>,
}

/// Everything a full parse of one export document yields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    pub categories: BTreeMap<String, Category>,
    pub offers: OfferSet,
    /// Number of `offer` elements seen, duplicates included.
    pub offer_elements: usize,
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("malformed feed: {0}")]
    MalformedFeed(String),
    #[error("offer element #{position} has no id attribute")]
    MissingOfferId { position: usize },
    #[error("feed encoding error: {0}")]
    Encoding(String),
}

impl From<std::str::Utf8Error> for ParserError {
    fn from(e: std::str::Utf8Error) -> Self {
        ParserError::Encoding(e.to_string())
    }
}

impl From<quick_xml::Error> for ParserError {
    fn from(e: quick_xml::Error) -> Self {
        ParserError::MalformedFeed(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParserError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        ParserError::MalformedFeed(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

impl FetchError {
    /// Whether trying the same request again later can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http(e) => e.is_timeout() || e.is_connect(),
            FetchError::Status(code) => *code == 429 || (500..600).contains(code),
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("invalid storage path: {0}")]
    InvalidPath(String),
}
