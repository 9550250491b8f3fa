// Export feed XML parsing: shop > categories / offers
use crate::model::{Category, Feed, Offer, OfferSet, Param, ParserError};
use crate::utils::{coerce_bool, coerce_f64, coerce_i64};
use encoding_rs::{Encoding, UTF_8};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub trait Parser {
    fn parse(&self, document: &str) -> Result<OfferSet, ParserError>;
}

pub struct OfferFeedParser;

impl OfferFeedParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses raw file contents, decoded per BOM, then XML declaration, then UTF-8.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Feed, ParserError> {
        let document = decode_document(bytes)?;
        self.parse_feed(&document)
    }

    /// Parses the whole document: categories, offers and the offer element count.
    pub fn parse_feed(&self, document: &str) -> Result<Feed, ParserError> {
        let mut reader = Reader::from_str(document);
        let mut path: Vec<String> = Vec::new();
        let mut builder = FeedBuilder::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = element_name(&e)?;
                    builder.open(&name, &e, &path)?;
                    path.push(name);
                }
                Event::Empty(e) => {
                    let name = element_name(&e)?;
                    builder.open(&name, &e, &path)?;
                    builder.close(&name, &path)?;
                }
                Event::End(_) => {
                    // quick-xml has already checked that the end tag matches.
                    if let Some(name) = path.pop() {
                        builder.close(&name, &path)?;
                    }
                }
                Event::Text(e) => builder.text(&e.unescape()?, path.len()),
                Event::CData(e) => builder.text(&String::from_utf8_lossy(e.as_ref()), path.len()),
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = path.last() {
            return Err(ParserError::MalformedFeed(format!(
                "document ended inside <{open}>"
            )));
        }
        builder.finish()
    }
}

impl Default for OfferFeedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for OfferFeedParser {
    fn parse(&self, document: &str) -> Result<OfferSet, ParserError> {
        self.parse_feed(document).map(|feed| feed.offers)
    }
}

fn decode_document(bytes: &[u8]) -> Result<Cow<'_, str>, ParserError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_as(encoding, &bytes[bom_len..]);
    }
    let encoding = declared_encoding(bytes)?.unwrap_or(UTF_8);
    decode_as(encoding, bytes)
}

fn decode_as<'a>(encoding: &'static Encoding, bytes: &'a [u8]) -> Result<Cow<'a, str>, ParserError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| ParserError::Encoding(format!("bytes are not valid {}", encoding.name())))
}

/// Encoding named by the `<?xml ... encoding="..."?>` declaration, if the document starts with one.
fn declared_encoding(bytes: &[u8]) -> Result<Option<&'static Encoding>, ParserError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    // Anything unreadable here is left for the UTF-8 decode and the parser to report.
    let Ok(Event::Decl(decl)) = reader.read_event_into(&mut buf) else {
        return Ok(None);
    };
    let Some(Ok(label)) = decl.encoding() else {
        return Ok(None);
    };
    Encoding::for_label(&label).map(Some).ok_or_else(|| {
        ParserError::Encoding(format!(
            "unsupported encoding {:?}",
            String::from_utf8_lossy(&label)
        ))
    })
}

fn element_name(start: &BytesStart) -> Result<String, ParserError> {
    Ok(std::str::from_utf8(start.name().as_ref())?.to_string())
}

fn attributes(start: &BytesStart) -> Result<BTreeMap<String, String>, ParserError> {
    let mut map = BTreeMap::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

// Element depths: root 0, shop 1, offers/categories 2, offer/category 3, offer field 4.
const OFFER_DEPTH: usize = 3;
const FIELD_DEPTH: usize = 4;

/// Offer values exactly as found in the document; `None` means absent.
#[derive(Debug, Default)]
struct RawOffer {
    id: Option<String>,
    available: Option<String>,
    price: Option<String>,
    old_price: Option<String>,
    currency_id: Option<String>,
    category_id: Option<String>,
    pictures: Vec<String>,
    name: Option<String>,
    profit_commission: Option<String>,
    profit: Option<String>,
    vendor: Option<String>,
    vendor_code: Option<String>,
    description: Option<String>,
    params: Vec<RawParam>,
}

#[derive(Debug)]
struct RawParam {
    id: Option<String>,
    value_id: Option<String>,
    name: Option<String>,
    text: String,
}

#[derive(Debug)]
struct OpenField {
    name: String,
    attributes: BTreeMap<String, String>,
    text: String,
}

#[derive(Debug)]
struct OpenCategory {
    attributes: BTreeMap<String, String>,
    text: String,
}

#[derive(Debug, Default)]
struct FeedBuilder {
    seen_shop: bool,
    seen_offers: bool,
    offer: Option<RawOffer>,
    field: Option<OpenField>,
    category: Option<OpenCategory>,
    feed: Feed,
    duplicates: usize,
}

fn under(path: &[String], container: &str) -> bool {
    path.len() == OFFER_DEPTH && path[1] == "shop" && path[2] == container
}

fn set_once(slot: &mut Option<String>, value: String) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

impl FeedBuilder {
    /// `path` holds the ancestors of the element being opened.
    fn open(&mut self, name: &str, start: &BytesStart, path: &[String]) -> Result<(), ParserError> {
        match (path.len(), name) {
            (1, "shop") => self.seen_shop = true,
            (2, "offers") if path[1] == "shop" => self.seen_offers = true,
            (OFFER_DEPTH, "offer") if under(path, "offers") => {
                let mut attrs = attributes(start)?;
                self.offer = Some(RawOffer {
                    id: attrs.remove("id"),
                    available: attrs.remove("available"),
                    ..RawOffer::default()
                });
            }
            (OFFER_DEPTH, "category") if under(path, "categories") => {
                self.category = Some(OpenCategory {
                    attributes: attributes(start)?,
                    text: String::new(),
                });
            }
            (FIELD_DEPTH, _) if self.offer.is_some() => {
                let attrs = if name == "param" {
                    attributes(start)?
                } else {
                    BTreeMap::new()
                };
                self.field = Some(OpenField {
                    name: name.to_string(),
                    attributes: attrs,
                    text: String::new(),
                });
            }
            _ => {}
        }
        Ok(())
    }

    /// `depth` is the number of currently open elements; only direct text children count.
    fn text(&mut self, text: &str, depth: usize) {
        if depth == FIELD_DEPTH + 1 {
            if let Some(field) = self.field.as_mut() {
                field.text.push_str(text);
            }
        } else if depth == OFFER_DEPTH + 1 {
            if let Some(category) = self.category.as_mut() {
                category.text.push_str(text);
            }
        }
    }

    /// `path` holds the ancestors of the element being closed.
    fn close(&mut self, name: &str, path: &[String]) -> Result<(), ParserError> {
        match path.len() {
            FIELD_DEPTH => {
                if let (Some(field), Some(offer)) = (self.field.take(), self.offer.as_mut()) {
                    offer.assign(field);
                }
            }
            OFFER_DEPTH if name == "offer" => {
                if let Some(raw) = self.offer.take() {
                    self.feed.offer_elements += 1;
                    let offer = raw.into_offer(self.feed.offer_elements)?;
                    let id = offer.id.clone();
                    if self.feed.offers.insert(offer).is_some() {
                        self.duplicates += 1;
                        warn!("Duplicate offer id {}, keeping the later element", id);
                    }
                }
            }
            OFFER_DEPTH if name == "category" => {
                if let Some(open) = self.category.take() {
                    let id = open.attributes.get("id").cloned().unwrap_or_default();
                    self.feed.categories.insert(
                        id.clone(),
                        Category {
                            id,
                            name: open.text,
                            attributes: open.attributes,
                        },
                    );
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<Feed, ParserError> {
        if !self.seen_shop {
            return Err(ParserError::MalformedFeed("missing <shop> element".into()));
        }
        if !self.seen_offers {
            return Err(ParserError::MalformedFeed("missing <shop><offers> element".into()));
        }
        debug!(
            "Parsed {} offer elements into {} offers ({} duplicates), {} categories",
            self.feed.offer_elements,
            self.feed.offers.len(),
            self.duplicates,
            self.feed.categories.len()
        );
        Ok(self.feed)
    }
}

impl RawOffer {
    fn assign(&mut self, field: OpenField) {
        let OpenField { name, mut attributes, text } = field;
        match name.as_str() {
            "price" => set_once(&mut self.price, text),
            "oldprice" => set_once(&mut self.old_price, text),
            "currencyId" => set_once(&mut self.currency_id, text),
            "categoryId" => set_once(&mut self.category_id, text),
            "picture" => self.pictures.push(text),
            "name" => set_once(&mut self.name, text),
            "profit_commission" => set_once(&mut self.profit_commission, text),
            "profit" => set_once(&mut self.profit, text),
            "vendor" => set_once(&mut self.vendor, text),
            "vendorCode" => set_once(&mut self.vendor_code, text),
            "description" => set_once(&mut self.description, text),
            "param" => self.params.push(RawParam {
                id: attributes.remove("id"),
                value_id: attributes.remove("valueid"),
                name: attributes.remove("name"),
                text,
            }),
            _ => {}
        }
    }

    /// Applies the per-field defaults. `position` is the 1-based index of the offer element.
    fn into_offer(self, position: usize) -> Result<Offer, ParserError> {
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(ParserError::MissingOfferId { position }),
        };

        let mut pictures = self.pictures;
        pictures.sort();

        Ok(Offer {
            id,
            available: coerce_bool(self.available.as_deref()),
            price: coerce_f64(self.price.as_deref()),
            old_price: coerce_f64(self.old_price.as_deref()),
            currency_id: self.currency_id.unwrap_or_default(),
            category_id: coerce_i64(self.category_id.as_deref()),
            pictures,
            name: self.name.unwrap_or_default(),
            profit_commission: coerce_f64(self.profit_commission.as_deref()),
            profit: coerce_f64(self.profit.as_deref()),
            vendor: self.vendor.unwrap_or_default(),
            vendor_code: self.vendor_code.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            params: self.params.into_iter().map(RawParam::into_param).collect(),
        })
    }
}

impl RawParam {
    fn into_param(self) -> Param {
        // Absent, empty and zero ids are all dropped.
        let non_zero = |raw: Option<String>| {
            raw.filter(|v| !v.trim().is_empty())
                .map(|v| coerce_i64(Some(&v)))
                .filter(|v| *v != 0)
        };
        Param {
            id: non_zero(self.id),
            value_id: non_zero(self.value_id),
            name: self.name.unwrap_or_default(),
            value_text: self.text,
        }
    }
}
