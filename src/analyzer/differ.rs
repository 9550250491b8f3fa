use crate::model::{Offer, OfferSet};
use std::collections::BTreeSet;
use std::fmt;

/// How a change should be read by whoever watches the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Positive,
    Alert,
}

/// One classified field change of an offer present in both snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    BecameUnavailable,
    BecameAvailable,
    PriceDecreased { from: f64, to: f64 },
    PriceIncreased { from: f64, to: f64 },
    NameChanged { from: String, to: String },
    DescriptionChanged,
    CommissionDecreased { from: f64, to: f64 },
    CommissionIncreased { from: f64, to: f64 },
}

impl FieldChange {
    pub fn signal(&self) -> Signal {
        match self {
            FieldChange::BecameAvailable
            | FieldChange::PriceDecreased { .. }
            | FieldChange::CommissionIncreased { .. } => Signal::Positive,
            FieldChange::BecameUnavailable
            | FieldChange::PriceIncreased { .. }
            | FieldChange::NameChanged { .. }
            | FieldChange::DescriptionChanged
            | FieldChange::CommissionDecreased { .. } => Signal::Alert,
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldChange::BecameUnavailable => write!(f, "offer is now unavailable"),
            FieldChange::BecameAvailable => write!(f, "offer is now available"),
            FieldChange::PriceDecreased { from, to } => {
                write!(f, "price has been decreased ({from} -> {to})")
            }
            FieldChange::PriceIncreased { from, to } => {
                write!(f, "price has been increased ({from} -> {to})")
            }
            FieldChange::NameChanged { from, to } => {
                write!(f, "name has been changed ({from:?} -> {to:?})")
            }
            FieldChange::DescriptionChanged => write!(f, "description has been changed"),
            FieldChange::CommissionDecreased { from, to } => {
                write!(f, "profit commission has been decreased ({from} -> {to})")
            }
            FieldChange::CommissionIncreased { from, to } => {
                write!(f, "profit commission has been increased ({from} -> {to})")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OfferChanges {
    pub id: String,
    pub changes: Vec<FieldChange>,
}

/// Result of comparing an older snapshot with a newer one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffReport {
    pub additions: BTreeSet<String>,
    pub deletions: BTreeSet<String>,
    /// Offers present in both snapshots with at least one change, ascending by id.
    pub changes: Vec<OfferChanges>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.deletions.is_empty() && self.changes.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.changes.iter().map(|c| c.changes.len()).sum()
    }
}

/// Compares two snapshots. Never fails; either side may be empty.
pub fn diff(older: &OfferSet, newer: &OfferSet) -> DiffReport {
    let additions: BTreeSet<String> = newer
        .ids()
        .filter(|id| !older.contains(id))
        .map(str::to_string)
        .collect();
    let deletions: BTreeSet<String> = older
        .ids()
        .filter(|id| !newer.contains(id))
        .map(str::to_string)
        .collect();

    // OfferSet iterates in ascending id order, so the entries come out sorted.
    let changes = newer
        .iter()
        .filter(|offer| !additions.contains(&offer.id) && !deletions.contains(&offer.id))
        .filter_map(|curr| {
            let prev = older.get(&curr.id)?;
            let changes = compare_offers(prev, curr);
            (!changes.is_empty()).then(|| OfferChanges {
                id: curr.id.clone(),
                changes,
            })
        })
        .collect();

    DiffReport {
        additions,
        deletions,
        changes,
    }
}

/// Field-by-field comparison of two versions of the same offer.
pub fn compare_offers(prev: &Offer, curr: &Offer) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    match (prev.available, curr.available) {
        (true, false) => changes.push(FieldChange::BecameUnavailable),
        (false, true) => changes.push(FieldChange::BecameAvailable),
        (true, true) | (false, false) => {}
    }

    let (from, to) = (prev.price, curr.price);
    if from > to {
        changes.push(FieldChange::PriceDecreased { from, to });
    } else if from < to {
        changes.push(FieldChange::PriceIncreased { from, to });
    }

    if prev.name != curr.name {
        changes.push(FieldChange::NameChanged {
            from: prev.name.clone(),
            to: curr.name.clone(),
        });
    }

    if prev.description != curr.description {
        changes.push(FieldChange::DescriptionChanged);
    }

    // A shrinking commission is bad news for the reseller.
    let (from, to) = (prev.profit_commission, curr.profit_commission);
    if from > to {
        changes.push(FieldChange::CommissionDecreased { from, to });
    } else if from < to {
        changes.push(FieldChange::CommissionIncreased { from, to });
    }

    changes
}
