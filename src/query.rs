//! Filtered and aggregated views over the record store.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::codec::{strip_quotes, Listing};
use crate::store::RecordStore;
use crate::timestamp;
use crate::{Error, Result};

/// The fields of a listing shown by category queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub title: String,
    pub description: String,
    pub price: u64,
    pub created_at: String,
}

impl From<&Listing> for Projection {
    fn from(listing: &Listing) -> Self {
        Self {
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.price,
            created_at: listing.created_at.clone(),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.title, self.description, self.price, self.created_at
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Price,
    Time,
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "price" | "sort_price" => Ok(SortKey::Price),
            "time" | "sort_time" => Ok(SortKey::Time),
            _ => Err(Error::InvalidSort(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl FromStr for SortDir {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDir::Asc),
            "desc" | "dsc" => Ok(SortDir::Desc),
            _ => Err(Error::InvalidSort(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub dir: SortDir,
}

impl SortSpec {
    pub fn new(key: SortKey, dir: SortDir) -> Self {
        Self { key, dir }
    }

    pub fn parse(key: &str, dir: &str) -> Result<Self> {
        Ok(Self::new(key.parse()?, dir.parse()?))
    }
}

fn matches_text(stored: &str, wanted: &str) -> bool {
    strip_quotes(stored).to_lowercase() == strip_quotes(wanted).to_lowercase()
}

/// Listings of `owner` in `category`, in file order unless sorted.
pub fn by_category(
    listings: &[Listing],
    owner: &str,
    category: &str,
    sort: Option<SortSpec>,
) -> Result<Vec<Projection>> {
    let mut owner_seen = false;
    let mut projections = Vec::new();
    for listing in listings {
        if !matches_text(&listing.owner, owner) {
            continue;
        }
        owner_seen = true;
        if matches_text(&listing.category, category) {
            projections.push(Projection::from(listing));
        }
    }

    if !owner_seen {
        return Err(Error::UnknownOwner(owner.to_string()));
    }
    if projections.is_empty() {
        return Err(Error::CategoryNotFound(category.to_string()));
    }
    if let Some(spec) = sort {
        sort_projections(&mut projections, spec);
    }
    Ok(projections)
}

/// Most frequent lowercase category of `owner`; ties go to the
/// alphabetically first one.
pub fn top_category(listings: &[Listing], owner: &str) -> Result<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for listing in listings.iter().filter(|l| matches_text(&l.owner, owner)) {
        *counts
            .entry(strip_quotes(&listing.category).to_lowercase())
            .or_default() += 1;
    }

    let mut best: Option<(&String, usize)> = None;
    for (category, &count) in &counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((category, count));
        }
    }
    best.map(|(category, _)| category.clone())
        .ok_or_else(|| Error::NoListings(owner.to_string()))
}

/// Stable sort. Unparsable timestamps sort after every parsable one in
/// both directions.
pub fn sort_projections(projections: &mut [Projection], spec: SortSpec) {
    match spec.key {
        SortKey::Price => projections.sort_by(|a, b| directed(a.price.cmp(&b.price), spec.dir)),
        SortKey::Time => projections.sort_by(|a, b| {
            match (
                timestamp::parse(&a.created_at),
                timestamp::parse(&b.created_at),
            ) {
                (Some(ta), Some(tb)) => directed(ta.cmp(&tb), spec.dir),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }),
    }
}

fn directed(ordering: Ordering, dir: SortDir) -> Ordering {
    match dir {
        SortDir::Asc => ordering,
        SortDir::Desc => ordering.reverse(),
    }
}

impl RecordStore {
    pub fn by_category(
        &self,
        owner: &str,
        category: &str,
        sort: Option<SortSpec>,
    ) -> Result<Vec<Projection>> {
        match by_category(&self.listings()?, owner, category, sort) {
            // A registered user with nothing listed has no such category.
            Err(Error::UnknownOwner(_)) if self.registry().exists(&strip_quotes(owner))? => {
                Err(Error::CategoryNotFound(category.to_string()))
            }
            other => other,
        }
    }

    pub fn top_category(&self, owner: &str) -> Result<String> {
        top_category(&self.listings()?, owner)
    }
}
