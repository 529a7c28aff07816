//! Line encoding for listing records.
//!
//! A record is one line of seven `|`-separated fields in the order
//! `id|owner|title|description|price|category|created_at`. Quote characters
//! are stripped from text fields on the way in; `|` is not escaped, so text
//! fields must not contain it.

use crate::{Error, Result};

pub const FIELD_SEPARATOR: char = '|';
pub const FIELD_COUNT: usize = 7;
/// Highest id a stored record may carry; the next id must still fit.
pub const MAX_ID: u64 = u64::MAX - 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub id: u64,
    pub owner: String,
    pub title: String,
    pub description: String,
    pub price: u64,
    pub category: String,
    pub created_at: String,
}

impl Listing {
    /// Copy with every text field quote-stripped, as it would be stored.
    pub fn normalized(&self) -> Listing {
        Listing {
            id: self.id,
            owner: strip_quotes(&self.owner),
            title: strip_quotes(&self.title),
            description: strip_quotes(&self.description),
            price: self.price,
            category: strip_quotes(&self.category),
            created_at: strip_quotes(&self.created_at),
        }
    }

    /// Whether both listings describe the same product.
    pub fn same_product(&self, other: &Listing) -> bool {
        strip_quotes(&self.title) == strip_quotes(&other.title)
            && strip_quotes(&self.description) == strip_quotes(&other.description)
            && strip_quotes(&self.category) == strip_quotes(&other.category)
    }
}

pub fn strip_quotes(text: &str) -> String {
    text.chars().filter(|c| *c != '\'' && *c != '"').collect()
}

pub fn encode(listing: &Listing) -> String {
    let listing = listing.normalized();
    format!(
        "{}|{}|{}|{}|{}|{}|{}",
        listing.id,
        listing.owner,
        listing.title,
        listing.description,
        listing.price,
        listing.category,
        listing.created_at
    )
}

pub fn decode(line: &str) -> Result<Listing> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() != FIELD_COUNT {
        return Err(Error::MalformedRecord(format!(
            "expected {FIELD_COUNT} fields, found {}: {line}",
            fields.len()
        )));
    }
    let id = fields[0]
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::MalformedRecord(format!("invalid id {:?}", fields[0])))?;
    if id > MAX_ID {
        return Err(Error::MalformedRecord(format!("id {id} out of range")));
    }
    let price = fields[4]
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::MalformedRecord(format!("invalid price {:?}", fields[4])))?;

    Ok(Listing {
        id,
        owner: fields[1].to_string(),
        title: fields[2].to_string(),
        description: fields[3].to_string(),
        price,
        category: fields[5].to_string(),
        created_at: fields[6].to_string(),
    })
}

/// The soft-delete marker is an empty id field; a blanked line qualifies.
pub fn is_deleted(line: &str) -> bool {
    line.split(FIELD_SEPARATOR)
        .next()
        .map_or(true, |id| id.is_empty())
}
