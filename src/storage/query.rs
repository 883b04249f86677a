//! Backend-neutral query description
//!
//! Handlers describe what they want with these types; each store translates
//! them into its own query language.

use crate::core::error::{Error, Result};
use crate::types::{Toy, ToyId};
use std::str::FromStr;

/// Which toys a find should return
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToyFilter {
    /// Every document
    All,
    /// The document with this id
    Id(ToyId),
    /// Exact category match
    Category(String),
    /// Exact seller email match
    Seller(String),
    /// Case-insensitive literal substring of the title
    TitleContains(String),
}

impl ToyFilter {
    /// Evaluate the filter against a single toy
    pub fn matches(&self, toy: &Toy) -> bool {
        match self {
            ToyFilter::All => true,
            ToyFilter::Id(id) => toy.id == *id,
            ToyFilter::Category(category) => toy.fields.category == *category,
            ToyFilter::Seller(seller) => toy.fields.seller_email == *seller,
            ToyFilter::TitleContains(needle) => toy
                .fields
                .toy_title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}

/// Price ordering for seller listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Cheapest first (`lowToHigh`)
    Ascending,
    /// Most expensive first (`highToLow`)
    Descending,
}

impl SortOrder {
    /// Direction as used in store sort documents
    pub fn direction(self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lowToHigh" => Ok(SortOrder::Ascending),
            "highToLow" => Ok(SortOrder::Descending),
            other => Err(Error::validation(format!(
                "Unknown sort mode '{}', expected 'highToLow' or 'lowToHigh'",
                other
            ))),
        }
    }
}

/// Ordering and size limits for a find
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Order by price, ties by id
    pub sort: Option<SortOrder>,
    /// Maximum number of documents
    pub limit: Option<usize>,
}

impl FindOptions {
    /// Cap the result size
    pub fn limit(limit: usize) -> Self {
        Self {
            sort: None,
            limit: Some(limit),
        }
    }

    /// Order results by price
    pub fn sorted(order: SortOrder) -> Self {
        Self {
            sort: Some(order),
            limit: None,
        }
    }
}
