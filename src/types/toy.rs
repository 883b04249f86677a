//! Toy listing record and its identifier

use crate::core::error::{Error, Result};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Store-assigned toy identifier
///
/// Wraps a 12-byte ObjectId. On the HTTP surface it is always the 24 character
/// lowercase hex form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToyId(ObjectId);

impl ToyId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Underlying ObjectId
    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for ToyId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for ToyId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for ToyId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ObjectId::parse_str(s)
            .map(ToyId)
            .map_err(|_| Error::MalformedIdentifier(format!("'{}' is not a 24 character hex id", s)))
    }
}

impl fmt::Display for ToyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for ToyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for ToyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        ObjectId::parse_str(&hex)
            .map(ToyId)
            .map_err(serde::de::Error::custom)
    }
}

/// Every caller-supplied field of a toy listing
///
/// This is the body of create and update requests. Updates replace the whole
/// record with it, so an omitted optional field is removed from the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToyFields {
    /// Display name
    pub toy_title: String,
    /// Classification label
    pub category: String,
    /// Owning seller, matched exactly by the seller listings
    pub seller_email: String,
    /// Seller display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    /// Price, no currency or range constraint
    pub price: f64,
    /// Stock count
    pub quantity: i64,
    /// Rating, unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Picture of the toy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Free text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ToyFields {
    /// Reject values the store would accept but no listing can use
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("toyTitle", &self.toy_title),
            ("category", &self.category),
            ("sellerEmail", &self.seller_email),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::validation(format!("`{}` must not be blank", name)));
            }
        }

        if !self.price.is_finite() {
            return Err(Error::validation("`price` must be a finite number"));
        }

        if let Some(rating) = self.rating {
            if !rating.is_finite() {
                return Err(Error::validation("`rating` must be a finite number"));
            }
        }

        Ok(())
    }
}

/// A stored toy listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toy {
    /// Identifier assigned by the store
    #[serde(rename = "_id")]
    pub id: ToyId,
    /// Listing content
    #[serde(flatten)]
    pub fields: ToyFields,
}

impl Toy {
    /// Pair an identifier with its fields
    pub fn new(id: ToyId, fields: ToyFields) -> Self {
        Self { id, fields }
    }
}
