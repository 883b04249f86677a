//! Write acknowledgments returned to clients
//!
//! Field names follow the shape document stores report for writes, so existing
//! clients that read `insertedId` or `deletedCount` keep working.

use crate::types::ToyId;
use serde::{Deserialize, Serialize};

/// Result of inserting one toy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    /// Whether the write was acknowledged by the store
    pub acknowledged: bool,
    /// Identifier of the new document
    pub inserted_id: ToyId,
}

impl InsertAck {
    /// Acknowledge an insert of `id`
    pub fn new(inserted_id: ToyId) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

/// Result of replacing one toy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    /// Whether the write was acknowledged by the store
    pub acknowledged: bool,
    /// Documents matched by the id filter (0 or 1)
    pub matched_count: u64,
    /// Documents whose content changed (0 or 1)
    pub modified_count: u64,
    /// Documents inserted because nothing matched (0 or 1)
    pub upserted_count: u64,
    /// Identifier of the inserted document, on upsert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<ToyId>,
}

impl UpdateAck {
    /// An existing document was matched
    pub fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_count: 0,
            upserted_id: None,
        }
    }

    /// Nothing matched and a new document was inserted
    pub fn upserted(id: ToyId) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id),
        }
    }

    /// Nothing matched and nothing was written
    pub fn missed() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 0,
            upserted_id: None,
        }
    }

    /// True when no document was matched or inserted
    pub fn is_miss(&self) -> bool {
        self.matched_count == 0 && self.upserted_id.is_none()
    }
}

/// Result of deleting one toy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    /// Whether the write was acknowledged by the store
    pub acknowledged: bool,
    /// Documents removed (0 or 1)
    pub deleted_count: u64,
}

impl DeleteAck {
    /// Acknowledge removal of `deleted_count` documents
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_ack_shapes() {
        let matched = serde_json::to_value(UpdateAck::matched(true)).unwrap();
        assert_eq!(
            matched,
            json!({ "acknowledged": true, "matchedCount": 1, "modifiedCount": 1, "upsertedCount": 0 })
        );

        let id: ToyId = "64b7f0c2a1e4b3d2c1f0e9a8".parse().unwrap();
        let upserted = serde_json::to_value(UpdateAck::upserted(id)).unwrap();
        assert_eq!(upserted["upsertedId"], "64b7f0c2a1e4b3d2c1f0e9a8");
        assert_eq!(upserted["matchedCount"], 0);

        assert!(UpdateAck::missed().is_miss());
        assert!(!UpdateAck::upserted(id).is_miss());
        assert!(!UpdateAck::matched(false).is_miss());
    }

    #[test]
    fn test_insert_and_delete_ack_shapes() {
        let id: ToyId = "64b7f0c2a1e4b3d2c1f0e9a8".parse().unwrap();
        assert_eq!(
            serde_json::to_value(InsertAck::new(id)).unwrap(),
            json!({ "acknowledged": true, "insertedId": "64b7f0c2a1e4b3d2c1f0e9a8" })
        );
        assert_eq!(
            serde_json::to_value(DeleteAck::new(0)).unwrap(),
            json!({ "acknowledged": true, "deletedCount": 0 })
        );
    }
}
