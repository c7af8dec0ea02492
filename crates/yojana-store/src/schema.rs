//! Collection schema: vector parameters and payload indexes.

use serde::Serialize;

use yojana_core::filter::{KEY_CASTE, KEY_HOUSING, KEY_LAND_MAX_ACRES, KEY_STATES};

/// Payload index type, lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSchema {
    Keyword,
    Float,
}

/// One payload index request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayloadIndex {
    pub field_name: &'static str,
    pub field_schema: FieldSchema,
}

/// Payload key listing assets that disqualify an applicant.
pub const KEY_ASSETS_EXCLUDED: &str = "eligibility_rules.assets_excluded";

/// Indexes created on a fresh scheme collection, in creation order.
pub const SCHEME_INDEXES: [PayloadIndex; 5] = [
    PayloadIndex {
        field_name: KEY_STATES,
        field_schema: FieldSchema::Keyword,
    },
    PayloadIndex {
        field_name: KEY_HOUSING,
        field_schema: FieldSchema::Keyword,
    },
    PayloadIndex {
        field_name: KEY_ASSETS_EXCLUDED,
        field_schema: FieldSchema::Keyword,
    },
    PayloadIndex {
        field_name: KEY_CASTE,
        field_schema: FieldSchema::Keyword,
    },
    PayloadIndex {
        field_name: KEY_LAND_MAX_ACRES,
        field_schema: FieldSchema::Float,
    },
];

/// Vector parameters for a new collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VectorParams {
    pub size: usize,
    pub distance: &'static str,
}

impl VectorParams {
    pub fn cosine(size: usize) -> Self {
        Self {
            size,
            distance: "Cosine",
        }
    }
}

/// Body of a create-collection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreateCollection {
    pub vectors: VectorParams,
}
