//! Response envelopes shared by several handlers.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::infra::QueryResult;

/// `{data, error: null}` envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct DataEnvelope {
    #[schema(value_type = Object)]
    pub data: Value,
    #[schema(value_type = Option<String>)]
    pub error: Option<String>,
}

impl DataEnvelope {
    pub fn ok(data: Value) -> Self {
        Self { data, error: None }
    }
}

/// `{success: true}`
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Page of pet owners with the per-owner pet counts
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PetOwnerPage {
    #[schema(value_type = Object)]
    pub data: Value,
    #[schema(value_type = Object)]
    pub pet_counts: Value,
    pub count: Option<u64>,
    pub status: u16,
}

impl PetOwnerPage {
    pub fn new(result: QueryResult, pet_counts: Value) -> Self {
        Self {
            data: result.data,
            pet_counts,
            count: result.count,
            status: result.status,
        }
    }
}

/// Distribution rows with the sum of their `num_vaccines`
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributedPage {
    #[schema(value_type = Object)]
    pub data: Value,
    pub count: Option<u64>,
    pub status: u16,
    pub total_vaccines: i64,
}

impl DistributedPage {
    pub fn new(result: QueryResult, total_vaccines: i64) -> Self {
        Self {
            data: result.data,
            count: result.count,
            status: result.status,
            total_vaccines,
        }
    }
}
