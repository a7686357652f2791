//! API request/response types and error codes
//!
//! - `ApiResponse<T>`: unified response wrapper
//! - `error_codes`: stable error code constants
//! - Request and response DTOs
//!
//! Addresses and prices travel as strings: addresses as `0x` hex, prices as
//! decimal integers scaled by 10^18 (plus a human-readable `*_display`).

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::events::EventRecord;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or absent (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    #[schema(example = 0)]
    pub code: i32,
    #[schema(example = "ok")]
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Standard API error codes
pub mod error_codes {
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const ARITHMETIC_OVERFLOW: i32 = 1004;

    // Auth errors (2xxx)
    pub const MISSING_PRINCIPAL: i32 = 2001;
    pub const UNAUTHORIZED: i32 = 2002;

    // Resource errors (4xxx)
    pub const PRICE_NOT_FOUND: i32 = 4001;
    pub const ADAPTER_NOT_FOUND: i32 = 4002;
    pub const PRICE_NOT_SET: i32 = 4003;
    pub const UNKNOWN_ADAPTER: i32 = 4004;
    pub const DUPLICATE_ADAPTER: i32 = 4091;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const ADAPTER_FAILURE: i32 = 5002;
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = 1703494800000_u64)]
    pub timestamp_ms: u64,
    /// Number of notifications recorded so far
    pub event_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PriceData {
    pub base: String,
    pub quote: String,
    /// Quote units per base unit, scaled by 10^18
    #[schema(example = "500000000000000000")]
    pub price: String,
    #[schema(example = "0.500000000000000000")]
    pub price_display: String,
    /// direct | inverse | derived | adapter
    #[schema(example = "derived")]
    pub source: String,
    /// Set when `source` is `adapter`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdapterData {
    pub adapter: String,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OracleInfoData {
    pub master_quote_asset: String,
    pub governance: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventsData {
    #[schema(value_type = Vec<Object>)]
    pub events: Vec<EventRecord>,
}

/// Acknowledgement of a successful mutation
#[derive(Debug, Serialize, ToSchema)]
pub struct MutationAck {
    /// Sequence number of the notification it produced
    pub seq: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedPriceData {
    pub seq: u64,
    /// Stored value after normalization to 18 decimals
    pub price: String,
    pub price_display: String,
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedPriceRequest {
    pub base: String,
    pub quote: String,
    /// Non-negative integer carrying `decimals` fractional digits
    #[schema(example = "2")]
    pub raw_price: String,
    #[schema(example = 0)]
    pub decimals: u8,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdapterRequest {
    pub adapter: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MasterQuoteAssetRequest {
    pub asset: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferGovernanceRequest {
    pub principal: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQuery {
    /// Only events with a sequence number greater than this
    pub since: Option<u64>,
}
