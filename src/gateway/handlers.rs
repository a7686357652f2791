use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use std::sync::{Arc, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core_types::{Address, Principal};
use crate::error::OracleError;
use crate::money;
use crate::oracle::PriceOracle;
use crate::resolver::PriceSource;

use super::state::AppState;
use super::types::{
    AdapterData, AdapterRequest, ApiResponse, EventsData, EventsQuery, FeedPriceData,
    FeedPriceRequest, HealthResponse, MasterQuoteAssetRequest, MutationAck, OracleInfoData,
    PriceData, TransferGovernanceRequest, error_codes,
};

/// Header carrying the caller identity for admin routes
pub const PRINCIPAL_HEADER: &str = "X-Principal";

pub type ApiError = (StatusCode, Json<ApiResponse<()>>);
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

fn api_error(status: StatusCode, code: i32, msg: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse::<()>::error(code, msg)))
}

/// Map a core failure to its HTTP status and stable error code
pub fn oracle_error(e: &OracleError) -> ApiError {
    let (status, code) = match e {
        OracleError::NotFound { .. } => (StatusCode::NOT_FOUND, error_codes::PRICE_NOT_FOUND),
        OracleError::Unauthorized { .. } => (StatusCode::FORBIDDEN, error_codes::UNAUTHORIZED),
        OracleError::DuplicateAdapter(_) => (StatusCode::CONFLICT, error_codes::DUPLICATE_ADAPTER),
        OracleError::AdapterNotFound(_) => (StatusCode::NOT_FOUND, error_codes::ADAPTER_NOT_FOUND),
        OracleError::PriceNotSet { .. } => (StatusCode::NOT_FOUND, error_codes::PRICE_NOT_SET),
        OracleError::ArithmeticOverflow | OracleError::DivisionByZero => {
            (StatusCode::BAD_REQUEST, error_codes::ARITHMETIC_OVERFLOW)
        }
        OracleError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER),
        OracleError::Adapter { .. } => (StatusCode::BAD_GATEWAY, error_codes::ADAPTER_FAILURE),
    };
    api_error(status, code, e.to_string())
}

fn lock(state: &AppState) -> Result<MutexGuard<'_, PriceOracle>, ApiError> {
    state.lock_oracle().ok_or_else(|| {
        tracing::error!("oracle mutex poisoned");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            "oracle unavailable",
        )
    })
}

fn parse_address(field: &str, value: &str) -> Result<Address, ApiError> {
    value.parse().map_err(|e| {
        api_error(
            StatusCode::BAD_REQUEST,
            error_codes::INVALID_PARAMETER,
            format!("invalid {}: {}", field, e),
        )
    })
}

fn extract_principal(headers: &HeaderMap) -> Result<Principal, ApiError> {
    let value = headers
        .get(PRINCIPAL_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            api_error(
                StatusCode::UNAUTHORIZED,
                error_codes::MISSING_PRINCIPAL,
                format!("Missing {} header", PRINCIPAL_HEADER),
            )
        })?;
    parse_address(PRINCIPAL_HEADER, value)
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn last_seq(oracle: &PriceOracle) -> u64 {
    oracle.events().last().map(|r| r.seq).unwrap_or(0)
}

// ============================================================================
// Public
// ============================================================================

/// Health check
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = ApiResponse<HealthResponse>),
        (status = 500, description = "Oracle state unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<HealthResponse> {
    let oracle = lock(&state)?;
    ok(HealthResponse {
        timestamp_ms: now_ms(),
        event_count: oracle.events().len() as u64,
    })
}

/// Resolve the price of `base` in units of `quote`
#[utoipa::path(
    get,
    path = "/api/v1/price/{base}/{quote}",
    params(
        ("base" = String, Path, description = "Base asset address"),
        ("quote" = String, Path, description = "Quote asset address")
    ),
    responses(
        (status = 200, description = "Resolved price", body = ApiResponse<PriceData>),
        (status = 404, description = "No tier produced a price"),
        (status = 502, description = "An adapter failed during resolution")
    ),
    tag = "Price"
)]
pub async fn get_price(
    State(state): State<Arc<AppState>>,
    Path((base, quote)): Path<(String, String)>,
) -> ApiResult<PriceData> {
    let base = parse_address("base", &base)?;
    let quote = parse_address("quote", &quote)?;

    let resolved = lock(&state)?.get_price_with_source(base, quote);
    let (price, source) = resolved.map_err(|e| oracle_error(&e))?;

    let (source, adapter) = match source {
        PriceSource::Direct => ("direct", None),
        PriceSource::Inverse => ("inverse", None),
        PriceSource::Derived => ("derived", None),
        PriceSource::Adapter(id) => ("adapter", Some(id.to_hex())),
    };
    ok(PriceData {
        base: base.to_hex(),
        quote: quote.to_hex(),
        price: price.to_string(),
        price_display: money::format_price(price),
        source: source.to_string(),
        adapter,
    })
}

/// Registered adapters in resolution order
#[utoipa::path(
    get,
    path = "/api/v1/adapters",
    responses((status = 200, description = "Adapters in resolution order", body = ApiResponse<Vec<AdapterData>>)),
    tag = "Price"
)]
pub async fn get_adapters(State(state): State<Arc<AppState>>) -> ApiResult<Vec<AdapterData>> {
    let oracle = lock(&state)?;
    let data = oracle
        .adapter_registry()
        .iter()
        .map(|a| AdapterData {
            adapter: a.id.to_hex(),
            name: a.name().to_string(),
        })
        .collect();
    ok(data)
}

/// Current master quote asset and governance principal
#[utoipa::path(
    get,
    path = "/api/v1/oracle",
    responses((status = 200, description = "Oracle parameters", body = ApiResponse<OracleInfoData>)),
    tag = "Price"
)]
pub async fn get_oracle_info(State(state): State<Arc<AppState>>) -> ApiResult<OracleInfoData> {
    let oracle = lock(&state)?;
    ok(OracleInfoData {
        master_quote_asset: oracle.master_quote_asset().to_hex(),
        governance: oracle.governance().to_hex(),
    })
}

/// Notifications in call order
#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(EventsQuery),
    responses((status = 200, description = "Notification log", body = ApiResponse<EventsData>)),
    tag = "Price"
)]
pub async fn get_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<EventsData> {
    let oracle = lock(&state)?;
    let events = oracle.events().since(query.since.unwrap_or(0)).to_vec();
    ok(EventsData { events })
}

// ============================================================================
// Governance
// ============================================================================

/// Store a price for the ordered pair
#[utoipa::path(
    post,
    path = "/api/v1/admin/price",
    request_body = FeedPriceRequest,
    responses(
        (status = 200, description = "Price stored", body = ApiResponse<FeedPriceData>),
        (status = 400, description = "Invalid input or arithmetic overflow"),
        (status = 403, description = "Caller is not governance")
    ),
    security(("principal" = [])),
    tag = "Governance"
)]
pub async fn feed_price(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<FeedPriceRequest>,
) -> ApiResult<FeedPriceData> {
    let caller = extract_principal(&headers)?;
    let base = parse_address("base", &req.base)?;
    let quote = parse_address("quote", &req.quote)?;
    let raw_price = money::parse_raw(&req.raw_price).map_err(|e| {
        api_error(
            StatusCode::BAD_REQUEST,
            error_codes::INVALID_PARAMETER,
            format!("invalid raw_price: {}", e),
        )
    })?;

    let mut oracle = lock(&state)?;
    let price = oracle
        .feed_price(caller, base, quote, raw_price, req.decimals)
        .map_err(|e| oracle_error(&e))?;
    ok(FeedPriceData {
        seq: last_seq(&oracle),
        price: price.to_string(),
        price_display: money::format_price(price),
    })
}

/// Clear the stored price for the exact ordered pair
#[utoipa::path(
    delete,
    path = "/api/v1/admin/price/{base}/{quote}",
    params(
        ("base" = String, Path, description = "Base asset address"),
        ("quote" = String, Path, description = "Quote asset address")
    ),
    responses(
        (status = 200, description = "Price removed", body = ApiResponse<MutationAck>),
        (status = 403, description = "Caller is not governance"),
        (status = 404, description = "No price set for the pair")
    ),
    security(("principal" = [])),
    tag = "Governance"
)]
pub async fn remove_price(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((base, quote)): Path<(String, String)>,
) -> ApiResult<MutationAck> {
    let caller = extract_principal(&headers)?;
    let base = parse_address("base", &base)?;
    let quote = parse_address("quote", &quote)?;

    let mut oracle = lock(&state)?;
    oracle
        .remove_price(caller, base, quote)
        .map_err(|e| oracle_error(&e))?;
    ok(MutationAck {
        seq: last_seq(&oracle),
    })
}

/// Register a catalog adapter at the end of the resolution order
#[utoipa::path(
    post,
    path = "/api/v1/admin/adapter",
    request_body = AdapterRequest,
    responses(
        (status = 200, description = "Adapter registered", body = ApiResponse<MutationAck>),
        (status = 403, description = "Caller is not governance"),
        (status = 404, description = "Adapter not in catalog"),
        (status = 409, description = "Adapter already registered")
    ),
    security(("principal" = [])),
    tag = "Governance"
)]
pub async fn add_adapter(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AdapterRequest>,
) -> ApiResult<MutationAck> {
    let caller = extract_principal(&headers)?;
    let id = parse_address("adapter", &req.adapter)?;

    let mut oracle = lock(&state)?;
    // outsiders learn nothing about the catalog
    oracle.authorize(caller).map_err(|e| oracle_error(&e))?;
    let adapter = state.catalog.get(id).cloned().ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            error_codes::UNKNOWN_ADAPTER,
            format!("Adapter {} is not in the catalog", id),
        )
    })?;
    oracle
        .add_adapter(caller, adapter)
        .map_err(|e| oracle_error(&e))?;
    ok(MutationAck {
        seq: last_seq(&oracle),
    })
}

/// Deregister an adapter
#[utoipa::path(
    delete,
    path = "/api/v1/admin/adapter/{adapter}",
    params(("adapter" = String, Path, description = "Adapter address")),
    responses(
        (status = 200, description = "Adapter removed", body = ApiResponse<MutationAck>),
        (status = 403, description = "Caller is not governance"),
        (status = 404, description = "Adapter not registered")
    ),
    security(("principal" = [])),
    tag = "Governance"
)]
pub async fn remove_adapter(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(adapter): Path<String>,
) -> ApiResult<MutationAck> {
    let caller = extract_principal(&headers)?;
    let id = parse_address("adapter", &adapter)?;

    let mut oracle = lock(&state)?;
    oracle
        .remove_adapter(caller, id)
        .map_err(|e| oracle_error(&e))?;
    ok(MutationAck {
        seq: last_seq(&oracle),
    })
}

/// Replace the master quote asset used for triangulation
#[utoipa::path(
    put,
    path = "/api/v1/admin/master_quote_asset",
    request_body = MasterQuoteAssetRequest,
    responses(
        (status = 200, description = "Master quote asset replaced", body = ApiResponse<MutationAck>),
        (status = 403, description = "Caller is not governance")
    ),
    security(("principal" = [])),
    tag = "Governance"
)]
pub async fn edit_master_quote_asset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<MasterQuoteAssetRequest>,
) -> ApiResult<MutationAck> {
    let caller = extract_principal(&headers)?;
    let asset = parse_address("asset", &req.asset)?;

    let mut oracle = lock(&state)?;
    oracle
        .edit_master_quote_asset(caller, asset)
        .map_err(|e| oracle_error(&e))?;
    ok(MutationAck {
        seq: last_seq(&oracle),
    })
}

/// Hand governance to another principal
#[utoipa::path(
    put,
    path = "/api/v1/admin/governance",
    request_body = TransferGovernanceRequest,
    responses(
        (status = 200, description = "Governance transferred", body = ApiResponse<MutationAck>),
        (status = 403, description = "Caller is not governance")
    ),
    security(("principal" = [])),
    tag = "Governance"
)]
pub async fn transfer_governance(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<TransferGovernanceRequest>,
) -> ApiResult<MutationAck> {
    let caller = extract_principal(&headers)?;
    let principal = parse_address("principal", &req.principal)?;

    let mut oracle = lock(&state)?;
    oracle
        .transfer_governance(caller, principal)
        .map_err(|e| oracle_error(&e))?;
    ok(MutationAck {
        seq: last_seq(&oracle),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{
        AdapterCatalog, AdapterError, AdapterRef, PriceAdapter, StaticAdapter,
    };
    use crate::core_types::{AdapterId, AssetId};
    use crate::money::{Price, UNIT};
    use axum::http::HeaderValue;

    const GOV: Principal = Principal::from_low_u8(0xa0);
    const MALLORY: Principal = Principal::from_low_u8(0xee);
    const M: AssetId = AssetId::from_low_u8(100);
    const A: AssetId = AssetId::from_low_u8(1);
    const B: AssetId = AssetId::from_low_u8(2);
    const STATIC_ID: AdapterId = AdapterId::from_low_u8(0xc1);
    const BROKEN_ID: AdapterId = AdapterId::from_low_u8(0xc2);

    struct BrokenAdapter;

    impl PriceAdapter for BrokenAdapter {
        fn name(&self) -> &str {
            "broken"
        }

        fn get_price(&self, _: AssetId, _: AssetId) -> Result<Option<Price>, AdapterError> {
            Err(AdapterError::Unavailable("timeout".into()))
        }
    }

    fn state() -> Arc<AppState> {
        let mut catalog = AdapterCatalog::new();
        catalog.insert(AdapterRef::new(
            STATIC_ID,
            Arc::new(StaticAdapter::new("fixed").with_price(A, B, 3 * UNIT)),
        ));
        catalog.insert(AdapterRef::new(BROKEN_ID, Arc::new(BrokenAdapter)));
        let oracle = PriceOracle::new(GOV, M, Vec::new()).unwrap();
        Arc::new(AppState::new(oracle, catalog))
    }

    fn headers(caller: Principal) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(
            PRINCIPAL_HEADER,
            HeaderValue::from_str(&caller.to_hex()).unwrap(),
        );
        h
    }

    fn feed(base: AssetId, quote: AssetId, raw: &str, decimals: u8) -> Json<FeedPriceRequest> {
        Json(FeedPriceRequest {
            base: base.to_hex(),
            quote: quote.to_hex(),
            raw_price: raw.to_string(),
            decimals,
        })
    }

    fn pair(base: AssetId, quote: AssetId) -> Path<(String, String)> {
        Path((base.to_hex(), quote.to_hex()))
    }

    #[tokio::test]
    async fn test_feed_then_get_derived_price() {
        let st = state();
        feed_price(State(st.clone()), headers(GOV), feed(A, M, "2", 0))
            .await
            .unwrap();
        let (_, Json(resp)) = feed_price(State(st.clone()), headers(GOV), feed(B, M, "4", 0))
            .await
            .unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data.seq, 2);
        assert_eq!(data.price, "4000000000000000000");

        let (status, Json(resp)) = get_price(State(st), pair(A, B)).await.unwrap();
        assert_eq!(status, StatusCode::OK);
        let data = resp.data.unwrap();
        assert_eq!(data.price, "500000000000000000");
        assert_eq!(data.price_display, "0.500000000000000000");
        assert_eq!(data.source, "derived");
        assert!(data.adapter.is_none());
    }

    #[tokio::test]
    async fn test_get_price_not_found() {
        let (status, Json(resp)) = get_price(State(state()), pair(A, B)).await.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(resp.code, error_codes::PRICE_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_price_bad_address() {
        let (status, Json(resp)) = get_price(
            State(state()),
            Path(("0x12".to_string(), B.to_hex())),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.code, error_codes::INVALID_PARAMETER);
    }

    #[tokio::test]
    async fn test_feed_requires_principal_header() {
        let (status, Json(resp)) = feed_price(State(state()), HeaderMap::new(), feed(A, B, "1", 0))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(resp.code, error_codes::MISSING_PRINCIPAL);
    }

    #[tokio::test]
    async fn test_feed_rejects_non_governance() {
        let st = state();
        let (status, Json(resp)) = feed_price(State(st.clone()), headers(MALLORY), feed(A, B, "1", 0))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(resp.code, error_codes::UNAUTHORIZED);
        assert!(st.lock_oracle().unwrap().events().is_empty());
    }

    #[tokio::test]
    async fn test_feed_rejects_bad_raw_price() {
        let (status, _) = feed_price(State(state()), headers(GOV), feed(A, B, "1.5", 0))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_feed_overflow() {
        let (status, Json(resp)) = feed_price(
            State(state()),
            headers(GOV),
            feed(A, B, &Price::MAX.to_string(), 0),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.code, error_codes::ARITHMETIC_OVERFLOW);
    }

    #[tokio::test]
    async fn test_remove_price_not_set() {
        let (status, Json(resp)) = remove_price(State(state()), headers(GOV), pair(A, B))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(resp.code, error_codes::PRICE_NOT_SET);
    }

    #[tokio::test]
    async fn test_adapter_routes() {
        let st = state();
        let add = || {
            Json(AdapterRequest {
                adapter: STATIC_ID.to_hex(),
            })
        };
        add_adapter(State(st.clone()), headers(GOV), add())
            .await
            .unwrap();
        let (status, Json(resp)) = add_adapter(State(st.clone()), headers(GOV), add())
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(resp.code, error_codes::DUPLICATE_ADAPTER);

        let (_, Json(resp)) = get_adapters(State(st.clone())).await.unwrap();
        let list = resp.data.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "fixed");

        let (_, Json(resp)) = get_price(State(st.clone()), pair(A, B)).await.unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data.source, "adapter");
        assert_eq!(data.adapter, Some(STATIC_ID.to_hex()));

        remove_adapter(State(st.clone()), headers(GOV), Path(STATIC_ID.to_hex()))
            .await
            .unwrap();
        let (status, _) = remove_adapter(State(st), headers(GOV), Path(STATIC_ID.to_hex()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_add_unknown_adapter() {
        let (status, Json(resp)) = add_adapter(
            State(state()),
            headers(GOV),
            Json(AdapterRequest {
                adapter: AdapterId::from_low_u8(0x99).to_hex(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(resp.code, error_codes::UNKNOWN_ADAPTER);
    }

    #[tokio::test]
    async fn test_add_adapter_outsider_rejected_before_catalog_lookup() {
        let st = state();
        for id in [AdapterId::from_low_u8(0x99), STATIC_ID] {
            let (status, Json(resp)) = add_adapter(
                State(st.clone()),
                headers(MALLORY),
                Json(AdapterRequest { adapter: id.to_hex() }),
            )
            .await
            .unwrap_err();
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(resp.code, error_codes::UNAUTHORIZED);
        }
        let oracle = st.lock_oracle().unwrap();
        assert!(oracle.get_adapters().is_empty());
        assert!(oracle.events().is_empty());
    }

    #[test]
    fn test_invalid_amount_maps_to_bad_request() {
        let (status, Json(resp)) = oracle_error(&OracleError::InvalidAmount("1.5".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.code, error_codes::INVALID_PARAMETER);
    }

    #[tokio::test]
    async fn test_failing_adapter_is_bad_gateway() {
        let st = state();
        add_adapter(
            State(st.clone()),
            headers(GOV),
            Json(AdapterRequest {
                adapter: BROKEN_ID.to_hex(),
            }),
        )
        .await
        .unwrap();
        let (status, Json(resp)) = get_price(State(st), pair(A, B)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(resp.code, error_codes::ADAPTER_FAILURE);
    }

    #[tokio::test]
    async fn test_master_and_governance_routes() {
        let st = state();
        let n = AssetId::from_low_u8(200);
        edit_master_quote_asset(
            State(st.clone()),
            headers(GOV),
            Json(MasterQuoteAssetRequest { asset: n.to_hex() }),
        )
        .await
        .unwrap();
        transfer_governance(
            State(st.clone()),
            headers(GOV),
            Json(TransferGovernanceRequest {
                principal: MALLORY.to_hex(),
            }),
        )
        .await
        .unwrap();

        let (_, Json(resp)) = get_oracle_info(State(st.clone())).await.unwrap();
        let info = resp.data.unwrap();
        assert_eq!(info.master_quote_asset, n.to_hex());
        assert_eq!(info.governance, MALLORY.to_hex());

        let (_, Json(resp)) = get_events(State(st.clone()), Query(EventsQuery { since: Some(1) }))
            .await
            .unwrap();
        let events = resp.data.unwrap().events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].seq, 2);

        let (_, Json(resp)) = health_check(State(st)).await.unwrap();
        assert_eq!(resp.data.unwrap().event_count, 2);
    }
}
