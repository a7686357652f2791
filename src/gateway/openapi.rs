//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::PRINCIPAL_HEADER;
use crate::gateway::types::{
    AdapterData, AdapterRequest, EventsData, FeedPriceData, FeedPriceRequest, HealthResponse,
    MasterQuoteAssetRequest, MutationAck, OracleInfoData, PriceData, TransferGovernanceRequest,
};

/// Caller identity header checked against the governance principal
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "principal",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    PRINCIPAL_HEADER,
                    "Caller address (0x + 40 hex digits). Admin routes require the governance principal.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Price Oracle API",
        version = "1.0.0",
        description = "Tiered price resolution (direct, master-quote triangulation, adapters) over a governance-controlled price registry.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::get_price,
        crate::gateway::handlers::get_adapters,
        crate::gateway::handlers::get_oracle_info,
        crate::gateway::handlers::get_events,
        crate::gateway::handlers::feed_price,
        crate::gateway::handlers::remove_price,
        crate::gateway::handlers::add_adapter,
        crate::gateway::handlers::remove_adapter,
        crate::gateway::handlers::edit_master_quote_asset,
        crate::gateway::handlers::transfer_governance,
    ),
    components(
        schemas(
            HealthResponse,
            PriceData,
            AdapterData,
            OracleInfoData,
            EventsData,
            MutationAck,
            FeedPriceData,
            FeedPriceRequest,
            AdapterRequest,
            MasterQuoteAssetRequest,
            TransferGovernanceRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Price", description = "Price resolution and registry queries (no auth required)"),
        (name = "Governance", description = "Registry mutations (governance principal only)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "Price Oracle API");
        assert!(doc.to_json().is_ok());
    }

    #[test]
    fn test_endpoints_registered() {
        let paths = ApiDoc::openapi().paths.paths;
        assert!(paths.contains_key("/api/v1/health"));
        assert!(paths.contains_key("/api/v1/price/{base}/{quote}"));
        assert!(paths.contains_key("/api/v1/admin/price"));
        assert!(paths.contains_key("/api/v1/admin/adapter/{adapter}"));
    }

    #[test]
    fn test_security_scheme_registered() {
        let components = ApiDoc::openapi().components.expect("should have components");
        assert!(components.security_schemes.contains_key("principal"));
    }
}
