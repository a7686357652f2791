//! Price resolution
//!
//! Tiers, tried strictly in order, first success wins:
//!
//! ```text
//! ┌────────────────┐    ┌──────────────────┐    ┌──────────────────┐
//! │ direct/inverse │───▶│ master-quote     │───▶│ adapters, in     │───▶ NotFound
//! │ ledger lookup  │    │ triangulation    │    │ registry order   │
//! └────────────────┘    └──────────────────┘    └──────────────────┘
//! ```
//!
//! Resolution never mutates anything. An adapter that fails (rather than
//! reporting "no quote") aborts the whole lookup; later adapters are not
//! consulted.

use tracing::{debug, warn};

use crate::adapter::AdapterRegistry;
use crate::core_types::{AdapterId, AssetId};
use crate::derivation;
use crate::error::{OracleError, OracleResult};
use crate::money::Price;
use crate::price_store::{Direction, PriceStore};

/// Tier that produced a resolved price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Direct,
    Inverse,
    Derived,
    Adapter(AdapterId),
}

/// Borrowed view over the state resolution reads
pub struct PriceResolver<'a> {
    store: &'a PriceStore,
    master: AssetId,
    adapters: &'a AdapterRegistry,
}

impl<'a> PriceResolver<'a> {
    pub fn new(store: &'a PriceStore, master: AssetId, adapters: &'a AdapterRegistry) -> Self {
        Self {
            store,
            master,
            adapters,
        }
    }

    pub fn resolve(&self, base: AssetId, quote: AssetId) -> OracleResult<Price> {
        self.resolve_with_source(base, quote).map(|(p, _)| p)
    }

    pub fn resolve_with_source(
        &self,
        base: AssetId,
        quote: AssetId,
    ) -> OracleResult<(Price, PriceSource)> {
        if let Some((price, direction)) = self.store.lookup_with_direction(base, quote) {
            let source = match direction {
                Direction::Forward => PriceSource::Direct,
                Direction::Inverse => PriceSource::Inverse,
            };
            debug!(%base, %quote, price, ?source, "price resolved from ledger");
            return Ok((price, source));
        }

        if let Some(price) = derivation::derive_via_master(self.store, self.master, base, quote)? {
            debug!(%base, %quote, master = %self.master, price, "price derived via master quote");
            return Ok((price, PriceSource::Derived));
        }

        for entry in self.adapters.iter() {
            match entry.adapter.get_price(base, quote) {
                // A found answer is returned as is, zero included; only the
                // ledger treats zero as absent.
                Ok(Some(price)) => {
                    debug!(%base, %quote, adapter = %entry.id, price, "price resolved by adapter");
                    return Ok((price, PriceSource::Adapter(entry.id)));
                }
                Ok(None) => continue,
                Err(source) => {
                    warn!(%base, %quote, adapter = %entry.id, error = %source, "adapter failed, aborting lookup");
                    return Err(OracleError::Adapter {
                        adapter: entry.id,
                        source,
                    });
                }
            }
        }

        Err(OracleError::NotFound { base, quote })
    }
}
