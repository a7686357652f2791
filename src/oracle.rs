//! PriceOracle - the public facade
//!
//! Owns the ledger, the adapter registry, the master quote asset, the
//! governance gate and the notification log.
//!
//! # Atomicity
//! Every mutating call authorizes, then validates, then mutates, then appends
//! exactly one notification. Any failure returns before the first write, so
//! a failed call leaves no trace. Callers sharing an instance must serialize
//! access (the gateway wraps it in a mutex); the oracle itself does no locking.

use tracing::{debug, info};

use crate::adapter::{AdapterRef, AdapterRegistry};
use crate::core_types::{AdapterId, AssetId, Principal};
use crate::error::OracleResult;
use crate::events::{EventLog, Notification};
use crate::governance::GovernanceGate;
use crate::money::{self, Price};
use crate::price_store::PriceStore;
use crate::resolver::{PriceResolver, PriceSource};

#[derive(Debug, Clone)]
pub struct PriceOracle {
    store: PriceStore,
    adapters: AdapterRegistry,
    master_quote_asset: AssetId,
    gate: GovernanceGate,
    events: EventLog,
}

impl PriceOracle {
    /// Fails with `DuplicateAdapter` if `initial_adapters` repeats an id.
    pub fn new(
        governance: Principal,
        master_quote_asset: AssetId,
        initial_adapters: impl IntoIterator<Item = AdapterRef>,
    ) -> OracleResult<Self> {
        let mut adapters = AdapterRegistry::new();
        for adapter in initial_adapters {
            adapters.add(adapter)?;
        }
        info!(
            %governance,
            master = %master_quote_asset,
            adapters = adapters.len(),
            "price oracle initialized"
        );
        Ok(Self {
            store: PriceStore::new(),
            adapters,
            master_quote_asset,
            gate: GovernanceGate::new(governance),
            events: EventLog::new(),
        })
    }

    // ========================================================================
    // Reads (any caller)
    // ========================================================================

    pub fn get_price(&self, base: AssetId, quote: AssetId) -> OracleResult<Price> {
        self.resolver().resolve(base, quote)
    }

    pub fn get_price_with_source(
        &self,
        base: AssetId,
        quote: AssetId,
    ) -> OracleResult<(Price, PriceSource)> {
        self.resolver().resolve_with_source(base, quote)
    }

    pub fn get_adapters(&self) -> Vec<AdapterId> {
        self.adapters.list()
    }

    pub fn adapter_registry(&self) -> &AdapterRegistry {
        &self.adapters
    }

    pub fn master_quote_asset(&self) -> AssetId {
        self.master_quote_asset
    }

    pub fn governance(&self) -> Principal {
        self.gate.principal()
    }

    /// Ledger entry for the exact ordered pair, no fallback
    pub fn stored_price(&self, base: AssetId, quote: AssetId) -> Option<Price> {
        self.store.get(base, quote)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Check `caller` against the governance principal without mutating.
    /// Front ends use it to reject outsiders before any other lookup.
    pub fn authorize(&self, caller: Principal) -> OracleResult<()> {
        self.gate.authorize(caller)
    }

    fn resolver(&self) -> PriceResolver<'_> {
        PriceResolver::new(&self.store, self.master_quote_asset, &self.adapters)
    }

    // ========================================================================
    // Mutations (governance only)
    // ========================================================================

    /// Store `raw_price` (carrying `decimals` fractional digits) as an
    /// 18-decimal price. Returns the normalized value.
    ///
    /// A normalized value of zero is stored as absent.
    pub fn feed_price(
        &mut self,
        caller: Principal,
        base: AssetId,
        quote: AssetId,
        raw_price: Price,
        decimals: u8,
    ) -> OracleResult<Price> {
        self.gate.authorize(caller)?;
        let normalized = money::normalize(raw_price, decimals)?;
        self.store.set(base, quote, normalized);
        self.emit(Notification::PriceAdded {
            base,
            quote,
            raw_price,
        });
        info!(%base, %quote, raw_price, decimals, normalized, "price fed");
        Ok(normalized)
    }

    pub fn remove_price(
        &mut self,
        caller: Principal,
        base: AssetId,
        quote: AssetId,
    ) -> OracleResult<()> {
        self.gate.authorize(caller)?;
        self.store.remove(base, quote)?;
        self.emit(Notification::PriceRemoved { base, quote });
        info!(%base, %quote, "price removed");
        Ok(())
    }

    pub fn add_adapter(&mut self, caller: Principal, adapter: AdapterRef) -> OracleResult<()> {
        self.gate.authorize(caller)?;
        let id = adapter.id;
        self.adapters.add(adapter)?;
        self.emit(Notification::AdapterAdded { adapter: id });
        info!(adapter = %id, total = self.adapters.len(), "adapter added");
        Ok(())
    }

    pub fn remove_adapter(&mut self, caller: Principal, id: AdapterId) -> OracleResult<()> {
        self.gate.authorize(caller)?;
        self.adapters.remove(id)?;
        self.emit(Notification::AdapterRemoved { adapter: id });
        info!(adapter = %id, total = self.adapters.len(), "adapter removed");
        Ok(())
    }

    /// Unconditional; the new asset need not have any price data.
    pub fn edit_master_quote_asset(
        &mut self,
        caller: Principal,
        asset: AssetId,
    ) -> OracleResult<()> {
        self.gate.authorize(caller)?;
        let previous = std::mem::replace(&mut self.master_quote_asset, asset);
        self.emit(Notification::MasterQuoteAssetEdited { asset });
        info!(%previous, current = %asset, "master quote asset edited");
        Ok(())
    }

    pub fn transfer_governance(
        &mut self,
        caller: Principal,
        new_principal: Principal,
    ) -> OracleResult<()> {
        let previous = self.gate.transfer(caller, new_principal)?;
        self.emit(Notification::GovernanceTransferred {
            previous,
            current: new_principal,
        });
        info!(%previous, current = %new_principal, "governance transferred");
        Ok(())
    }

    fn emit(&mut self, notification: Notification) {
        let seq = self.events.push(notification);
        debug!(seq, "notification recorded");
    }
}
