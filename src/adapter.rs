//! External price adapters
//!
//! An adapter answers price queries for pairs the ledger does not track.
//! The registry keeps adapter references in insertion order with no
//! duplicates; resolution scans them in that order and takes the first hit.

use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::core_types::{AdapterId, AssetId};
use crate::error::{OracleError, OracleResult};
use crate::money::Price;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Adapter unavailable: {0}")]
    Unavailable(String),
}

/// Capability implemented by every external price source.
///
/// Calls are synchronous. `Ok(None)` means "no quote for this pair" and lets
/// resolution move on; `Ok(Some(_))` ends the scan with that price, zero
/// included; `Err` aborts the whole lookup.
pub trait PriceAdapter: Send + Sync {
    fn name(&self) -> &str;

    fn get_price(&self, base: AssetId, quote: AssetId) -> Result<Option<Price>, AdapterError>;
}

/// Handle to a registered adapter. Identity is the `id` alone.
#[derive(Clone)]
pub struct AdapterRef {
    pub id: AdapterId,
    pub adapter: Arc<dyn PriceAdapter>,
}

impl AdapterRef {
    pub fn new(id: AdapterId, adapter: Arc<dyn PriceAdapter>) -> Self {
        Self { id, adapter }
    }

    pub fn name(&self) -> &str {
        self.adapter.name()
    }
}

impl PartialEq for AdapterRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AdapterRef {}

impl fmt::Debug for AdapterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRef")
            .field("id", &self.id)
            .field("name", &self.adapter.name())
            .finish()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Ordered, duplicate-free adapter list.
///
/// Removal shifts the tail down, so the remaining adapters keep their
/// relative insertion order.
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    entries: Vec<AdapterRef>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: AdapterId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn add(&mut self, adapter: AdapterRef) -> OracleResult<()> {
        if self.contains(adapter.id) {
            return Err(OracleError::DuplicateAdapter(adapter.id));
        }
        self.entries.push(adapter);
        Ok(())
    }

    pub fn remove(&mut self, id: AdapterId) -> OracleResult<AdapterRef> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(OracleError::AdapterNotFound(id))?;
        Ok(self.entries.remove(pos))
    }

    /// Snapshot of registered adapter ids in iteration order
    pub fn list(&self) -> Vec<AdapterId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AdapterRef> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Static Adapter
// ============================================================================

/// Fixed quote table. Answers only the exact ordered pairs it was given.
#[derive(Debug, Clone)]
pub struct StaticAdapter {
    name: String,
    prices: FxHashMap<(AssetId, AssetId), Price>,
}

impl StaticAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prices: FxHashMap::default(),
        }
    }

    pub fn with_price(mut self, base: AssetId, quote: AssetId, price: Price) -> Self {
        self.prices.insert((base, quote), price);
        self
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PriceAdapter for StaticAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_price(&self, base: AssetId, quote: AssetId) -> Result<Option<Price>, AdapterError> {
        Ok(self.prices.get(&(base, quote)).copied())
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Every adapter the process knows how to reach, keyed by id.
///
/// The registry holds the active subset; the catalog lets outer surfaces
/// refer to an adapter by id before it is registered.
#[derive(Debug, Clone, Default)]
pub struct AdapterCatalog {
    adapters: Vec<AdapterRef>,
}

impl AdapterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later inserts with an existing id replace the earlier one.
    pub fn insert(&mut self, adapter: AdapterRef) {
        match self.adapters.iter_mut().find(|a| a.id == adapter.id) {
            Some(slot) => *slot = adapter,
            None => self.adapters.push(adapter),
        }
    }

    pub fn get(&self, id: AdapterId) -> Option<&AdapterRef> {
        self.adapters.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::UNIT;

    fn adapter(n: u8) -> AdapterRef {
        AdapterRef::new(
            AdapterId::from_low_u8(n),
            Arc::new(StaticAdapter::new(format!("static-{}", n))),
        )
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut reg = AdapterRegistry::new();
        for n in [3, 1, 2] {
            reg.add(adapter(n)).unwrap();
        }
        assert_eq!(
            reg.list(),
            vec![
                AdapterId::from_low_u8(3),
                AdapterId::from_low_u8(1),
                AdapterId::from_low_u8(2)
            ]
        );
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let mut reg = AdapterRegistry::new();
        reg.add(adapter(1)).unwrap();
        let err = reg.add(adapter(1)).unwrap_err();
        assert!(matches!(err, OracleError::DuplicateAdapter(id) if id == AdapterId::from_low_u8(1)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_remove_absent_rejected() {
        let mut reg = AdapterRegistry::new();
        reg.add(adapter(1)).unwrap();
        assert!(matches!(
            reg.remove(AdapterId::from_low_u8(9)),
            Err(OracleError::AdapterNotFound(_))
        ));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_remove_keeps_relative_order() {
        let mut reg = AdapterRegistry::new();
        for n in 1..=4 {
            reg.add(adapter(n)).unwrap();
        }
        let removed = reg.remove(AdapterId::from_low_u8(2)).unwrap();
        assert_eq!(removed.id, AdapterId::from_low_u8(2));
        assert_eq!(
            reg.list(),
            vec![
                AdapterId::from_low_u8(1),
                AdapterId::from_low_u8(3),
                AdapterId::from_low_u8(4)
            ]
        );
    }

    #[test]
    fn test_readd_after_remove_goes_to_back() {
        let mut reg = AdapterRegistry::new();
        for n in 1..=3 {
            reg.add(adapter(n)).unwrap();
        }
        reg.remove(AdapterId::from_low_u8(1)).unwrap();
        reg.add(adapter(1)).unwrap();
        assert_eq!(
            reg.list(),
            vec![
                AdapterId::from_low_u8(2),
                AdapterId::from_low_u8(3),
                AdapterId::from_low_u8(1)
            ]
        );
    }

    #[test]
    fn test_static_adapter_exact_pair_only() {
        let a = AssetId::from_low_u8(10);
        let b = AssetId::from_low_u8(11);
        let adapter = StaticAdapter::new("fixed").with_price(a, b, 2 * UNIT);
        assert_eq!(adapter.get_price(a, b).unwrap(), Some(2 * UNIT));
        assert_eq!(adapter.get_price(b, a).unwrap(), None);
        assert_eq!(adapter.name(), "fixed");
    }

    #[test]
    fn test_catalog_insert_replaces_same_id() {
        let mut catalog = AdapterCatalog::new();
        catalog.insert(adapter(1));
        catalog.insert(AdapterRef::new(
            AdapterId::from_low_u8(1),
            Arc::new(StaticAdapter::new("replacement")),
        ));
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get(AdapterId::from_low_u8(1)).unwrap().name(),
            "replacement"
        );
        assert!(catalog.get(AdapterId::from_low_u8(2)).is_none());
    }
}
