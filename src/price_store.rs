//! PriceStore - the asset-pair price ledger
//!
//! Keyed by the ORDERED pair `(base, quote)`. Storing `(A, B)` says nothing
//! about `(B, A)`; both directions may hold values that are not reciprocal of
//! each other, and lookups always prefer the forward entry.
//!
//! Only nonzero prices are kept. Setting a pair to zero clears it, so a zero
//! price is indistinguishable from "never set".

use rustc_hash::FxHashMap;

use crate::core_types::AssetId;
use crate::error::{OracleError, OracleResult};
use crate::money::{self, Price};

/// Which entry answered a direct lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Stored `(base, quote)`
    Forward,
    /// Reciprocal of stored `(quote, base)`
    Inverse,
}

#[derive(Debug, Clone, Default)]
pub struct PriceStore {
    prices: FxHashMap<(AssetId, AssetId), Price>,
}

impl PriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored entry for the exact ordered pair
    pub fn get(&self, base: AssetId, quote: AssetId) -> Option<Price> {
        self.prices.get(&(base, quote)).copied()
    }

    /// Forward entry if present, else the fixed-point reciprocal of the
    /// inverse entry, else `None`.
    pub fn lookup_direct_or_inverse(&self, base: AssetId, quote: AssetId) -> Option<Price> {
        self.lookup_with_direction(base, quote).map(|(p, _)| p)
    }

    pub fn lookup_with_direction(
        &self,
        base: AssetId,
        quote: AssetId,
    ) -> Option<(Price, Direction)> {
        if let Some(p) = self.get(base, quote) {
            return Some((p, Direction::Forward));
        }
        let inverse = self.get(quote, base)?;
        // Stored entries are nonzero, so the reciprocal is always defined
        money::reciprocal(inverse)
            .ok()
            .map(|p| (p, Direction::Inverse))
    }

    /// Unconditional overwrite. A zero price clears the entry.
    pub fn set(&mut self, base: AssetId, quote: AssetId, price: Price) {
        if price == 0 {
            self.prices.remove(&(base, quote));
        } else {
            self.prices.insert((base, quote), price);
        }
    }

    /// Clear the entry for the exact ordered pair.
    ///
    /// Fails with `PriceNotSet` if nothing is stored; the inverse entry is
    /// never touched.
    pub fn remove(&mut self, base: AssetId, quote: AssetId) -> OracleResult<Price> {
        self.prices
            .remove(&(base, quote))
            .ok_or(OracleError::PriceNotSet { base, quote })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
