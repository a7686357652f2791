//! Master-quote triangulation
//!
//! `price(A, B) = price(A, M) / price(B, M)`, where `M` is the master quote
//! asset and each leg may come from a forward or inverse ledger entry.

use crate::core_types::AssetId;
use crate::error::OracleResult;
use crate::money::{self, Price};
use crate::price_store::PriceStore;

/// Derive `price(base, quote)` through `master`.
///
/// Returns `Ok(None)` unless BOTH legs resolve; no partial result is ever
/// produced. Fails only on fixed-point overflow.
pub fn derive_via_master(
    store: &PriceStore,
    master: AssetId,
    base: AssetId,
    quote: AssetId,
) -> OracleResult<Option<Price>> {
    let Some(base_in_master) = store.lookup_direct_or_inverse(base, master) else {
        return Ok(None);
    };
    let Some(quote_in_master) = store.lookup_direct_or_inverse(quote, master) else {
        return Ok(None);
    };
    Ok(Some(money::precise_div(base_in_master, quote_in_master)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::UNIT;

    const M: AssetId = AssetId::from_low_u8(100);
    const A: AssetId = AssetId::from_low_u8(1);
    const B: AssetId = AssetId::from_low_u8(2);

    #[test]
    fn test_both_legs_forward() {
        let mut store = PriceStore::new();
        store.set(A, M, 2 * UNIT);
        store.set(B, M, 4 * UNIT);
        assert_eq!(
            derive_via_master(&store, M, A, B).unwrap(),
            Some(500_000_000_000_000_000)
        );
        assert_eq!(derive_via_master(&store, M, B, A).unwrap(), Some(2 * UNIT));
    }

    #[test]
    fn test_leg_via_inverse_entry() {
        let mut store = PriceStore::new();
        store.set(A, M, 3 * UNIT);
        // M per B stored the other way round: 1 M = 0.5 B -> B = 2 M
        store.set(M, B, UNIT / 2);
        assert_eq!(
            derive_via_master(&store, M, A, B).unwrap(),
            Some(UNIT + UNIT / 2)
        );
    }

    #[test]
    fn test_truncates() {
        let mut store = PriceStore::new();
        store.set(A, M, UNIT);
        store.set(B, M, 3 * UNIT);
        assert_eq!(
            derive_via_master(&store, M, A, B).unwrap(),
            Some(333_333_333_333_333_333)
        );
    }

    #[test]
    fn test_missing_leg_is_not_found() {
        let mut store = PriceStore::new();
        store.set(A, M, 2 * UNIT);
        assert_eq!(derive_via_master(&store, M, A, B).unwrap(), None);
        assert_eq!(derive_via_master(&store, M, B, A).unwrap(), None);
    }

    #[test]
    fn test_overflow_propagates() {
        let mut store = PriceStore::new();
        store.set(A, M, Price::MAX);
        store.set(B, M, 1);
        assert!(matches!(
            derive_via_master(&store, M, A, B),
            Err(crate::error::OracleError::ArithmeticOverflow)
        ));
    }
}
