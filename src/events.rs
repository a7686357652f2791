//! Notification log
//!
//! Append-only record of successful mutations, in call order. A failed
//! mutation never appends.

use serde::Serialize;

use crate::core_types::{AdapterId, AssetId, Principal};
use crate::money::Price;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    /// Carries the raw, pre-normalization price as fed
    PriceAdded {
        base: AssetId,
        quote: AssetId,
        #[serde(with = "price_as_string")]
        raw_price: Price,
    },
    PriceRemoved {
        base: AssetId,
        quote: AssetId,
    },
    AdapterAdded {
        adapter: AdapterId,
    },
    AdapterRemoved {
        adapter: AdapterId,
    },
    MasterQuoteAssetEdited {
        asset: AssetId,
    },
    GovernanceTransferred {
        previous: Principal,
        current: Principal,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    /// Starts at 1
    pub seq: u64,
    #[serde(flatten)]
    pub notification: Notification,
}

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and return the assigned sequence number
    pub fn push(&mut self, notification: Notification) -> u64 {
        let seq = self.records.len() as u64 + 1;
        self.records.push(EventRecord { seq, notification });
        seq
    }

    pub fn all(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `seq > after`
    pub fn since(&self, after: u64) -> &[EventRecord] {
        let start = (after as usize).min(self.records.len());
        &self.records[start..]
    }

    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// JSON numbers lose precision past 2^53 in most clients
mod price_as_string {
    use serde::Serializer;

    use crate::money::Price;

    pub fn serialize<S: Serializer>(price: &Price, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(price)
    }
}
