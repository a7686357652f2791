//! Price Oracle - tiered price resolution over a governed price registry
//!
//! A price for any asset pair is resolved in three tiers, first hit wins:
//! the stored ledger (forward entry, else the reciprocal of the inverse
//! entry), then triangulation through the master quote asset, then the
//! registered external adapters in insertion order.
//!
//! # Modules
//!
//! - [`core_types`] - Address-based identifiers (AssetId, Principal, AdapterId)
//! - [`money`] - 18-decimal fixed-point arithmetic
//! - [`price_store`] - Ordered-pair price ledger
//! - [`adapter`] - External adapter capability, registry and catalog
//! - [`derivation`] - Master-quote triangulation
//! - [`resolver`] - Three-tier resolution
//! - [`governance`] - Single-principal authorization
//! - [`events`] - Append-only notification log
//! - [`oracle`] - Public facade tying the above together
//! - [`gateway`] - HTTP surface

// Core types - must be first!
pub mod core_types;
pub mod error;
pub mod money;

// Registry and resolution
pub mod adapter;
pub mod derivation;
pub mod events;
pub mod governance;
pub mod oracle;
pub mod price_store;
pub mod resolver;

// Service plumbing
pub mod config;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use adapter::{AdapterCatalog, AdapterError, AdapterRef, AdapterRegistry, PriceAdapter, StaticAdapter};
pub use core_types::{AdapterId, Address, AssetId, Principal};
pub use error::{OracleError, OracleResult};
pub use events::{EventLog, EventRecord, Notification};
pub use money::{Price, UNIT};
pub use oracle::PriceOracle;
pub use resolver::PriceSource;
