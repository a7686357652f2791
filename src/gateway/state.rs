use std::sync::{Arc, Mutex, MutexGuard};

use crate::adapter::AdapterCatalog;
use crate::oracle::PriceOracle;

/// Gateway shared state
///
/// The mutex serializes every call, read or write, so each request observes
/// and commits a consistent oracle state.
#[derive(Clone)]
pub struct AppState {
    oracle: Arc<Mutex<PriceOracle>>,
    /// Adapters that may be registered by id
    pub catalog: Arc<AdapterCatalog>,
}

impl AppState {
    pub fn new(oracle: PriceOracle, catalog: AdapterCatalog) -> Self {
        Self {
            oracle: Arc::new(Mutex::new(oracle)),
            catalog: Arc::new(catalog),
        }
    }

    /// `None` if a previous holder panicked mid-call
    pub fn lock_oracle(&self) -> Option<MutexGuard<'_, PriceOracle>> {
        self.oracle.lock().ok()
    }
}
