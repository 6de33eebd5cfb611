//! Application state management.

use rps_core::MockFundsTransfer;
use rps_engine::{Hub, HubConfig, HubResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    hub: Arc<Mutex<Hub>>,
    /// External wallets receiving withdrawals
    wallets: MockFundsTransfer,
}

impl AppState {
    /// Create state around a fresh hub paying out to in-memory wallets
    pub fn new(config: HubConfig) -> Self {
        let wallets = MockFundsTransfer::new();
        let hub = Hub::new(config, Arc::new(wallets.clone()));
        Self {
            hub: Arc::new(Mutex::new(hub)),
            wallets,
        }
    }

    /// Create state and the first engine in one go
    pub fn with_engine(config: HubConfig) -> HubResult<Self> {
        let owner = config.owner();
        let state = Self::new(config);
        state.hub().create_rock_paper_scissors(owner)?;
        Ok(state)
    }

    /// Lock the hub for one operation.
    ///
    /// Hub operations validate before mutating, so a panic in another handler
    /// cannot leave a half-applied change behind the poisoned lock.
    pub fn hub(&self) -> MutexGuard<'_, Hub> {
        self.hub.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn wallets(&self) -> &MockFundsTransfer {
        &self.wallets
    }
}
