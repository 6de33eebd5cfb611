//! Mock funds transfer for testing.

use super::traits::{FundsTransfer, TransferError};
use crate::account::AccountId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// In-memory external wallets
#[derive(Clone, Default)]
pub struct MockFundsTransfer {
    /// Map of account -> external wallet balance
    wallets: Arc<Mutex<HashMap<AccountId, u64>>>,
    /// Accounts whose wallet refuses incoming value
    rejecting: Arc<Mutex<HashSet<AccountId>>>,
}

impl MockFundsTransfer {
    /// Create a mock with empty wallets
    pub fn new() -> Self {
        Self::default()
    }

    /// External wallet balance of an account
    pub fn wallet_balance(&self, account: &AccountId) -> u64 {
        self.wallets
            .lock()
            .unwrap()
            .get(account)
            .copied()
            .unwrap_or(0)
    }

    /// Make every future transfer to `account` fail
    pub fn reject(&self, account: AccountId) {
        self.rejecting.lock().unwrap().insert(account);
    }

    /// Undo a previous `reject`
    pub fn accept(&self, account: &AccountId) {
        self.rejecting.lock().unwrap().remove(account);
    }
}

impl FundsTransfer for MockFundsTransfer {
    fn transfer(&self, to: &AccountId, amount: u64) -> Result<(), TransferError> {
        if self.rejecting.lock().unwrap().contains(to) {
            return Err(TransferError::Rejected(*to));
        }

        let mut wallets = self.wallets.lock().unwrap();
        let wallet = wallets.entry(*to).or_insert(0);
        *wallet = wallet.checked_add(amount).ok_or(TransferError::Overflow)?;

        tracing::debug!("Mock transfer of {} to {}", amount, to);
        Ok(())
    }
}
