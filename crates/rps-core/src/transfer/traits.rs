//! Funds transfer trait definition.

use crate::account::AccountId;
use thiserror::Error;

/// Errors from an external value transfer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Recipient {0} rejected the transfer")]
    Rejected(AccountId),

    #[error("Recipient balance would overflow")]
    Overflow,
}

/// Moves value out of the custodial ledger to the account's external wallet
///
/// The ledger debits its own record before calling `transfer` and restores
/// the debit if this returns an error. Implementations can be:
/// - MockFundsTransfer for testing and the demo service
/// - A bridge to a real payment rail in production
pub trait FundsTransfer: Send + Sync {
    /// Send `amount` to the external wallet of `to`
    fn transfer(&self, to: &AccountId, amount: u64) -> Result<(), TransferError>;
}
