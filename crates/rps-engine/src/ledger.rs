//! Custodial balance ledger.
//!
//! Spendable balances live in `balances`; stakes locked by open sessions are
//! pooled in `escrowed`. The ledger keeps the invariant
//! `sum(balances) + escrowed == total_deposited - total_withdrawn`.

use crate::error::{HubError, HubResult};
use rps_core::{AccountId, FundsTransfer};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct BalanceLedger {
    balances: HashMap<AccountId, u64>,
    escrowed: u64,
    total_deposited: u64,
    total_withdrawn: u64,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spendable balance of an account (zero if never seen)
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Total value currently locked by open sessions
    pub fn escrowed(&self) -> u64 {
        self.escrowed
    }

    pub fn total_deposited(&self) -> u64 {
        self.total_deposited
    }

    pub fn total_withdrawn(&self) -> u64 {
        self.total_withdrawn
    }

    /// Credit `amount` to `account`. Returns the new balance.
    pub fn deposit(&mut self, account: AccountId, amount: u64) -> HubResult<u64> {
        let balance = self
            .balance_of(&account)
            .checked_add(amount)
            .ok_or(HubError::Overflow)?;
        let total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(HubError::Overflow)?;

        self.balances.insert(account, balance);
        self.total_deposited = total_deposited;
        Ok(balance)
    }

    /// Debit `amount` from `account` and send it out through `transfer`.
    ///
    /// The debit is applied before the transfer runs, so the recipient never
    /// observes a stale balance. A failed transfer restores the debit.
    pub fn withdraw(
        &mut self,
        account: AccountId,
        amount: u64,
        transfer: &dyn FundsTransfer,
    ) -> HubResult<u64> {
        let available = self.balance_of(&account);
        if amount > available {
            return Err(HubError::InsufficientFunds {
                available,
                required: amount,
            });
        }
        let total_withdrawn = self
            .total_withdrawn
            .checked_add(amount)
            .ok_or(HubError::Overflow)?;

        let balance = available - amount;
        self.balances.insert(account, balance);
        self.total_withdrawn = total_withdrawn;

        if let Err(err) = transfer.transfer(&account, amount) {
            tracing::warn!("Withdrawal of {} to {} rolled back: {}", amount, account, err);
            self.balances.insert(account, available);
            self.total_withdrawn -= amount;
            return Err(err.into());
        }

        Ok(balance)
    }

    /// Move `amount` from the account's spendable balance into escrow.
    /// Returns the new spendable balance.
    pub fn stake_lock(&mut self, account: AccountId, amount: u64) -> HubResult<u64> {
        let available = self.balance_of(&account);
        if amount > available {
            return Err(HubError::InsufficientFunds {
                available,
                required: amount,
            });
        }
        let escrowed = self.escrowed.checked_add(amount).ok_or(HubError::Overflow)?;

        let balance = available - amount;
        self.balances.insert(account, balance);
        self.escrowed = escrowed;
        Ok(balance)
    }

    /// Return a locked stake to its owner. Returns the new balance.
    pub fn stake_release(&mut self, account: AccountId, amount: u64) -> HubResult<u64> {
        self.release_all(&[(account, amount)])?;
        Ok(self.balance_of(&account))
    }

    /// Credit winnings out of escrow. Returns the new balance.
    pub fn payout(&mut self, account: AccountId, amount: u64) -> HubResult<u64> {
        self.release_all(&[(account, amount)])?;
        Ok(self.balance_of(&account))
    }

    /// Apply several escrow releases as one step: either every credit lands
    /// or none does.
    pub fn release_all(&mut self, credits: &[(AccountId, u64)]) -> HubResult<()> {
        let mut escrowed = self.escrowed;
        let mut updated: HashMap<AccountId, u64> = HashMap::new();

        for (account, amount) in credits {
            escrowed = escrowed.checked_sub(*amount).ok_or(HubError::Overflow)?;
            let current = match updated.get(account) {
                Some(balance) => *balance,
                None => self.balance_of(account),
            };
            let balance = current.checked_add(*amount).ok_or(HubError::Overflow)?;
            updated.insert(*account, balance);
        }

        self.escrowed = escrowed;
        self.balances.extend(updated);
        Ok(())
    }

    /// Check the conservation invariant
    pub fn is_consistent(&self) -> bool {
        let held: Option<u64> = self
            .balances
            .values()
            .try_fold(self.escrowed, |acc, b| acc.checked_add(*b));
        let net = self.total_deposited.checked_sub(self.total_withdrawn);
        matches!((held, net), (Some(held), Some(net)) if held == net)
    }
}
