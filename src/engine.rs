// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Transfer engine.
//!
//! The [`Engine`] is the entry point of the crate. It owns the [`Store`],
//! registers accounts through the [`AccountRegistry`] and executes transfers.
//!
//! # Transfer lifecycle
//!
//! ```text
//!  Validating ──ok──► Applying ──► Committed
//!      │                  │
//!      └──error──► Rejected ◄──invariant violation (rolled back)
//! ```
//!
//! - **Validating** runs against unlocked snapshots of both accounts and
//!   mutates nothing.
//! - **Applying** takes both account locks in ascending id order, validates
//!   again against the locked state, then appends the transaction, appends
//!   the credit/debit pair and moves the balances. If any step fails the
//!   earlier steps are undone before the locks are released.
//!
//! # Thread Safety
//!
//! Transfers touching disjoint accounts run in parallel. Transfers sharing
//! an account are serialized on that account's lock.

use crate::account::{Account, AccountCell};
use crate::base::{AccountId, TransactionId};
use crate::error::{InvariantViolation, LedgerError, Party};
use crate::ledger::{self, LedgerEntry};
use crate::money::Money;
use crate::registry::AccountRegistry;
use crate::store::{Snapshot, Store};
use crate::transaction::{Transaction, TransactionKind, Transfer};
use parking_lot::MutexGuard;
use std::sync::Arc;

/// Ledger engine managing accounts and transfers.
///
/// # Invariants
///
/// - Every transaction owns exactly one credit and one debit of equal amount.
/// - Every account balance equals the signed sum of its ledger entries.
/// - A committed transfer never leaves the sender below zero.
/// - A rejected transfer leaves no transaction, no entry and no balance change.
#[derive(Debug)]
pub struct Engine {
    store: Arc<Store>,
    registry: AccountRegistry,
}

impl Engine {
    /// Creates an engine over an empty store.
    pub fn new() -> Self {
        Self::with_store(Arc::new(Store::new()))
    }

    pub fn with_store(store: Arc<Store>) -> Self {
        Engine {
            registry: AccountRegistry::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    /// Registers an account. See [`AccountRegistry::create`].
    pub fn create_account(&self, account: Account) -> Result<Account, LedgerError> {
        self.registry.create(account)
    }

    /// All accounts in registration order.
    pub fn accounts(&self) -> Vec<Account> {
        self.registry.list()
    }

    /// Retrieves an account by id.
    ///
    /// Returns `None` if no account exists for the given id.
    pub fn get_account(&self, id: &AccountId) -> Option<Account> {
        self.registry.get_by_id(id)
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.store.list_transactions()
    }

    pub fn ledger_entries(&self) -> Vec<LedgerEntry> {
        self.store.list_ledger_entries()
    }

    pub fn entries_for_transaction(&self, id: TransactionId) -> Vec<LedgerEntry> {
        self.store.entries_for_transaction(id)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Checks a transfer against the current state without applying it.
    ///
    /// A later [`Engine::transfer`] can still fail if balances move in between.
    pub fn validate(&self, request: &Transfer) -> Result<(), LedgerError> {
        self.resolve_parties(request).map(|_| ())
    }

    /// Moves `request.amount` from the sender to the receiver.
    ///
    /// Returns the sender account as it is after the transfer.
    ///
    /// # Errors
    ///
    /// Checked in this order, the first failure is returned:
    ///
    /// - [`LedgerError::AccountNotFound`] - Sender, then receiver, does not exist.
    /// - [`LedgerError::SameAccount`] - Sender and receiver are the same account.
    /// - [`LedgerError::CurrencyMismatch`] - Accounts hold different currencies.
    /// - [`LedgerError::UnsupportedCurrency`] - Amount currency differs from the sender's.
    /// - [`LedgerError::InvalidAmount`] - Amount is zero or negative.
    /// - [`LedgerError::InsufficientBalance`] - Sender balance is below the amount.
    ///
    /// [`LedgerError::Internal`] signals a broken invariant during apply; the
    /// transfer was rolled back.
    pub fn transfer(&self, request: Transfer) -> Result<Account, LedgerError> {
        let result = self.execute(&request);
        match &result {
            Ok(_) => {}
            Err(error) if error.is_internal() => tracing::error!(
                sender = %request.sender,
                receiver = %request.receiver,
                amount = %request.amount,
                %error,
                "transfer rolled back"
            ),
            Err(error) => tracing::debug!(
                sender = %request.sender,
                receiver = %request.receiver,
                amount = %request.amount,
                code = error.code(),
                "transfer rejected"
            ),
        }
        result
    }

    fn execute(&self, request: &Transfer) -> Result<Account, LedgerError> {
        let (sender, receiver) = self.resolve_parties(request)?;
        self.commit(request, &sender, &receiver)
    }

    /// Locks both accounts, validates again and applies.
    fn commit(
        &self,
        request: &Transfer,
        sender: &AccountCell,
        receiver: &AccountCell,
    ) -> Result<Account, LedgerError> {
        let _unit = self.store.begin_commit();
        let (mut sender_account, mut receiver_account) = lock_pair(sender, receiver);
        // Balances may have moved since the unlocked check
        validate(request, &sender_account, &receiver_account)?;

        let transaction_id = self.apply(request, &mut sender_account, &mut receiver_account)?;
        tracing::debug!(
            transaction = %transaction_id,
            sender = %request.sender,
            receiver = %request.receiver,
            amount = %request.amount,
            "transfer committed"
        );
        Ok(sender_account.clone())
    }

    /// Looks up both accounts and validates against unlocked snapshots.
    fn resolve_parties(
        &self,
        request: &Transfer,
    ) -> Result<(Arc<AccountCell>, Arc<AccountCell>), LedgerError> {
        let sender = self
            .store
            .cell(&request.sender)
            .ok_or(LedgerError::AccountNotFound {
                party: Party::Sender,
                id: request.sender,
            })?;
        let receiver = self
            .store
            .cell(&request.receiver)
            .ok_or(LedgerError::AccountNotFound {
                party: Party::Receiver,
                id: request.receiver,
            })?;
        if request.sender == request.receiver {
            return Err(LedgerError::SameAccount(request.sender));
        }

        validate(request, &sender.snapshot(), &receiver.snapshot())?;
        Ok((sender, receiver))
    }

    /// Applies a validated transfer. Both accounts must be locked by the caller.
    fn apply(
        &self,
        request: &Transfer,
        sender: &mut Account,
        receiver: &mut Account,
    ) -> Result<TransactionId, LedgerError> {
        let transaction = Transaction::new(TransactionKind::Transfer);
        let transaction_id = transaction.id;
        self.store.append_transaction(transaction);

        if let Err(violation) = ledger::record_transfer_entries(
            &self.store,
            transaction_id,
            receiver.id,
            sender.id,
            request.amount,
        ) {
            self.store.retract_transaction(transaction_id);
            return Err(violation.into());
        }

        if let Err(violation) = move_balances(sender, receiver, &request.amount) {
            self.store.retract_transaction(transaction_id);
            return Err(violation.into());
        }

        Ok(transaction_id)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Business rule checks shared by the unlocked and the locked pass.
fn validate(request: &Transfer, sender: &Account, receiver: &Account) -> Result<(), LedgerError> {
    if !sender.balance.same_currency(&receiver.balance) {
        return Err(LedgerError::CurrencyMismatch {
            sender: sender.currency(),
            receiver: receiver.currency(),
        });
    }
    let Ok(short) = sender.balance.less_than(&request.amount) else {
        return Err(LedgerError::UnsupportedCurrency {
            balance: sender.currency(),
            requested: request.amount.currency(),
        });
    };
    if !request.amount.is_positive() {
        return Err(LedgerError::InvalidAmount(request.amount));
    }
    if short {
        return Err(LedgerError::InsufficientBalance {
            account: sender.id,
            available: sender.balance,
            requested: request.amount,
        });
    }
    Ok(())
}

/// Locks both accounts in ascending id order so that two transfers in
/// opposite directions cannot deadlock. Returns `(sender, receiver)` guards.
fn lock_pair<'a>(
    sender: &'a AccountCell,
    receiver: &'a AccountCell,
) -> (MutexGuard<'a, Account>, MutexGuard<'a, Account>) {
    if sender.id() < receiver.id() {
        let sender_guard = sender.lock();
        let receiver_guard = receiver.lock();
        (sender_guard, receiver_guard)
    } else {
        let receiver_guard = receiver.lock();
        let sender_guard = sender.lock();
        (sender_guard, receiver_guard)
    }
}

/// Debits the sender and credits the receiver, restoring the sender if the
/// credit fails.
fn move_balances(
    sender: &mut Account,
    receiver: &mut Account,
    amount: &Money,
) -> Result<(), InvariantViolation> {
    let sender_before = sender.balance;
    sender.debit(amount)?;
    if let Err(error) = receiver.credit(amount) {
        sender.balance = sender_before;
        return Err(error);
    }
    Ok(())
}
