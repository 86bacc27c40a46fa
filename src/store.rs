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

//! In-memory storage for accounts, transactions and ledger entries.
//!
//! Accounts live in a [`DashMap`] of individually locked cells, so transfers
//! on disjoint accounts proceed in parallel. Transactions and entries are
//! append-only logs.
//!
//! # Consistency
//!
//! Every mutating unit of work (account creation, transfer) runs inside the
//! mutate side of the commit gate and every whole-store read inside the
//! read side. Units run alongside each other and reads run
//! alongside each other, but a listing never overlaps a unit, so it sees all
//! of a unit or none of it. Reads of a single account only take that
//! account's lock.

use crate::account::{Account, AccountCell};
use crate::base::{AccountId, TransactionId};
use crate::error::LedgerError;
use crate::gate::{CommitGate, GateGuard, Side};
use crate::ledger::{EntryPair, LedgerEntry};
use crate::transaction::Transaction;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use std::sync::Arc;

/// Point-in-time copy of the whole store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub entries: Vec<LedgerEntry>,
}

#[derive(Debug, Default)]
pub struct Store {
    accounts: DashMap<AccountId, Arc<AccountCell>>,
    /// Account ids in registration order.
    account_order: RwLock<Vec<AccountId>>,
    transactions: RwLock<Vec<Transaction>>,
    entries: RwLock<Vec<LedgerEntry>>,
    commit: CommitGate,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a unit of work. Units run concurrently with each other but
    /// never overlap a whole-store read.
    pub(crate) fn begin_commit(&self) -> GateGuard<'_> {
        self.commit.enter(Side::Mutate)
    }

    fn begin_read(&self) -> GateGuard<'_> {
        self.commit.enter(Side::Read)
    }

    /// Registers a new account together with its opening transaction and
    /// entry pair.
    ///
    /// The opening records are logged while the map slot is still reserved,
    /// so no transfer can reach the account before they are in the log.
    ///
    /// # Errors
    ///
    /// [`LedgerError::DuplicateAccount`] if the id is taken. Nothing is
    /// logged in that case.
    pub(crate) fn open_account(
        &self,
        account: Account,
        opening: Transaction,
        pair: &EntryPair,
    ) -> Result<Arc<AccountCell>, LedgerError> {
        let id = account.id;
        // Entry API keeps check-and-insert atomic across threads
        let cell = match self.accounts.entry(id) {
            Entry::Occupied(_) => return Err(LedgerError::DuplicateAccount(id)),
            Entry::Vacant(entry) => {
                self.append_transaction(opening);
                self.append_entries(pair);
                let cell = Arc::new(AccountCell::new(account));
                entry.insert(Arc::clone(&cell));
                cell
            }
        };
        self.account_order.write().push(id);
        Ok(cell)
    }

    pub(crate) fn cell(&self, id: &AccountId) -> Option<Arc<AccountCell>> {
        // Clone the Arc so the map shard is released before the cell is locked
        self.accounts.get(id).map(|cell| Arc::clone(cell.value()))
    }

    pub fn contains_account(&self, id: &AccountId) -> bool {
        self.accounts.contains_key(id)
    }

    pub fn get_account(&self, id: &AccountId) -> Option<Account> {
        self.cell(id).map(|cell| cell.snapshot())
    }

    pub(crate) fn append_transaction(&self, transaction: Transaction) {
        self.transactions.write().push(transaction);
    }

    /// Appends credit then debit under one write lock.
    pub(crate) fn append_entries(&self, pair: &EntryPair) {
        let mut entries = self.entries.write();
        entries.push(pair.credit.clone());
        entries.push(pair.debit.clone());
    }

    /// Removes a transaction and its entries from the logs.
    ///
    /// Only valid inside the unit of work that appended them.
    pub(crate) fn retract_transaction(&self, id: TransactionId) {
        {
            let mut transactions = self.transactions.write();
            if let Some(pos) = transactions.iter().rposition(|t| t.id == id) {
                transactions.remove(pos);
            }
        }
        self.entries.write().retain(|e| e.transaction_id != id);
    }

    pub fn list_accounts(&self) -> Vec<Account> {
        let _gate = self.begin_read();
        self.accounts_in_order()
    }

    pub fn list_transactions(&self) -> Vec<Transaction> {
        let _gate = self.begin_read();
        self.transactions.read().clone()
    }

    pub fn list_ledger_entries(&self) -> Vec<LedgerEntry> {
        let _gate = self.begin_read();
        self.entries.read().clone()
    }

    pub fn entries_for_transaction(&self, id: TransactionId) -> Vec<LedgerEntry> {
        let _gate = self.begin_read();
        self.entries
            .read()
            .iter()
            .filter(|e| e.transaction_id == id)
            .cloned()
            .collect()
    }

    /// Accounts, transactions and entries captured at one point in time.
    pub fn snapshot(&self) -> Snapshot {
        let _gate = self.begin_read();
        Snapshot {
            accounts: self.accounts_in_order(),
            transactions: self.transactions.read().clone(),
            entries: self.entries.read().clone(),
        }
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    fn accounts_in_order(&self) -> Vec<Account> {
        self.account_order
            .read()
            .iter()
            .filter_map(|id| self.get_account(id))
            .collect()
    }
}
