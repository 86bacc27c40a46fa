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

//! Account registration and lookup.

use crate::account::Account;
use crate::base::AccountId;
use crate::error::LedgerError;
use crate::ledger;
use crate::store::Store;
use crate::transaction::{Transaction, TransactionKind};
use std::sync::Arc;

/// Creates and looks up accounts.
///
/// Creating an account also records an `opening_balance` transaction whose
/// entry pair credits the new account and debits [`AccountId::EQUITY`], so
/// opening balances are covered by the ledger like any transfer.
#[derive(Debug, Clone)]
pub struct AccountRegistry {
    store: Arc<Store>,
}

impl AccountRegistry {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ReservedAccount`] - Id is the equity account.
    /// - [`LedgerError::InvalidAmount`] - Opening balance is negative.
    /// - [`LedgerError::DuplicateAccount`] - Id already registered.
    pub fn create(&self, account: Account) -> Result<Account, LedgerError> {
        if account.id.is_reserved() {
            return Err(LedgerError::ReservedAccount(account.id));
        }
        if account.balance.is_negative() {
            return Err(LedgerError::InvalidAmount(account.balance));
        }

        let transaction = Transaction::new(TransactionKind::OpeningBalance);
        let pair = ledger::opening_entries(transaction.id, account.id, account.balance)?;

        let _unit = self.store.begin_commit();
        self.store.open_account(account.clone(), transaction, &pair)?;

        tracing::info!(
            account = %account.id,
            customer = %account.customer_id,
            balance = %account.balance,
            "account created"
        );
        Ok(account)
    }

    pub fn get_by_id(&self, id: &AccountId) -> Option<Account> {
        self.store.get_account(id)
    }

    /// All accounts in registration order.
    pub fn list(&self) -> Vec<Account> {
        self.store.list_accounts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::CustomerId;
    use crate::ledger::EntryType;
    use crate::money::{Currency, Money};

    fn usd(amount: i64) -> Money {
        Money::new(amount, Currency::new("USD").unwrap())
    }

    fn registry() -> (AccountRegistry, Arc<Store>) {
        let store = Arc::new(Store::new());
        (AccountRegistry::new(Arc::clone(&store)), store)
    }

    #[test]
    fn create_records_opening_balance() {
        let (registry, store) = registry();
        let account = Account::new(AccountId(1), CustomerId(1), usd(100));
        assert_eq!(registry.create(account.clone()).unwrap(), account);

        let transactions = store.list_transactions();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].kind, TransactionKind::OpeningBalance);

        let entries = store.list_ledger_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entry_type, EntryType::Credit);
        assert_eq!(entries[0].account_id, AccountId(1));
        assert_eq!(entries[1].entry_type, EntryType::Debit);
        assert_eq!(entries[1].account_id, AccountId::EQUITY);
    }

    #[test]
    fn duplicate_leaves_no_trace() {
        let (registry, store) = registry();
        registry
            .create(Account::new(AccountId(1), CustomerId(1), usd(100)))
            .unwrap();
        let result = registry.create(Account::new(AccountId(1), CustomerId(2), usd(5)));

        assert_eq!(result, Err(LedgerError::DuplicateAccount(AccountId(1))));
        assert_eq!(registry.list().len(), 1);
        assert_eq!(store.list_transactions().len(), 1);
        assert_eq!(store.list_ledger_entries().len(), 2);
        let kept = registry.get_by_id(&AccountId(1)).unwrap();
        assert_eq!(kept.customer_id, CustomerId(1));
    }

    #[test]
    fn equity_id_cannot_be_registered() {
        let (registry, _) = registry();
        let result = registry.create(Account::new(AccountId::EQUITY, CustomerId(1), usd(1)));
        assert_eq!(result, Err(LedgerError::ReservedAccount(AccountId::EQUITY)));
    }

    #[test]
    fn negative_opening_balance_is_rejected() {
        let (registry, store) = registry();
        let result = registry.create(Account::new(AccountId(1), CustomerId(1), usd(-1)));
        assert_eq!(result, Err(LedgerError::InvalidAmount(usd(-1))));
        assert!(registry.get_by_id(&AccountId(1)).is_none());
        assert!(store.list_transactions().is_empty());
    }

    #[test]
    fn zero_opening_balance_is_allowed() {
        let (registry, store) = registry();
        registry
            .create(Account::new(AccountId(1), CustomerId(1), usd(0)))
            .unwrap();
        assert_eq!(store.list_ledger_entries()[0].amount, usd(0));
    }
}
