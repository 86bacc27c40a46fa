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

//! Account records.
//!
//! An [`Account`] is plain data: id, owner and a cached balance. The balance
//! is a materialized view over the ledger and only changes through
//! [`Account::credit`] and [`Account::debit`], which the transfer engine calls
//! while it holds the account's lock. Neither lets the balance go negative.
//!
//! # Example
//!
//! ```
//! use ledger_transfer::{Account, AccountId, Currency, CustomerId, Money};
//!
//! let usd = Currency::new("USD").unwrap();
//! let account = Account::new(AccountId(1), CustomerId(1), Money::new(100, usd));
//! assert_eq!(account.balance, Money::new(100, usd));
//! ```

use crate::base::{AccountId, CustomerId};
use crate::error::InvariantViolation;
use crate::money::{Currency, Money};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

/// A customer account holding a balance in a single currency.
///
/// The balance currency is fixed when the account is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub customer_id: CustomerId,
    pub balance: Money,
}

impl Account {
    pub fn new(id: AccountId, customer_id: CustomerId, balance: Money) -> Self {
        Self {
            id,
            customer_id,
            balance,
        }
    }

    pub fn currency(&self) -> Currency {
        self.balance.currency()
    }

    fn set_balance(&mut self, balance: Money) -> Result<(), InvariantViolation> {
        if balance.is_negative() {
            return Err(InvariantViolation::NegativeBalance {
                account: self.id,
                balance,
            });
        }
        self.balance = balance;
        Ok(())
    }

    /// Increases the balance. Leaves the account untouched on error.
    pub(crate) fn credit(&mut self, amount: &Money) -> Result<(), InvariantViolation> {
        let balance = self.balance.add(amount)?;
        self.set_balance(balance)
    }

    /// Decreases the balance. Leaves the account untouched on error.
    pub(crate) fn debit(&mut self, amount: &Money) -> Result<(), InvariantViolation> {
        let balance = self.balance.subtract(amount)?;
        self.set_balance(balance)
    }
}

/// Lockable slot for one registered account.
///
/// The store hands out `Arc<AccountCell>` so the transfer engine can hold two
/// cells locked at once without keeping the account map borrowed.
#[derive(Debug)]
pub(crate) struct AccountCell {
    id: AccountId,
    inner: Mutex<Account>,
}

impl AccountCell {
    pub(crate) fn new(account: Account) -> Self {
        Self {
            id: account.id,
            inner: Mutex::new(account),
        }
    }

    pub(crate) fn id(&self) -> AccountId {
        self.id
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Account> {
        self.inner.lock()
    }

    pub(crate) fn snapshot(&self) -> Account {
        self.inner.lock().clone()
    }
}
