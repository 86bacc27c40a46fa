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

//! Double-entry ledger.
//!
//! Money moves only through credit/debit pairs: every [`Transaction`] owns
//! exactly one credit and one debit of the same amount, appended credit
//! first. Account balances are derivable from the entries with
//! [`derive_balance`].
//!
//! [`Transaction`]: crate::Transaction

use crate::base::{AccountId, EntryId, TransactionId};
use crate::error::InvariantViolation;
use crate::money::{Currency, Money, MoneyError};
use crate::store::Store;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Increases the derived balance.
    #[serde(rename = "C", alias = "credit")]
    Credit,
    /// Decreases the derived balance.
    #[serde(rename = "D", alias = "debit")]
    Debit,
}

/// One immutable line of the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub account_id: AccountId,
    pub transaction_id: TransactionId,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Always a non-negative magnitude; the direction is `entry_type`.
    pub amount: Money,
}

impl LedgerEntry {
    fn new(
        account_id: AccountId,
        transaction_id: TransactionId,
        entry_type: EntryType,
        amount: Money,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            account_id,
            transaction_id,
            entry_type,
            amount,
        }
    }

    /// Credit positive, debit negative.
    pub fn signed_amount(&self) -> Result<Money, MoneyError> {
        match self.entry_type {
            EntryType::Credit => Ok(self.amount),
            EntryType::Debit => self.amount.negate(),
        }
    }
}

/// Matching credit and debit of one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPair {
    pub credit: LedgerEntry,
    pub debit: LedgerEntry,
}

impl EntryPair {
    /// Builds the pair and checks it before anything is written.
    pub fn new(
        transaction_id: TransactionId,
        credit_account: AccountId,
        debit_account: AccountId,
        amount: Money,
    ) -> Result<Self, InvariantViolation> {
        let pair = Self {
            credit: LedgerEntry::new(credit_account, transaction_id, EntryType::Credit, amount),
            debit: LedgerEntry::new(debit_account, transaction_id, EntryType::Debit, amount),
        };
        pair.verify()?;
        Ok(pair)
    }

    pub fn verify(&self) -> Result<(), InvariantViolation> {
        let transaction = self.credit.transaction_id;
        if self.credit.amount != self.debit.amount
            || self.debit.transaction_id != transaction
            || self.credit.entry_type != EntryType::Credit
            || self.debit.entry_type != EntryType::Debit
        {
            return Err(InvariantViolation::UnbalancedPair {
                transaction,
                credit: self.credit.amount,
                debit: self.debit.amount,
            });
        }
        if self.credit.amount.is_negative() {
            return Err(InvariantViolation::NegativeEntry {
                transaction,
                amount: self.credit.amount,
            });
        }
        if self.credit.account_id == self.debit.account_id {
            return Err(InvariantViolation::DegeneratePair {
                transaction,
                account: self.credit.account_id,
            });
        }
        Ok(())
    }
}

/// Appends the pair for a transfer: credit on the receiver, debit on the sender.
pub(crate) fn record_transfer_entries(
    store: &Store,
    transaction_id: TransactionId,
    credit_account: AccountId,
    debit_account: AccountId,
    amount: Money,
) -> Result<EntryPair, InvariantViolation> {
    let pair = EntryPair::new(transaction_id, credit_account, debit_account, amount)?;
    store.append_entries(&pair);
    Ok(pair)
}

/// Builds the pair funding a new account from [`AccountId::EQUITY`].
///
/// Nothing is written; the caller appends it together with the account.
pub(crate) fn opening_entries(
    transaction_id: TransactionId,
    account: AccountId,
    balance: Money,
) -> Result<EntryPair, InvariantViolation> {
    EntryPair::new(transaction_id, account, AccountId::EQUITY, balance)
}

/// Signed sum of the entries belonging to `transaction`.
///
/// Zero for every committed transaction. `None` if the transaction has no entries.
pub fn transaction_net(
    entries: &[LedgerEntry],
    transaction: TransactionId,
) -> Result<Option<Money>, MoneyError> {
    let mut net: Option<Money> = None;
    for entry in entries.iter().filter(|e| e.transaction_id == transaction) {
        let signed = entry.signed_amount()?;
        net = Some(match net {
            Some(sum) => sum.add(&signed)?,
            None => signed,
        });
    }
    Ok(net)
}

/// Balance of `account` as the signed sum of its entries, in entry order.
pub fn derive_balance(
    entries: &[LedgerEntry],
    account: AccountId,
    currency: Currency,
) -> Result<Money, MoneyError> {
    entries
        .iter()
        .filter(|e| e.account_id == account)
        .try_fold(Money::zero(currency), |balance, entry| {
            balance.add(&entry.signed_amount()?)
        })
}
