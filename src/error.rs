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

//! Error types for account registration and transfers.
//!
//! [`LedgerError`] is the closed set of outcomes a caller can receive. All
//! variants except [`LedgerError::Internal`] are business-rule rejections of
//! the request itself; `Internal` wraps an [`InvariantViolation`], which means
//! the engine caught a defect and rolled back.

use crate::base::{AccountId, TransactionId};
use crate::money::{Currency, Money, MoneyError};
use std::fmt;
use thiserror::Error;

/// Which side of a transfer an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Sender,
    Receiver,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Sender => f.write_str("sender"),
            Party::Receiver => f.write_str("receiver"),
        }
    }
}

/// Ledger and transfer errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// An account with this id is already registered
    #[error("account {0} already exists")]
    DuplicateAccount(AccountId),

    /// Id is reserved for the equity account
    #[error("account id {0} is reserved")]
    ReservedAccount(AccountId),

    /// Referenced account does not exist
    #[error("{party} account {id} not found")]
    AccountNotFound { party: Party, id: AccountId },

    /// Sender and receiver are the same account
    #[error("cannot transfer from account {0} to itself")]
    SameAccount(AccountId),

    /// Sender and receiver hold different currencies
    #[error("receiver account currency {receiver} not same as sender {sender}")]
    CurrencyMismatch {
        sender: Currency,
        receiver: Currency,
    },

    /// Amount currency cannot be compared with the sender balance
    #[error("currency conversion not supported: balance in {balance}, amount in {requested}")]
    UnsupportedCurrency {
        balance: Currency,
        requested: Currency,
    },

    /// Amount is zero or negative
    #[error("invalid amount {0} (must be positive)")]
    InvalidAmount(Money),

    /// Sender balance is below the requested amount
    #[error("not enough balance in account {account}: {available} available, {requested} requested")]
    InsufficientBalance {
        account: AccountId,
        available: Money,
        requested: Money,
    },

    /// A ledger invariant broke while applying; the operation was rolled back
    #[error("internal error: {0}")]
    Internal(#[from] InvariantViolation),
}

impl LedgerError {
    /// `true` for defects, `false` for rejections of a bad request.
    pub fn is_internal(&self) -> bool {
        matches!(self, LedgerError::Internal(_))
    }

    /// Stable machine readable code.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            LedgerError::ReservedAccount(_) => "RESERVED_ACCOUNT",
            LedgerError::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            LedgerError::SameAccount(_) => "SAME_ACCOUNT",
            LedgerError::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            LedgerError::UnsupportedCurrency { .. } => "UNSUPPORTED_CURRENCY",
            LedgerError::InvalidAmount(_) => "INVALID_AMOUNT",
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LedgerError::Internal(_) => "INTERNAL",
        }
    }
}

/// Broken ledger invariants. Seeing one of these is a bug, not bad input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Balance arithmetic failed after validation passed
    #[error("balance arithmetic failed during apply: {0}")]
    Arithmetic(#[from] MoneyError),

    /// Credit and debit of one transaction do not carry the same amount
    #[error("unbalanced entry pair for transaction {transaction}: credit {credit}, debit {debit}")]
    UnbalancedPair {
        transaction: TransactionId,
        credit: Money,
        debit: Money,
    },

    /// Ledger entries must carry a non-negative magnitude
    #[error("negative entry amount {amount} for transaction {transaction}")]
    NegativeEntry {
        transaction: TransactionId,
        amount: Money,
    },

    /// A balance change would leave the account below zero
    #[error("balance of account {account} would become {balance}")]
    NegativeBalance { account: AccountId, balance: Money },

    /// Credit and debit target the same account
    #[error("entry pair for transaction {transaction} credits and debits account {account}")]
    DegeneratePair {
        transaction: TransactionId,
        account: AccountId,
    },
}
