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

//! Business transactions and transfer requests.
//!
//! A [`Transaction`] records one logical event. It is immutable once created
//! and owns exactly one credit/debit pair in the ledger.

use crate::base::{AccountId, TransactionId};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Funds a newly created account from the equity account.
    OpeningBalance,
    Transfer,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpeningBalance => f.write_str("opening_balance"),
            Self::Transfer => f.write_str("transfer"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Creates a transaction with a fresh id, stamped now.
    pub fn new(kind: TransactionKind) -> Self {
        Self {
            id: TransactionId::generate(),
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// Request to move `amount` from the sender to the receiver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transfer {
    #[serde(rename = "sender_account_id")]
    pub sender: AccountId,
    #[serde(rename = "receiver_account_id")]
    pub receiver: AccountId,
    pub amount: Money,
}

impl Transfer {
    pub fn new(sender: AccountId, receiver: AccountId, amount: Money) -> Self {
        Self {
            sender,
            receiver,
            amount,
        }
    }
}
