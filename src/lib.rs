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

//! # Ledger Transfer
//!
//! This library keeps monetary account balances and executes transfers
//! between accounts on top of a double-entry ledger. Balances are a cached
//! view over an append-only record of credit/debit entries and always agree
//! with it.
//!
//! ## Core Components
//!
//! - [`Engine`]: Transfer engine and entry point for every operation
//! - [`AccountRegistry`]: Account creation and lookup
//! - [`Store`]: Accounts, transactions and ledger entries
//! - [`Money`]: Currency-tagged integer amounts
//! - [`LedgerError`]: Error kinds for rejected requests and internal faults
//!
//! ## Example
//!
//! ```
//! use ledger_transfer::{Account, AccountId, Currency, CustomerId, Engine, Money, Transfer};
//!
//! let engine = Engine::new();
//! let usd = Currency::new("USD").unwrap();
//!
//! engine.create_account(Account::new(AccountId(1), CustomerId(1), Money::new(100, usd))).unwrap();
//! engine.create_account(Account::new(AccountId(3), CustomerId(2), Money::new(300, usd))).unwrap();
//!
//! let sender = engine
//!     .transfer(Transfer::new(AccountId(1), AccountId(3), Money::new(70, usd)))
//!     .unwrap();
//! assert_eq!(sender.balance, Money::new(30, usd));
//! assert_eq!(engine.get_account(&AccountId(3)).unwrap().balance, Money::new(370, usd));
//! ```
//!
//! ## Thread Safety
//!
//! Each account has its own lock. A transfer locks its two accounts in
//! ascending id order, so transfers on disjoint accounts run in parallel and
//! opposite transfers between the same pair cannot deadlock.

pub mod account;
mod base;
mod engine;
pub mod error;
mod gate;
pub mod ledger;
pub mod money;
mod registry;
pub mod seed;
pub mod server;
mod store;
mod transaction;

pub use account::Account;
pub use base::{AccountId, CustomerId, EntryId, TransactionId};
pub use engine::Engine;
pub use error::{InvariantViolation, LedgerError, Party};
pub use ledger::{EntryPair, EntryType, LedgerEntry};
pub use money::{Currency, Money, MoneyError};
pub use registry::AccountRegistry;
pub use store::{Snapshot, Store};
pub use transaction::{Transaction, TransactionKind, Transfer};
