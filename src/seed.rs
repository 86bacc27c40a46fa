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

//! Bootstrap accounts from CSV.
//!
//! # CSV Format
//!
//! Expected columns: `id, customer_id, amount, currency`
//! - `id`: Account id (u64, must not be 0)
//! - `customer_id`: Owner id (u64)
//! - `amount`: Opening balance in minor units (i64)
//! - `currency`: Three letter currency code
//!
//! ```csv
//! id,customer_id,amount,currency
//! 1,1,100,USD
//! 2,1,200,AED
//! 3,2,300,USD
//! ```

use crate::account::Account;
use crate::base::{AccountId, CustomerId};
use crate::engine::Engine;
use crate::money::{Currency, Money};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::io::Read;

/// Raw CSV record matching the seed format.
#[derive(Debug, Deserialize)]
struct SeedRecord {
    id: u64,
    customer_id: u64,
    amount: i64,
    currency: Currency,
}

impl SeedRecord {
    fn into_account(self) -> Account {
        Account::new(
            AccountId(self.id),
            CustomerId(self.customer_id),
            Money::new(self.amount, self.currency),
        )
    }
}

/// Outcome of a seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

/// Creates one account per CSV row.
///
/// Malformed rows and rows the registry rejects (duplicates, negative
/// balances) are skipped and logged; they do not stop the load.
///
/// # Errors
///
/// Returns a CSV error if the header cannot be read.
pub fn load_accounts<R: Read>(engine: &Engine, reader: R) -> Result<SeedReport, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .has_headers(true)
        .from_reader(reader);
    rdr.headers()?;

    let mut report = SeedReport::default();
    for (line, result) in rdr.deserialize::<SeedRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(row = line + 1, error = %e, "skipping malformed seed row");
                report.skipped += 1;
                continue;
            }
        };
        match engine.create_account(record.into_account()) {
            Ok(_) => report.created += 1,
            Err(e) => {
                tracing::warn!(row = line + 1, error = %e, "skipping seed account");
                report.skipped += 1;
            }
        }
    }
    Ok(report)
}
