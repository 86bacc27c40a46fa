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

//! Exact, currency-tagged amounts.
//!
//! [`Money`] holds a signed integer count of minor units (cents, fils, ...)
//! together with a [`Currency`]. Arithmetic and ordering between two values
//! of different currencies fail with [`MoneyError::CurrencyMismatch`]; there
//! is no conversion and no floating point.
//!
//! # Example
//!
//! ```
//! use ledger_transfer::{Currency, Money};
//!
//! let usd = Currency::new("USD").unwrap();
//! let balance = Money::new(100, usd);
//! let rest = balance.subtract(&Money::new(70, usd)).unwrap();
//! assert_eq!(rest, Money::new(30, usd));
//!
//! let aed = Money::new(70, Currency::new("AED").unwrap());
//! assert!(balance.subtract(&aed).is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failures of [`Money`] arithmetic and parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    /// The result does not fit into the minor unit range.
    #[error("amount overflow")]
    Overflow,

    #[error("invalid currency code {0:?}")]
    InvalidCurrency(String),
}

/// ISO 4217 style three letter currency code, stored upper case.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    pub fn new(code: &str) -> Result<Self, MoneyError> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(MoneyError::InvalidCurrency(code.to_string()));
        }
        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    pub fn code(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.code())
    }
}

/// An amount of minor units in a single currency.
///
/// Serialized as `{"amount": <minor units>, "currency": "<code>"}`.
/// Equality (`==`) is total: values in different currencies are simply unequal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    pub fn same_currency(&self, other: &Money) -> bool {
        self.currency == other.currency
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.same_currency(other) {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            })
        }
    }

    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, self.currency))
    }

    pub fn subtract(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, self.currency))
    }

    /// `self < other`, defined only within one currency.
    pub fn less_than(&self, other: &Money) -> Result<bool, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount < other.amount)
    }

    pub fn negate(&self) -> Result<Money, MoneyError> {
        let amount = self.amount.checked_neg().ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, self.currency))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(amount: i64) -> Money {
        Money::new(amount, Currency::new("USD").unwrap())
    }

    fn aed(amount: i64) -> Money {
        Money::new(amount, Currency::new("AED").unwrap())
    }

    #[test]
    fn currency_codes_are_normalised() {
        assert_eq!(Currency::new("usd"), Currency::new("USD"));
        assert_eq!(Currency::new("eUr").unwrap().code(), "EUR");
    }

    #[test]
    fn malformed_currency_codes_are_rejected() {
        for code in ["", "US", "USDT", "U$D", "12A"] {
            assert_eq!(
                Currency::new(code),
                Err(MoneyError::InvalidCurrency(code.to_string()))
            );
        }
    }

    #[test]
    fn add_and_subtract_within_currency() {
        assert_eq!(usd(100).add(&usd(70)).unwrap(), usd(170));
        assert_eq!(usd(100).subtract(&usd(70)).unwrap(), usd(30));
        assert_eq!(usd(100).subtract(&usd(100)).unwrap(), usd(0));
    }

    #[test]
    fn cross_currency_operations_fail() {
        let mismatch = MoneyError::CurrencyMismatch {
            left: usd(0).currency(),
            right: aed(0).currency(),
        };
        assert_eq!(usd(100).add(&aed(1)), Err(mismatch.clone()));
        assert_eq!(usd(100).subtract(&aed(1)), Err(mismatch.clone()));
        assert_eq!(usd(100).less_than(&aed(1)), Err(mismatch));
    }

    #[test]
    fn same_currency_and_equality_are_total() {
        assert!(usd(1).same_currency(&usd(2)));
        assert!(!usd(1).same_currency(&aed(1)));
        assert_ne!(usd(1), aed(1));
        assert_eq!(usd(1), usd(1));
    }

    #[test]
    fn less_than_compares_amounts() {
        assert!(usd(100).less_than(&usd(101)).unwrap());
        assert!(!usd(100).less_than(&usd(100)).unwrap());
        assert!(!usd(101).less_than(&usd(100)).unwrap());
    }

    #[test]
    fn overflow_is_reported_not_wrapped() {
        assert_eq!(usd(i64::MAX).add(&usd(1)), Err(MoneyError::Overflow));
        assert_eq!(usd(i64::MIN).subtract(&usd(1)), Err(MoneyError::Overflow));
        assert_eq!(usd(i64::MIN).negate(), Err(MoneyError::Overflow));
    }

    #[test]
    fn serializes_as_amount_and_currency() {
        let json = serde_json::to_string(&usd(70)).unwrap();
        assert_eq!(json, r#"{"amount":70,"currency":"USD"}"#);

        let parsed: Money = serde_json::from_str(r#"{"amount":200,"currency":"aed"}"#).unwrap();
        assert_eq!(parsed, aed(200));

        let bad = serde_json::from_str::<Money>(r#"{"amount":1,"currency":"DOLLARS"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn display_uses_minor_units() {
        assert_eq!(usd(70).to_string(), "70 USD");
    }
}
