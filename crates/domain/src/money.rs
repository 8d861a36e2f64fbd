//! Fixed-precision money arithmetic.
//!
//! All prices and totals are stored as integer minor units (paise, cents)
//! tagged with a currency code. Arithmetic is checked: subtraction that
//! would drop below zero and cross-currency operations are errors, never
//! silent wraps.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from money construction and arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Attempted to construct a negative amount.
    #[error("Amount must not be negative: {amount}")]
    NegativeAmount { amount: i64 },

    /// Subtraction would produce a negative result.
    #[error("Result would be negative: {minuend} - {subtrahend}")]
    NegativeResult { minuend: i64, subtrahend: i64 },

    /// Arithmetic across different currencies.
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch {
        left: &'static str,
        right: &'static str,
    },
}

/// ISO currency of a money amount.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, PartialOrd, Ord,
)]
pub enum Currency {
    /// Indian rupee — the storefront's pricing currency.
    #[default]
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    /// Returns the ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
        }
    }

    /// Returns the display symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Inr => "₹",
            Currency::Usd => "$",
        }
    }

    /// Minor units per major unit (paise per rupee, cents per dollar).
    pub fn minor_per_major(&self) -> i64 {
        100
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A non-negative money amount in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Money {
    /// Amount in minor units (e.g. 105000 = ₹1,050.00).
    amount: i64,
    currency: Currency,
}

impl Money {
    /// Creates a money amount from minor units.
    pub fn from_minor(amount: i64, currency: Currency) -> Result<Self, MoneyError> {
        if amount < 0 {
            return Err(MoneyError::NegativeAmount { amount });
        }
        Ok(Self { amount, currency })
    }

    /// Creates a rupee amount from whole rupees.
    pub fn inr(rupees: u32) -> Self {
        Self {
            amount: i64::from(rupees) * 100,
            currency: Currency::Inr,
        }
    }

    /// Returns zero in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: 0,
            currency,
        }
    }

    /// Returns the amount in minor units.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Returns the currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Returns the major-unit portion (whole rupees/dollars).
    pub fn major_part(&self) -> i64 {
        self.amount / self.currency.minor_per_major()
    }

    /// Returns the minor-unit remainder after major units.
    pub fn minor_part(&self) -> i64 {
        self.amount % self.currency.minor_per_major()
    }

    /// Adds another amount of the same currency.
    pub fn add(self, other: Money) -> Result<Money, MoneyError> {
        self.check_currency(other)?;
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// Subtracts another amount of the same currency.
    ///
    /// Fails with [`MoneyError::NegativeResult`] rather than going below
    /// zero: stored totals and discounts are never negative.
    pub fn subtract(self, other: Money) -> Result<Money, MoneyError> {
        self.check_currency(other)?;
        if other.amount > self.amount {
            return Err(MoneyError::NegativeResult {
                minuend: self.amount,
                subtrahend: other.amount,
            });
        }
        Ok(Money {
            amount: self.amount - other.amount,
            currency: self.currency,
        })
    }

    /// Scales by a line quantity.
    pub fn multiply(self, quantity: u32) -> Money {
        Money {
            amount: self.amount * i64::from(quantity),
            currency: self.currency,
        }
    }

    /// Integer percentage of the amount, floored to minor units.
    pub fn percent(self, rate: u8) -> Money {
        Money {
            amount: self.amount * i64::from(rate) / 100,
            currency: self.currency,
        }
    }

    fn check_currency(self, other: Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.code(),
                right: other.currency.code(),
            });
        }
        Ok(())
    }

    /// Formats with the currency's locale grouping convention:
    /// lakh/crore groups for INR (`₹1,00,000.00`), thousands for USD.
    pub fn format(&self) -> String {
        let major = self.major_part().to_string();
        let grouped = match self.currency {
            Currency::Inr => group_indian(&major),
            Currency::Usd => group_thousands(&major),
        };
        format!(
            "{}{}.{:02}",
            self.currency.symbol(),
            grouped,
            self.minor_part()
        )
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::new();
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i).is_multiple_of(3) {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// en-IN convention: last three digits, then groups of two.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::new();
    let head_len = head.len();
    for (i, c) in head.chars().enumerate() {
        if i > 0 && (head_len - i).is_multiple_of(2) {
            out.push(',');
        }
        out.push(c);
    }
    out.push(',');
    out.push_str(tail);
    out
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}
