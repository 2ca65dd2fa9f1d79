//! Phone-number lookup.
//!
//! # Responsibility
//! - Reduce phone numbers to their digits so `(980) 833-9861`,
//!   `980.833.9861` and `9808339861` all match each other.
//!
//! # Invariants
//! - Queries with fewer than `MIN_PHONE_DIGITS` digits are rejected.
//! - Bookings without a `phone` field never match.

use crate::model::booking::Booking;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MIN_PHONE_DIGITS: usize = 10;

// `\D` is Unicode-aware and would keep non-ASCII digits.
static NON_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9]+").expect("valid non-digit regex"));

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    InvalidQuery { query: String, message: String },
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid phone query `{query}`: {message}")
            }
        }
    }
}

impl Error for SearchError {}

/// Validated, digit-only phone query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneQuery {
    digits: String,
}

impl PhoneQuery {
    pub fn parse(raw: &str) -> SearchResult<Self> {
        let digits = phone_digits(raw);
        if digits.len() < MIN_PHONE_DIGITS {
            return Err(SearchError::InvalidQuery {
                query: raw.trim().to_string(),
                message: format!("expected at least {MIN_PHONE_DIGITS} digits"),
            });
        }
        Ok(Self { digits })
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn matches(&self, booking: &Booking) -> bool {
        booking
            .phone()
            .is_some_and(|phone| phone_digits(phone) == self.digits)
    }
}

/// Strips everything except ASCII digits.
pub fn phone_digits(value: &str) -> String {
    NON_DIGITS.replace_all(value, "").into_owned()
}
