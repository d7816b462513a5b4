//! Four-digit sequences and the guess scorer.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Number of digits in every secret and guess.
pub const SEQUENCE_LEN: usize = 4;

/// A sequence of exactly four decimal digits, e.g. `5042`.
///
/// Repeated digits are allowed. On the wire a sequence is a
/// 4-character string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digits([u8; SEQUENCE_LEN]);

impl Digits {
    /// Returns the digit values in order.
    pub fn values(&self) -> &[u8; SEQUENCE_LEN] {
        &self.0
    }
}

/// Reason a string is not a valid digit sequence.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum DigitsError {
    /// Wrong number of characters.
    #[display("Expected {} digits, got {}", SEQUENCE_LEN, _0)]
    Length(#[error(not(source))] usize),

    /// A character outside `0`..=`9`.
    #[display("Not a digit: {:?}", _0)]
    NotADigit(#[error(not(source))] char),
}

impl FromStr for Digits {
    type Err = DigitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s.chars().count();
        if count != SEQUENCE_LEN {
            return Err(DigitsError::Length(count));
        }

        let mut values = [0u8; SEQUENCE_LEN];
        for (slot, c) in values.iter_mut().zip(s.chars()) {
            let digit = c.to_digit(10).ok_or(DigitsError::NotADigit(c))?;
            *slot = digit as u8;
        }
        Ok(Self(values))
    }
}

impl TryFrom<String> for Digits {
    type Error = DigitsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Digits> for String {
    fn from(digits: Digits) -> Self {
        digits.to_string()
    }
}

impl std::fmt::Display for Digits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for d in self.0 {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

/// Exact and partial match counts for one guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    /// Digits whose first occurrence in the secret is at the guessed position.
    pub exact: u8,
    /// Digits present in the secret that are not exact.
    pub partial: u8,
}

impl Score {
    /// True when every digit was exact.
    pub fn is_solved(&self) -> bool {
        self.exact as usize == SEQUENCE_LEN
    }
}

/// Scores `guess` against `secret`.
///
/// A guessed digit is exact when the *first* occurrence of that digit in
/// the secret sits at the same index, and partial when the digit appears
/// in the secret anywhere else. Repeated digits are not deduplicated, so
/// a secret such as `1122` can never be scored as fully exact.
#[instrument(level = "trace")]
pub fn score(secret: &Digits, guess: &Digits) -> Score {
    let mut result = Score::default();
    for (index, digit) in guess.0.iter().enumerate() {
        match secret.0.iter().position(|d| d == digit) {
            Some(first) if first == index => result.exact += 1,
            Some(_) => result.partial += 1,
            None => {}
        }
    }
    result
}
