use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Character a slip uses to hide a digit of the receiver account.
pub const MASK: char = 'X';

/// How a masked slip account is compared with the expected target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountMatching {
    /// Every expected digit consumes one matching character anywhere in the
    /// reported account; only masks may remain.
    #[default]
    Multiset,
    /// Each position must be masked or carry the expected digit.
    Positional,
}

impl AccountMatching {
    pub fn matches(&self, reported: &str, expected: &str) -> bool {
        match self {
            AccountMatching::Multiset => matches(reported, expected),
            AccountMatching::Positional => matches_positional(reported, expected),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown account matching '{0}', expected 'multiset' or 'positional'")]
pub struct ParseAccountMatchingError(pub String);

impl FromStr for AccountMatching {
    type Err = ParseAccountMatchingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multiset" => Ok(AccountMatching::Multiset),
            "positional" => Ok(AccountMatching::Positional),
            _ => Err(ParseAccountMatchingError(s.to_string())),
        }
    }
}

impl fmt::Display for AccountMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccountMatching::Multiset => "multiset",
            AccountMatching::Positional => "positional",
        })
    }
}

/// Whether a (possibly masked) slip account can stand for `expected`.
///
/// Each digit of `expected`, left to right, replaces its first remaining
/// occurrence in the reported account with [`MASK`]. The account matches
/// when nothing but masks is left. This does not look at positions, so a
/// reported account with the right digits in another order also matches.
pub fn matches(reported: &str, expected: &str) -> bool {
    let mut working = strip_hyphens(&reported.to_uppercase());
    let expected = strip_hyphens(expected);

    if working.len() != expected.len() {
        return false;
    }

    for digit in &expected {
        if let Some(slot) = working.iter_mut().find(|c| **c == *digit) {
            *slot = MASK;
        }
    }

    working.iter().all(|c| *c == MASK)
}

/// Position by position: each reported character is a mask (`X` or `*`)
/// or equals the expected digit at the same place.
pub fn matches_positional(reported: &str, expected: &str) -> bool {
    let reported = strip_hyphens(&reported.to_uppercase());
    let expected = strip_hyphens(expected);

    reported.len() == expected.len()
        && reported
            .iter()
            .zip(&expected)
            .all(|(got, want)| *got == MASK || *got == '*' || got == want)
}

fn strip_hyphens(s: &str) -> Vec<char> {
    s.chars().filter(|c| *c != '-').collect()
}
