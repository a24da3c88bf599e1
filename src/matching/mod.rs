//! Fuzzy comparisons between what a slip reports and what a transaction expects.
//!
//! Slips come back from OCR with honorifics, partial names and masked
//! account numbers, so neither names nor accounts can be compared for
//! plain equality.

pub mod account;
pub mod name;

pub use account::AccountMatching;
