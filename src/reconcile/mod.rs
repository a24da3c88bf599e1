//! Slip reconciliation.
//!
//! Decides whether a slip, as read back by the OCR provider, pays a given
//! pending transaction. The decision is a fixed sequence of checks; the
//! first one that fails produces the verdict. Nothing here performs I/O:
//! whether the slip payload was already used is looked up by the caller,
//! and persisting an approval is the caller's job too.

use serde_json::Value;

use crate::Amount;
use crate::matching::{AccountMatching, name};
use crate::model::{OcrResult, Transaction};

mod error;
pub use error::{Rejection, RejectionCategory};

/// Provider status for a successfully read slip.
pub const STATUS_OK: u16 = 200;

/// Tunables of the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Largest accepted distance between expected and paid amount.
    pub amount_tolerance: Amount,
    pub account_matching: AccountMatching,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            amount_tolerance: Amount::from_scaled(100), // 0.01 baht
            account_matching: AccountMatching::default(),
        }
    }
}

/// What an approved slip leaves behind on the transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Approval {
    /// Slip payload, recorded for replay detection.
    pub payload: String,
    /// Provider data, archived with the transaction.
    pub data: Value,
}

/// Outcome of reconciling one slip against one transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Approved(Approval),
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_approved(&self) -> bool {
        matches!(self, Verdict::Approved(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Approved(_) => None,
            Verdict::Rejected(rejection) => Some(rejection),
        }
    }
}

/// Everything a check looks at.
struct Review<'a> {
    transaction: &'a Transaction,
    ocr: &'a OcrResult,
    payload_already_used: bool,
}

type Check = fn(&Reconciler, &Review<'_>) -> Result<(), Rejection>;

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
}

/// Public API
impl Reconciler {
    /// Checks in the order they are evaluated.
    const CHECKS: [Check; 8] = [
        Self::check_api_key,
        Self::check_replay,
        Self::check_readable,
        Self::check_amount,
        Self::check_proxy_type,
        Self::check_account,
        Self::check_name_present,
        Self::check_name,
    ];

    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Run every check against the slip, stopping at the first failure.
    ///
    /// `payload_already_used` tells whether `ocr.payload` is already recorded
    /// on a completed transaction.
    pub fn reconcile(
        &self,
        transaction: &Transaction,
        ocr: &OcrResult,
        payload_already_used: bool,
    ) -> Verdict {
        let review = Review {
            transaction,
            ocr,
            payload_already_used,
        };

        match Self::CHECKS.iter().try_for_each(|check| check(self, &review)) {
            Ok(()) => Verdict::Approved(Approval {
                payload: ocr.payload.clone().unwrap_or_default(),
                data: ocr.raw.clone(),
            }),
            Err(rejection) => Verdict::Rejected(rejection),
        }
    }
}

/// Checks
impl Reconciler {
    /// 400 and 401 mean the merchant's provider key is wrong, not the slip.
    fn check_api_key(&self, review: &Review<'_>) -> Result<(), Rejection> {
        match review.ocr.status_code {
            400 | 401 => Err(Rejection::InvalidApiKey),
            _ => Ok(()),
        }
    }

    fn check_replay(&self, review: &Review<'_>) -> Result<(), Rejection> {
        let has_payload = review.ocr.payload.as_deref().is_some_and(|p| !p.is_empty());
        if review.ocr.status_code == STATUS_OK && has_payload && review.payload_already_used {
            return Err(Rejection::Replay);
        }
        Ok(())
    }

    fn check_readable(&self, review: &Review<'_>) -> Result<(), Rejection> {
        if review.ocr.status_code != STATUS_OK || review.ocr.amount.is_none() {
            return Err(Rejection::Malformed);
        }
        Ok(())
    }

    /// A zero expected amount accepts whatever was paid.
    fn check_amount(&self, review: &Review<'_>) -> Result<(), Rejection> {
        let expected = review.transaction.amount;
        let Some(actual) = review.ocr.amount else {
            return Err(Rejection::Malformed);
        };

        if expected.is_positive() && actual.abs_diff(expected) > self.config.amount_tolerance {
            return Err(Rejection::Amount { expected, actual });
        }
        Ok(())
    }

    fn check_proxy_type(&self, review: &Review<'_>) -> Result<(), Rejection> {
        let expected = review.transaction.payment_type;
        match review.ocr.receiver_proxy_type {
            Some(actual) if actual == expected => Ok(()),
            actual => Err(Rejection::ProxyType { expected, actual }),
        }
    }

    fn check_account(&self, review: &Review<'_>) -> Result<(), Rejection> {
        let expected = &review.transaction.target;
        match review.ocr.receiver_proxy_account.as_deref() {
            Some(actual) if self.config.account_matching.matches(actual, expected) => Ok(()),
            actual => Err(Rejection::Account {
                expected: expected.clone(),
                actual: actual.unwrap_or_default().to_string(),
            }),
        }
    }

    fn check_name_present(&self, review: &Review<'_>) -> Result<(), Rejection> {
        if reported_name(review.ocr).is_none() {
            return Err(Rejection::Name {
                expected: review.transaction.recipient_name_th.clone(),
                actual: review.ocr.receiver_name_th.clone().unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// Thai receiver name if the slip has one, English otherwise.
    fn check_name(&self, review: &Review<'_>) -> Result<(), Rejection> {
        let transaction = review.transaction;
        let reported = reported_name(review.ocr).unwrap_or_default();
        let candidates = [
            transaction.recipient_name_th.as_str(),
            transaction.recipient_name_en.as_str(),
        ];

        if !name::matches(reported, candidates) {
            return Err(Rejection::Name {
                expected: transaction.recipient_name_th.clone(),
                actual: reported.to_string(),
            });
        }
        Ok(())
    }
}

/// The receiver name the slip is judged by, if it carries any.
fn reported_name(ocr: &OcrResult) -> Option<&str> {
    non_blank(ocr.receiver_name_th.as_deref())
        .or_else(|| non_blank(ocr.receiver_name_en.as_deref()))
}

fn non_blank(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.trim().is_empty())
}
