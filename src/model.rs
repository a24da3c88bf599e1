//! Core domain types for slip verification.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::Amount;

/// Transaction identifier.
pub type TransactionId = Uuid;

/// The PromptPay proxy a transaction was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    /// Mobile phone number, 10 digits.
    #[serde(rename = "MSISDN")]
    Msisdn,
    /// Thai national ID, 13 digits.
    #[serde(rename = "NATID")]
    NatId,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Msisdn => "MSISDN",
            PaymentType::NatId => "NATID",
        }
    }

    /// Number of digits a target of this type carries.
    pub fn target_len(&self) -> usize {
        match self {
            PaymentType::Msisdn => 10,
            PaymentType::NatId => 13,
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver proxy type as reported on a slip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProxyType {
    #[serde(rename = "MSISDN")]
    Msisdn,
    #[serde(rename = "NATID")]
    NatId,
    #[serde(rename = "EWALLETID")]
    EWalletId,
    #[serde(rename = "EMAIL")]
    Email,
    #[serde(rename = "BILLERID")]
    BillerId,
}

impl ProxyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyType::Msisdn => "MSISDN",
            ProxyType::NatId => "NATID",
            ProxyType::EWalletId => "EWALLETID",
            ProxyType::Email => "EMAIL",
            ProxyType::BillerId => "BILLERID",
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PaymentType> for ProxyType {
    fn from(value: PaymentType) -> Self {
        match value {
            PaymentType::Msisdn => ProxyType::Msisdn,
            PaymentType::NatId => ProxyType::NatId,
        }
    }
}

impl PartialEq<PaymentType> for ProxyType {
    fn eq(&self, other: &PaymentType) -> bool {
        *self == ProxyType::from(*other)
    }
}

/// Lifecycle of a transaction. Only `Pending` can be verified or cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
        })
    }
}

/// A payment request awaiting (or past) slip verification.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub recipient_name_th: String,
    pub recipient_name_en: String,
    pub payment_type: PaymentType,
    /// Expected proxy account, digits only.
    pub target: String,
    /// Expected amount; zero means any amount is accepted.
    pub amount: Amount,
    pub status: TransactionStatus,
    /// Slip payload recorded on completion, unique among completed transactions.
    pub recipient_qrcode: Option<String>,
    /// Full provider response archived on completion.
    pub data: Option<serde_json::Value>,
}

impl Transaction {
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }
}

/// Slip fields extracted by the OCR provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OcrResult {
    pub status_code: u16,
    /// Opaque string identifying the physical slip.
    pub payload: Option<String>,
    pub amount: Option<Amount>,
    pub receiver_proxy_type: Option<ProxyType>,
    pub receiver_proxy_account: Option<String>,
    pub receiver_name_th: Option<String>,
    pub receiver_name_en: Option<String>,
    /// The provider's `data` object as received.
    pub raw: serde_json::Value,
}

/// Upper bound on a transaction amount, in baht.
const MAX_AMOUNT_BAHT: i64 = 10_000_000;

/// Input for creating a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub recipient_name_th: String,
    pub recipient_name_en: String,
    pub payment_type: PaymentType,
    pub target: String,
    pub amount: Amount,
}

/// A single creation-time validation failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("recipient name (Thai) is required")]
    MissingNameTh,
    #[error("recipient name (English) is required")]
    MissingNameEn,
    #[error("target must contain digits only")]
    NonDigitTarget,
    #[error("{payment_type} target must be {expected} digits, got {actual}")]
    TargetLength {
        payment_type: PaymentType,
        expected: usize,
        actual: usize,
    },
    #[error("amount {0} is out of range 0.01..=10000000")]
    AmountOutOfRange(Amount),
}

impl NewTransaction {
    /// Check every field, returning all failures at once.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.recipient_name_th.trim().is_empty() {
            errors.push(ValidationError::MissingNameTh);
        }
        if self.recipient_name_en.trim().is_empty() {
            errors.push(ValidationError::MissingNameEn);
        }

        if self.target.is_empty() || !self.target.chars().all(|c| c.is_ascii_digit()) {
            errors.push(ValidationError::NonDigitTarget);
        } else if self.target.len() != self.payment_type.target_len() {
            errors.push(ValidationError::TargetLength {
                payment_type: self.payment_type,
                expected: self.payment_type.target_len(),
                actual: self.target.len(),
            });
        }

        let min = Amount::from_scaled(100);
        let max = Amount::from_float(MAX_AMOUNT_BAHT as f64);
        if self.amount < min || self.amount > max {
            errors.push(ValidationError::AmountOutOfRange(self.amount));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Create a pending transaction. Call [`validate`](Self::validate) first.
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            recipient_name_th: self.recipient_name_th,
            recipient_name_en: self.recipient_name_en,
            payment_type: self.payment_type,
            target: self.target,
            amount: self.amount,
            status: TransactionStatus::Pending,
            recipient_qrcode: None,
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_phone_tx() -> NewTransaction {
        NewTransaction {
            recipient_name_th: "สมชาย ใจดี".to_string(),
            recipient_name_en: "Somchai Jaidee".to_string(),
            payment_type: PaymentType::Msisdn,
            target: "0812345678".to_string(),
            amount: Amount::from_float(50.0),
        }
    }

    #[test]
    fn proxy_type_compares_with_payment_type() {
        assert!(ProxyType::Msisdn == PaymentType::Msisdn);
        assert!(ProxyType::NatId == PaymentType::NatId);
        assert!(ProxyType::NatId != PaymentType::Msisdn);
        assert!(ProxyType::EWalletId != PaymentType::Msisdn);
    }

    #[test]
    fn wire_names() {
        let ty: ProxyType = serde_json::from_str("\"EWALLETID\"").unwrap();
        assert_eq!(ty, ProxyType::EWalletId);
        let ty: PaymentType = serde_json::from_str("\"NATID\"").unwrap();
        assert_eq!(ty, PaymentType::NatId);
        let status: TransactionStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, TransactionStatus::Cancelled);
        assert_eq!(TransactionStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn status_default_is_pending() {
        assert_eq!(TransactionStatus::default(), TransactionStatus::Pending);
    }

    #[test]
    fn valid_transaction_passes() {
        assert_eq!(new_phone_tx().validate(), Ok(()));

        let national_id = NewTransaction {
            payment_type: PaymentType::NatId,
            target: "1234567890123".to_string(),
            ..new_phone_tx()
        };
        assert_eq!(national_id.validate(), Ok(()));
    }

    #[test]
    fn target_length_must_follow_payment_type() {
        let tx = NewTransaction {
            payment_type: PaymentType::NatId,
            ..new_phone_tx()
        };
        assert_eq!(
            tx.validate(),
            Err(vec![ValidationError::TargetLength {
                payment_type: PaymentType::NatId,
                expected: 13,
                actual: 10,
            }])
        );
    }

    #[test]
    fn collects_every_failure() {
        let tx = NewTransaction {
            recipient_name_th: " ".to_string(),
            recipient_name_en: String::new(),
            target: "081-234-5678".to_string(),
            amount: Amount::ZERO,
            ..new_phone_tx()
        };
        assert_eq!(
            tx.validate(),
            Err(vec![
                ValidationError::MissingNameTh,
                ValidationError::MissingNameEn,
                ValidationError::NonDigitTarget,
                ValidationError::AmountOutOfRange(Amount::ZERO),
            ])
        );
    }

    #[test]
    fn amount_bounds_are_inclusive() {
        let min = NewTransaction {
            amount: Amount::from_float(0.01),
            ..new_phone_tx()
        };
        assert!(min.validate().is_ok());

        let max = NewTransaction {
            amount: Amount::from_float(10_000_000.0),
            ..new_phone_tx()
        };
        assert!(max.validate().is_ok());

        let over = NewTransaction {
            amount: Amount::from_float(10_000_000.01),
            ..new_phone_tx()
        };
        assert!(over.validate().is_err());
    }

    #[test]
    fn into_transaction_starts_pending() {
        let id = Uuid::new_v4();
        let tx = new_phone_tx().into_transaction(id);
        assert_eq!(tx.id, id);
        assert!(tx.is_pending());
        assert_eq!(tx.recipient_qrcode, None);
    }
}
