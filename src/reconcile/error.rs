//! Reasons a slip is turned down.

use std::fmt;
use thiserror::Error;

use crate::Amount;
use crate::model::{PaymentType, ProxyType};

/// A business-rule rejection. The message is the one shown to the payer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("API Key ไม่ถูกต้อง โปรดติดต่อ ผู้ออกบิล")]
    InvalidApiKey,

    #[error("สลิปนี้ถูกใช้ไปแล้ว กรุณาใช้สลิปใหม่")]
    Replay,

    #[error("การตรวจสอบสลิปล้มเหลว กรุณาตรวจสอบสลิปและลองใหม่")]
    Malformed,

    #[error("จำนวนเงินไม่ตรงกัน คาดหวัง: {expected} บาท แต่ได้รับ: {actual} บาท")]
    Amount { expected: Amount, actual: Amount },

    #[error(
        "ชนิดบัญชีไม่ตรงกัน คาดหวัง: {expected} แต่ได้รับ: {}",
        .actual.map(|t| t.as_str()).unwrap_or("-")
    )]
    ProxyType {
        expected: PaymentType,
        actual: Option<ProxyType>,
    },

    #[error("บัญชีไม่ตรงกัน คาดหวัง: {expected} แต่ได้รับ: {actual}")]
    Account { expected: String, actual: String },

    #[error("ชื่อไม่ตรงกัน คาดหวัง: {expected} แต่ได้รับ: {actual}")]
    Name { expected: String, actual: String },
}

/// Machine-readable kind of a [`Rejection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionCategory {
    InvalidApiKey,
    Replay,
    Malformed,
    Amount,
    ProxyType,
    Account,
    Name,
}

impl Rejection {
    pub fn category(&self) -> RejectionCategory {
        match self {
            Rejection::InvalidApiKey => RejectionCategory::InvalidApiKey,
            Rejection::Replay => RejectionCategory::Replay,
            Rejection::Malformed => RejectionCategory::Malformed,
            Rejection::Amount { .. } => RejectionCategory::Amount,
            Rejection::ProxyType { .. } => RejectionCategory::ProxyType,
            Rejection::Account { .. } => RejectionCategory::Account,
            Rejection::Name { .. } => RejectionCategory::Name,
        }
    }
}

impl fmt::Display for RejectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RejectionCategory::InvalidApiKey => "invalid_api_key",
            RejectionCategory::Replay => "replay",
            RejectionCategory::Malformed => "malformed",
            RejectionCategory::Amount => "amount",
            RejectionCategory::ProxyType => "proxy_type",
            RejectionCategory::Account => "account",
            RejectionCategory::Name => "name",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_message_shows_both_sides() {
        let rejection = Rejection::Amount {
            expected: Amount::from_float(100.0),
            actual: Amount::from_float(100.02),
        };
        assert_eq!(
            rejection.to_string(),
            "จำนวนเงินไม่ตรงกัน คาดหวัง: 100.00 บาท แต่ได้รับ: 100.02 บาท"
        );
    }

    #[test]
    fn proxy_type_message_handles_missing_type() {
        let missing = Rejection::ProxyType {
            expected: PaymentType::Msisdn,
            actual: None,
        };
        assert_eq!(
            missing.to_string(),
            "ชนิดบัญชีไม่ตรงกัน คาดหวัง: MSISDN แต่ได้รับ: -"
        );

        let other = Rejection::ProxyType {
            expected: PaymentType::NatId,
            actual: Some(ProxyType::EWalletId),
        };
        assert_eq!(
            other.to_string(),
            "ชนิดบัญชีไม่ตรงกัน คาดหวัง: NATID แต่ได้รับ: EWALLETID"
        );
    }

    #[test]
    fn categories_render_snake_case() {
        assert_eq!(Rejection::Replay.category().to_string(), "replay");
        assert_eq!(
            Rejection::InvalidApiKey.category().to_string(),
            "invalid_api_key"
        );
        let name = Rejection::Name {
            expected: "a".into(),
            actual: "b".into(),
        };
        assert_eq!(name.category(), RejectionCategory::Name);
    }
}
