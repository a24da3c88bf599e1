//! Runtime configuration, read from the environment.

use thiserror::Error;

use crate::Amount;
use crate::notify::NotifyTarget;
use crate::reconcile::ReconcileConfig;

pub const AMOUNT_TOLERANCE: &str = "PROMPTPAY_AMOUNT_TOLERANCE";
pub const ACCOUNT_MATCHING: &str = "PROMPTPAY_ACCOUNT_MATCHING";
pub const EASYSLIP_API_KEY: &str = "PROMPTPAY_EASYSLIP_API_KEY";
pub const TELEGRAM_TOKEN: &str = "PROMPTPAY_TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "PROMPTPAY_TELEGRAM_CHAT_ID";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Credentials and tunables of one merchant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub reconcile: ReconcileConfig,
    pub easyslip_api_key: Option<String>,
    /// Set only when both the bot token and the chat id are present.
    pub notify: Option<NotifyTarget>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys take their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(raw) = get(AMOUNT_TOLERANCE) {
            let tolerance: Amount = raw.parse().map_err(|e| ConfigError::Invalid {
                key: AMOUNT_TOLERANCE,
                reason: format!("{e}"),
            })?;
            if tolerance < Amount::ZERO {
                return Err(ConfigError::Invalid {
                    key: AMOUNT_TOLERANCE,
                    reason: "must not be negative".to_string(),
                });
            }
            config.reconcile.amount_tolerance = tolerance;
        }

        if let Some(raw) = get(ACCOUNT_MATCHING) {
            config.reconcile.account_matching =
                raw.parse().map_err(|e| ConfigError::Invalid {
                    key: ACCOUNT_MATCHING,
                    reason: format!("{e}"),
                })?;
        }

        config.easyslip_api_key = get(EASYSLIP_API_KEY);

        config.notify = match (get(TELEGRAM_TOKEN), get(TELEGRAM_CHAT_ID)) {
            (Some(bot_token), Some(chat_id)) => Some(NotifyTarget { bot_token, chat_id }),
            _ => None,
        };

        Ok(config)
    }
}
