//! EasySlip, the slip OCR provider.
//!
//! Only the response shape is handled here; the HTTP call itself sits behind
//! [`SlipVerifier`].

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::Amount;
use crate::model::{OcrResult, ProxyType};

/// Infrastructure failure talking to the provider. Never a slip rejection.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("slip provider unreachable: {0}")]
    Transport(String),

    #[error("slip provider returned status {0}")]
    Status(u16),

    #[error("malformed slip provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Reads a slip image and reports what was paid to whom.
pub trait SlipVerifier: Send + Sync {
    fn verify(
        &self,
        image: &[u8],
        api_key: &str,
    ) -> impl Future<Output = Result<OcrResult, ProviderError>> + Send;
}

#[derive(Debug, Deserialize)]
struct Response {
    status: u16,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SlipData {
    payload: Option<String>,
    amount: Option<SlipAmount>,
    receiver: Option<Party>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SlipAmount {
    amount: Option<Amount>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Party {
    account: Option<PartyAccount>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartyAccount {
    name: Option<PartyName>,
    proxy: Option<Proxy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartyName {
    th: Option<String>,
    en: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Proxy {
    #[serde(rename = "type")]
    kind: Option<ProxyType>,
    account: Option<String>,
}

/// Decode a provider response body.
///
/// 200 carries slip data; 400 and 401 are passed through for the
/// reconciler to reject. Any other status is a provider failure.
pub fn parse_response(body: &str) -> Result<OcrResult, ProviderError> {
    let response: Response = serde_json::from_str(body)?;

    match response.status {
        200 => {}
        400 | 401 => {
            return Ok(OcrResult {
                status_code: response.status,
                ..OcrResult::default()
            });
        }
        other => return Err(ProviderError::Status(other)),
    }

    let raw = response.data.unwrap_or(Value::Null);
    let data: SlipData = match &raw {
        Value::Null => SlipData::default(),
        value => SlipData::deserialize(value)?,
    };

    let account = data.receiver.and_then(|r| r.account).unwrap_or_default();
    let name = account.name.unwrap_or_default();
    let proxy = account.proxy.unwrap_or_default();

    Ok(OcrResult {
        status_code: response.status,
        payload: data.payload,
        amount: data.amount.and_then(|a| a.amount),
        receiver_proxy_type: proxy.kind,
        receiver_proxy_account: proxy.account,
        receiver_name_th: name.th,
        receiver_name_en: name.en,
        raw,
    })
}

/// Replays recorded provider responses, keyed by slip image.
#[derive(Debug, Default)]
pub struct RecordedVerifier {
    responses: RwLock<HashMap<Vec<u8>, String>>,
}

impl RecordedVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the response body returned for `image`.
    pub async fn record(&self, image: impl Into<Vec<u8>>, body: impl Into<String>) {
        self.responses
            .write()
            .await
            .insert(image.into(), body.into());
    }
}

impl SlipVerifier for RecordedVerifier {
    async fn verify(&self, image: &[u8], _api_key: &str) -> Result<OcrResult, ProviderError> {
        let responses = self.responses.read().await;
        let body = responses
            .get(image)
            .ok_or_else(|| ProviderError::Transport("no recorded response for slip".to_string()))?;
        parse_response(body)
    }
}
