//! Recorded slip uploads, one JSON object per line.

use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

use crate::model::TransactionId;

#[derive(Debug, Error)]
pub enum JsonlError {
    #[error("failed to open uploads file: {0}")]
    Open(io::Error),

    #[error("line {line}: failed to read: {source}")]
    Read { line: usize, source: io::Error },

    #[error("line {line}: failed to parse upload: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
}

/// A slip uploaded for a transaction, with the provider's recorded answer.
#[derive(Debug, Clone, Deserialize)]
pub struct Upload {
    pub transaction_id: TransactionId,
    /// Name of the uploaded slip image; stands in for its bytes.
    pub slip: String,
    /// Provider response body for this slip.
    pub response: Value,
}

/// Read uploads from a JSON lines file. Blank lines are skipped.
pub fn read_uploads(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Upload, JsonlError>>, JsonlError> {
    let file = File::open(path).map_err(JsonlError::Open)?;

    Ok(BufReader::new(file)
        .lines()
        .enumerate()
        .filter_map(|(idx, result)| {
            let line = idx + 1;
            let text = match result {
                Ok(text) => text,
                Err(source) => return Some(Err(JsonlError::Read { line, source })),
            };
            if text.trim().is_empty() {
                return None;
            }
            Some(serde_json::from_str(&text).map_err(|source| JsonlError::Parse { line, source }))
        }))
}
