use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::amount::ParseAmountError;
use crate::model::{PaymentType, Transaction, TransactionId, TransactionStatus};
use crate::reconcile::Verdict;
use crate::service::ServiceError;

/// Errors that can occur when reading csv rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open csv file: {0}")]
    Open(csv::Error),

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: {source}")]
    Amount {
        line: usize,
        source: ParseAmountError,
    },
}

#[derive(Debug, Deserialize)]
struct InputRow {
    id: TransactionId,
    recipient_name_th: String,
    recipient_name_en: String,
    payment_type: PaymentType,
    target: String,
    amount: String,
    status: Option<TransactionStatus>,
    recipient_qrcode: Option<String>,
}

/// One verification result, as written to the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeRow {
    pub transaction: TransactionId,
    pub result: &'static str,
    pub category: String,
    pub reason: String,
}

impl OutcomeRow {
    pub fn new(transaction: TransactionId, result: &Result<Verdict, ServiceError>) -> Self {
        let (result, category, reason) = match result {
            Ok(Verdict::Approved(_)) => ("approved", String::new(), String::new()),
            Ok(Verdict::Rejected(rejection)) => (
                "rejected",
                rejection.category().to_string(),
                rejection.to_string(),
            ),
            Err(e) => ("error", String::new(), e.to_string()),
        };
        Self {
            transaction,
            result,
            category,
            reason,
        }
    }
}

/// Read transactions from a csv file
pub fn read_transactions(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Transaction, CsvError>>, CsvError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(CsvError::Open)?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            let amount = row
                .amount
                .parse()
                .map_err(|source| CsvError::Amount { line, source })?;
            Ok(Transaction {
                id: row.id,
                recipient_name_th: row.recipient_name_th,
                recipient_name_en: row.recipient_name_en,
                payment_type: row.payment_type,
                target: row.target,
                amount,
                status: row.status.unwrap_or_default(),
                recipient_qrcode: row.recipient_qrcode.filter(|q| !q.is_empty()),
                data: None,
            })
        }))
}

/// Write verification outcomes in csv format
pub fn write_outcomes(
    writer: impl io::Write,
    outcomes: impl IntoIterator<Item = OutcomeRow>,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    for row in outcomes {
        writer.serialize(&row)?;
    }

    writer.flush()?;
    Ok(())
}
