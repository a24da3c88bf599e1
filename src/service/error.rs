//! Error types for the slip service.

use thiserror::Error;

use crate::easyslip::ProviderError;
use crate::model::{TransactionId, TransactionStatus, ValidationError};
use crate::store::StoreError;

/// Failure to reach a verdict. Slip rejections are not errors; see
/// [`Verdict`](crate::reconcile::Verdict).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("transaction {0} not found")]
    NotFound(TransactionId),

    #[error("transaction {0} is {1}, not pending")]
    NotPending(TransactionId, TransactionStatus),

    #[error("merchant has no slip provider API key")]
    MissingApiKey,

    #[error("invalid transaction: {}", join(.0))]
    Invalid(Vec<ValidationError>),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
