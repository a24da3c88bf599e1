//! Transaction storage.

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::model::{Transaction, TransactionId, TransactionStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transaction {0} not found")]
    NotFound(TransactionId),

    #[error("transaction {0} is {1}, not pending")]
    NotPending(TransactionId, TransactionStatus),

    #[error("transaction {0} already exists")]
    Duplicate(TransactionId),

    /// Uniqueness violation on the completed slip payload.
    #[error("slip payload {0} is already recorded on a completed transaction")]
    PayloadConflict(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Where transactions live between creation and verification.
///
/// `mark_completed` must be atomic per payload: two concurrent completions
/// with the same payload cannot both succeed.
pub trait TransactionStore: Send + Sync {
    fn insert(&self, transaction: Transaction)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    fn find_by_id(
        &self,
        id: TransactionId,
    ) -> impl Future<Output = Result<Option<Transaction>, StoreError>> + Send;

    fn find_completed_by_payload(
        &self,
        payload: &str,
    ) -> impl Future<Output = Result<Option<Transaction>, StoreError>> + Send;

    /// Move a pending transaction to completed, recording the slip payload
    /// and the provider data.
    fn mark_completed(
        &self,
        id: TransactionId,
        payload: &str,
        data: Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn mark_cancelled(&self, id: TransactionId)
    -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[derive(Debug, Default)]
struct Tables {
    transactions: HashMap<TransactionId, Transaction>,
    /// Payload -> completed transaction, the uniqueness index.
    completed_payloads: HashMap<String, TransactionId>,
}

/// In-process store guarded by a single lock, so completion is check-and-set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transactions.
    pub async fn len(&self) -> usize {
        self.tables.read().await.transactions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl TransactionStore for InMemoryStore {
    async fn insert(&self, transaction: Transaction) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.transactions.contains_key(&transaction.id) {
            return Err(StoreError::Duplicate(transaction.id));
        }

        if transaction.status == TransactionStatus::Completed {
            if let Some(payload) = transaction.recipient_qrcode.clone().filter(|p| !p.is_empty()) {
                if tables.completed_payloads.contains_key(&payload) {
                    return Err(StoreError::PayloadConflict(payload));
                }
                tables.completed_payloads.insert(payload, transaction.id);
            }
        }

        tables.transactions.insert(transaction.id, transaction);
        Ok(())
    }

    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        Ok(self.tables.read().await.transactions.get(&id).cloned())
    }

    async fn find_completed_by_payload(
        &self,
        payload: &str,
    ) -> Result<Option<Transaction>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .completed_payloads
            .get(payload)
            .and_then(|id| tables.transactions.get(id))
            .cloned())
    }

    async fn mark_completed(
        &self,
        id: TransactionId,
        payload: &str,
        data: Value,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let Tables {
            transactions,
            completed_payloads,
        } = &mut *tables;

        let transaction = transactions.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if !transaction.is_pending() {
            return Err(StoreError::NotPending(id, transaction.status));
        }
        // an empty payload identifies nothing and is not indexed
        let payload = (!payload.is_empty()).then(|| payload.to_string());
        if let Some(payload) = &payload {
            if completed_payloads.contains_key(payload) {
                return Err(StoreError::PayloadConflict(payload.clone()));
            }
            completed_payloads.insert(payload.clone(), id);
        }

        transaction.status = TransactionStatus::Completed;
        transaction.recipient_qrcode = payload;
        transaction.data = Some(data);

        Ok(())
    }

    async fn mark_cancelled(&self, id: TransactionId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let transaction = tables
            .transactions
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        if !transaction.is_pending() {
            return Err(StoreError::NotPending(id, transaction.status));
        }

        transaction.status = TransactionStatus::Cancelled;
        Ok(())
    }
}
