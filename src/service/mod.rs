//! Slip verification service.
//!
//! Drives one upload through the collaborators: look the transaction up,
//! have the provider read the slip, reconcile, persist an approval, then
//! notify the merchant. Only the persisted state change is part of the
//! outcome; the notification is best effort.

use chrono::Utc;
use tracing::{info, warn};

use crate::config::Config;
use crate::easyslip::SlipVerifier;
use crate::model::{NewTransaction, Transaction, TransactionId};
use crate::notify::{self, Notifier};
use crate::reconcile::{Reconciler, Rejection, STATUS_OK, Verdict};
use crate::store::{StoreError, TransactionStore};

mod error;
pub use error::ServiceError;

pub struct SlipService<S, V, N> {
    store: S,
    verifier: V,
    notifier: N,
    reconciler: Reconciler,
    config: Config,
}

/// Public API
impl<S, V, N> SlipService<S, V, N>
where
    S: TransactionStore,
    V: SlipVerifier,
    N: Notifier,
{
    pub fn new(store: S, verifier: V, notifier: N, config: Config) -> Self {
        Self {
            store,
            verifier,
            notifier,
            reconciler: Reconciler::new(config.reconcile),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Validate and store a new pending transaction, then announce it.
    pub async fn create(
        &self,
        id: TransactionId,
        new: NewTransaction,
    ) -> Result<Transaction, ServiceError> {
        new.validate().map_err(ServiceError::Invalid)?;

        let transaction = new.into_transaction(id);
        self.store.insert(transaction.clone()).await?;
        info!(transaction = %id, amount = %transaction.amount, "transaction created");

        let message = notify::new_transaction_message(&transaction, Utc::now());
        self.send_notification(id, &message, None).await;

        Ok(transaction)
    }

    /// Verify an uploaded slip image against a pending transaction.
    ///
    /// Business rejections come back as `Ok(Verdict::Rejected)`; `Err` is
    /// reserved for missing records, configuration and infrastructure.
    pub async fn verify_slip(
        &self,
        id: TransactionId,
        image: &[u8],
    ) -> Result<Verdict, ServiceError> {
        let transaction = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))?;

        let api_key = self
            .config
            .easyslip_api_key
            .as_deref()
            .ok_or(ServiceError::MissingApiKey)?;

        if !transaction.is_pending() {
            return Err(ServiceError::NotPending(id, transaction.status));
        }

        let ocr = self.verifier.verify(image, api_key).await?;

        let payload_already_used = match ocr.payload.as_deref() {
            Some(payload) if ocr.status_code == STATUS_OK && !payload.is_empty() => self
                .store
                .find_completed_by_payload(payload)
                .await?
                .is_some(),
            _ => false,
        };

        let verdict = self
            .reconciler
            .reconcile(&transaction, &ocr, payload_already_used);
        let approval = match verdict {
            Verdict::Approved(approval) => approval,
            Verdict::Rejected(rejection) => {
                Self::log_rejection(id, &rejection);
                return Ok(Verdict::Rejected(rejection));
            }
        };

        match self
            .store
            .mark_completed(id, &approval.payload, approval.data.clone())
            .await
        {
            Ok(()) => {}
            // lost a race with another upload of the same slip
            Err(StoreError::PayloadConflict(_)) => {
                let rejection = Rejection::Replay;
                Self::log_rejection(id, &rejection);
                return Ok(Verdict::Rejected(rejection));
            }
            Err(e) => return Err(e.into()),
        }
        info!(transaction = %id, payload = %approval.payload, "slip approved");

        let message = notify::slip_verified_message(&transaction, Utc::now());
        self.send_notification(id, &message, Some(image)).await;

        Ok(Verdict::Approved(approval))
    }

    /// Cancel a pending transaction.
    pub async fn cancel(&self, id: TransactionId) -> Result<(), ServiceError> {
        let transaction = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))?;

        if !transaction.is_pending() {
            return Err(ServiceError::NotPending(id, transaction.status));
        }

        self.store.mark_cancelled(id).await?;
        info!(transaction = %id, "transaction cancelled");
        Ok(())
    }
}

/// Private API
impl<S, V, N> SlipService<S, V, N>
where
    S: TransactionStore,
    V: SlipVerifier,
    N: Notifier,
{
    fn log_rejection(id: TransactionId, rejection: &Rejection) {
        info!(
            transaction = %id,
            category = %rejection.category(),
            reason = %rejection,
            "slip rejected"
        );
    }

    /// Send if a target is configured. Failures are logged, never returned.
    async fn send_notification(&self, id: TransactionId, message: &str, photo: Option<&[u8]>) {
        let Some(target) = &self.config.notify else {
            return;
        };

        if !self.notifier.notify(target, message, photo).await {
            warn!(transaction = %id, "failed to send notification");
        }
    }
}
