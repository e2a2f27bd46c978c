//! Payment flow
//!
//! Binds one payment to exactly one matrix key:
//!
//! 1. `start` records the key being paid for, then creates the payment
//! 2. the user pays at the provider and returns
//! 3. `complete` checks the payment and unlocks the gate, but only when it is
//!    paid and the recorded key equals the key of the report now shown

use crate::client::PaymentBackend;
use crate::error::PaymentError;
use crate::types::{CalcData, CreatePaymentRequest, PaymentCreated};
use matrix_gate::{ClientStore, MatrixKey, PremiumGate, PremiumGrantRecord, StorageKey, StoreError};

/// Storage entries written before a payment is created
pub const PENDING_KEYS: [StorageKey; 3] = [
    StorageKey::PaymentMatrixKeyPending,
    StorageKey::PaymentCalcData,
    StorageKey::PaymentReturnUrl,
];

/// Result of checking a pending payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Not paid yet; pending entries are kept
    NotPaid {
        /// Provider status text
        status: String,
    },
    /// Paid, but for a different report than the one shown
    KeyMismatch {
        /// Key the payment was made for
        pending: Option<MatrixKey>,
    },
    /// Gate unlocked for this key
    Unlocked(MatrixKey),
}

/// Payment flow over a backend and a premium gate
#[derive(Debug)]
pub struct PaymentFlow<B, S> {
    backend: B,
    gate: PremiumGate<S>,
}

impl<B: PaymentBackend, S: ClientStore> PaymentFlow<B, S> {
    /// Create a flow
    pub fn new(backend: B, gate: PremiumGate<S>) -> Self {
        Self { backend, gate }
    }

    /// Backend in use
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Premium gate
    pub fn gate(&self) -> &PremiumGate<S> {
        &self.gate
    }

    /// Premium gate, mutable
    pub fn gate_mut(&mut self) -> &mut PremiumGate<S> {
        &mut self.gate
    }

    /// Release the backend and gate
    pub fn into_parts(self) -> (B, PremiumGate<S>) {
        (self.backend, self.gate)
    }

    /// Create a payment for the report identified by `key`
    ///
    /// # Errors
    /// `PaymentError::Network` when the backend call fails; pending entries
    /// are cleared first. `PaymentError::Store` when storage fails.
    pub async fn start(
        &mut self,
        calc: &CalcData,
        key: &MatrixKey,
        return_url: &str,
    ) -> Result<PaymentCreated, PaymentError> {
        let calc_json = serde_json::to_string(calc)?;
        let store = self.gate.store_mut();
        store.set(StorageKey::PaymentMatrixKeyPending, key.as_str())?;
        store.set(StorageKey::PaymentCalcData, &calc_json)?;
        store.set(StorageKey::PaymentReturnUrl, return_url)?;

        let request = CreatePaymentRequest {
            service_type: calc.service_type,
            user_data: calc.user_data.clone(),
            return_url: return_url.to_string(),
        };

        match self.backend.create_payment(&request).await {
            Ok(created) => {
                self.gate
                    .store_mut()
                    .set(StorageKey::CurrentPaymentId, &created.payment_id)?;
                tracing::info!(payment_id = %created.payment_id, matrix_key = %key, "payment started");
                Ok(created)
            }
            Err(err) => {
                tracing::warn!(error = %err, matrix_key = %key, "payment creation failed");
                self.gate.store_mut().remove_all(&PENDING_KEYS)?;
                Err(err.into())
            }
        }
    }

    /// Check the pending payment and unlock the report shown as `current`
    ///
    /// # Errors
    /// `PaymentError::NoPendingPayment` when no payment was started,
    /// `PaymentError::Network` when the check fails, `PaymentError::Gate` or
    /// `PaymentError::Store` when the grant cannot be written.
    pub async fn complete(&mut self, current: &MatrixKey) -> Result<PaymentOutcome, PaymentError> {
        let payment_id = self
            .gate
            .store()
            .get(StorageKey::CurrentPaymentId)?
            .filter(|id| !id.is_empty())
            .ok_or(PaymentError::NoPendingPayment)?;

        let status = self.backend.check_payment(&payment_id).await?;
        if !status.paid {
            tracing::info!(%payment_id, status = %status.status, "payment not completed yet");
            return Ok(PaymentOutcome::NotPaid {
                status: status.status,
            });
        }

        let pending = self.pending_key()?;
        if pending.as_ref() != Some(current) {
            tracing::warn!(
                %payment_id,
                pending = ?pending.as_ref().map(MatrixKey::as_str),
                current = %current,
                "paid for a different report, not unlocking"
            );
            return Ok(PaymentOutcome::KeyMismatch { pending });
        }

        self.gate.reset_if_key_mismatch(current)?;
        self.gate
            .unlock(&PremiumGrantRecord::paid(payment_id, current.clone()))?;

        let store = self.gate.store_mut();
        store.remove(StorageKey::CurrentPaymentId)?;
        store.remove_all(&PENDING_KEYS)?;
        Ok(PaymentOutcome::Unlocked(current.clone()))
    }

    /// Key the pending payment was started for
    ///
    /// # Errors
    /// `StoreError` when storage fails.
    pub fn pending_key(&self) -> Result<Option<MatrixKey>, StoreError> {
        Ok(self
            .gate
            .store()
            .get(StorageKey::PaymentMatrixKeyPending)?
            .filter(|k| !k.is_empty())
            .map(MatrixKey::from_stored))
    }

    /// Form inputs saved by `start`
    ///
    /// # Errors
    /// `PaymentError::CalcData` when the saved JSON is unreadable,
    /// `PaymentError::Store` when storage fails.
    pub fn restore_calc_data(&self) -> Result<Option<CalcData>, PaymentError> {
        match self.gate.store().get(StorageKey::PaymentCalcData)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Return URL saved by `start`
    ///
    /// # Errors
    /// `StoreError` when storage fails.
    pub fn return_url(&self) -> Result<Option<String>, StoreError> {
        self.gate.store().get(StorageKey::PaymentReturnUrl)
    }
}
