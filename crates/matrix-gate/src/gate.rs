//! Premium gate over a client store
//!
//! The gate owns the grant fields in storage. Grant problems never surface as
//! failures to the caller: a grant that does not authorise the current matrix
//! is cleared and the gate reports `Locked`.

use crate::error::{GateError, StateError, StoreError};
use crate::grant::{validate_transition, GateState, PremiumGrantRecord};
use crate::key::MatrixKey;
use crate::store::{ClientStore, StorageKey};
use chrono::{DateTime, Utc};

/// Storage names holding the grant
pub const GRANT_KEYS: [StorageKey; 5] = [
    StorageKey::PremiumAccess,
    StorageKey::PremiumStatus,
    StorageKey::PremiumPaymentId,
    StorageKey::PremiumMatrixKey,
    StorageKey::PremiumAccessDate,
];

/// Premium gate
#[derive(Debug)]
pub struct PremiumGate<S> {
    store: S,
}

impl<S: ClientStore> PremiumGate<S> {
    /// Wrap a store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Underlying store, mutable
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Release the store
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Read the grant record
    ///
    /// `Ok(None)` when no grant is active.
    ///
    /// # Errors
    /// `GateError::State` for a record with missing or unreadable fields,
    /// `GateError::Store` when storage fails.
    pub fn load_grant(&self) -> Result<Option<PremiumGrantRecord>, GateError> {
        if self.store.get(StorageKey::PremiumAccess)?.as_deref() != Some("true") {
            return Ok(None);
        }

        let field = |key: StorageKey| -> Result<String, GateError> {
            self.store
                .get(key)?
                .ok_or_else(|| StateError::CorruptRecord(format!("{key} is missing")).into())
        };

        let granted_at = match self.store.get(StorageKey::PremiumAccessDate)? {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(&raw)
                    .map_err(|e| StateError::CorruptRecord(format!("premiumAccessDate: {e}")))?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        Ok(Some(PremiumGrantRecord {
            payment_id: field(StorageKey::PremiumPaymentId)?,
            status: field(StorageKey::PremiumStatus)?,
            matrix_key: MatrixKey::from_stored(field(StorageKey::PremiumMatrixKey)?),
            granted_at,
        }))
    }

    /// Current state, treating any unusable record as `Locked`
    pub fn state(&self) -> GateState {
        match self.load_grant() {
            Ok(Some(grant)) if grant.authorises(&grant.matrix_key).is_ok() => {
                GateState::Unlocked(grant.matrix_key)
            }
            Ok(_) => GateState::Locked,
            Err(e) => {
                tracing::warn!(error = %e, "unreadable grant treated as locked");
                GateState::Locked
            }
        }
    }

    /// Check if premium content for `current` may be shown
    pub fn is_unlocked(&self, current: &MatrixKey) -> bool {
        self.state().allows(current)
    }

    /// Record a confirmed payment
    ///
    /// # Errors
    /// `GateError::State` when the grant is not paid, has no key, or would
    /// move an active grant to another matrix; `GateError::Store` when
    /// storage fails.
    pub fn unlock(&mut self, grant: &PremiumGrantRecord) -> Result<(), GateError> {
        grant.authorises(&grant.matrix_key)?;
        let target = GateState::Unlocked(grant.matrix_key.clone());
        validate_transition(&self.state(), &target)?;

        let granted_at = grant.granted_at.unwrap_or_else(Utc::now);
        self.store.set(StorageKey::PremiumStatus, &grant.status)?;
        self.store.set(StorageKey::PremiumPaymentId, &grant.payment_id)?;
        self.store.set(StorageKey::PremiumMatrixKey, grant.matrix_key.as_str())?;
        self.store
            .set(StorageKey::PremiumAccessDate, &granted_at.to_rfc3339())?;
        self.store.set(StorageKey::PremiumAccess, "true")?;

        tracing::info!(
            payment_id = %grant.payment_id,
            matrix_key = %grant.matrix_key,
            "premium access granted"
        );
        Ok(())
    }

    /// Clear the grant
    ///
    /// # Errors
    /// `StoreError` when storage fails.
    pub fn lock(&mut self) -> Result<(), StoreError> {
        self.store.remove_all(&GRANT_KEYS)
    }

    /// Clear the grant unless it authorises `current`
    ///
    /// Run before every calculation so a grant for one matrix never unlocks
    /// another. Returns the resulting state.
    ///
    /// # Errors
    /// `StoreError` when storage fails.
    pub fn reset_if_key_mismatch(&mut self, current: &MatrixKey) -> Result<GateState, StoreError> {
        let problem = match self.load_grant() {
            Ok(None) => return Ok(GateState::Locked),
            Ok(Some(grant)) => match grant.authorises(current) {
                Ok(()) => return Ok(GateState::Unlocked(grant.matrix_key)),
                Err(e) => e,
            },
            Err(GateError::State(e)) => e,
            Err(GateError::Store(e)) => return Err(e),
        };

        tracing::info!(reason = %problem, current = %current, "premium grant reset");
        self.lock()?;
        Ok(GateState::Locked)
    }
}
