//! Premium grant record and gate state machine
//!
//! ```text
//! Locked ──(payment confirmed, key recorded)──▶ Unlocked(key)
//!    ▲                                              │
//!    └──────────────(current key changes)───────────┘
//! ```

use crate::error::StateError;
use crate::key::MatrixKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status a grant must carry to unlock anything
pub const PAID_STATUS: &str = "paid";

/// Persisted proof of a confirmed payment for one matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumGrantRecord {
    /// Payment the grant came from
    pub payment_id: String,
    /// Payment status at the time of recording
    pub status: String,
    /// Matrix the payment was made for
    pub matrix_key: MatrixKey,
    /// When the grant was recorded
    pub granted_at: Option<DateTime<Utc>>,
}

impl PremiumGrantRecord {
    /// Paid grant recorded now
    #[must_use]
    pub fn paid(payment_id: impl Into<String>, matrix_key: MatrixKey) -> Self {
        Self {
            payment_id: payment_id.into(),
            status: PAID_STATUS.to_string(),
            matrix_key,
            granted_at: Some(Utc::now()),
        }
    }

    /// Check that this grant authorises `current`
    ///
    /// # Errors
    /// `StateError` naming the first failed condition.
    pub fn authorises(&self, current: &MatrixKey) -> Result<(), StateError> {
        if self.status != PAID_STATUS {
            return Err(StateError::NotPaid(self.status.clone()));
        }
        if self.matrix_key.is_empty() {
            return Err(StateError::CorruptRecord("grant has no matrix key".to_string()));
        }
        if &self.matrix_key != current {
            return Err(StateError::KeyMismatch {
                stored: self.matrix_key.to_string(),
                current: current.to_string(),
            });
        }
        Ok(())
    }
}

/// Unlock decision for the matrix on screen
///
/// True iff a grant exists, its status is exactly `paid`, it carries a
/// non-empty key, and that key equals `current`.
#[must_use]
pub fn is_premium_unlocked(grant: Option<&PremiumGrantRecord>, current: &MatrixKey) -> bool {
    grant.is_some_and(|g| g.authorises(current).is_ok())
}

/// State without payload, used by the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantState {
    /// Premium content hidden
    Locked,
    /// Premium content shown for one key
    Unlocked,
}

impl fmt::Display for GrantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => f.write_str("locked"),
            Self::Unlocked => f.write_str("unlocked"),
        }
    }
}

/// Gate state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// No valid grant
    Locked,
    /// Valid grant bound to a key
    Unlocked(MatrixKey),
}

impl GateState {
    /// Payload-free state
    #[must_use]
    pub fn kind(&self) -> GrantState {
        match self {
            Self::Locked => GrantState::Locked,
            Self::Unlocked(_) => GrantState::Unlocked,
        }
    }

    /// Key the gate is unlocked for
    #[must_use]
    pub fn key(&self) -> Option<&MatrixKey> {
        match self {
            Self::Locked => None,
            Self::Unlocked(key) => Some(key),
        }
    }

    /// Check if premium content for `current` may be shown
    #[must_use]
    pub fn allows(&self, current: &MatrixKey) -> bool {
        self.key() == Some(current)
    }
}

/// States reachable from `from`
#[must_use]
pub fn allowed_transitions(from: GrantState) -> Vec<GrantState> {
    match from {
        GrantState::Locked => vec![GrantState::Unlocked],
        GrantState::Unlocked => vec![GrantState::Locked, GrantState::Unlocked],
    }
}

/// Validate a state change
///
/// `Unlocked → Unlocked` is only allowed for the same key; moving a grant to
/// a different matrix must go through `Locked`.
///
/// # Errors
/// `StateError::IllegalTransition` when the change is not allowed.
pub fn validate_transition(from: &GateState, to: &GateState) -> Result<(), StateError> {
    let illegal = || StateError::IllegalTransition {
        from: from.kind(),
        to: to.kind(),
    };

    if !allowed_transitions(from.kind()).contains(&to.kind()) {
        return Err(illegal());
    }
    match (from, to) {
        (GateState::Unlocked(a), GateState::Unlocked(b)) if a != b => Err(illegal()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> MatrixKey {
        MatrixKey::from_stored(s)
    }

    #[test]
    fn paid_matching_grant_unlocks() {
        let current = key("personal|1990-05-15|Anna");
        let grant = PremiumGrantRecord::paid("pay-1", current.clone());
        assert!(is_premium_unlocked(Some(&grant), &current));
    }

    #[test]
    fn mismatched_key_stays_locked() {
        let grant = PremiumGrantRecord::paid("pay-1", key("personal|1990-05-15|Anna"));
        let other = key("personal|1990-05-16|Anna");
        assert!(!is_premium_unlocked(Some(&grant), &other));
        assert!(matches!(
            grant.authorises(&other),
            Err(StateError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn unpaid_or_keyless_grant_stays_locked() {
        let current = key("personal|1990-05-15|Anna");
        let mut grant = PremiumGrantRecord::paid("pay-1", current.clone());
        grant.status = "pending".to_string();
        assert!(!is_premium_unlocked(Some(&grant), &current));

        let keyless = PremiumGrantRecord::paid("pay-1", key(""));
        assert!(matches!(
            keyless.authorises(&key("")),
            Err(StateError::CorruptRecord(_))
        ));
        assert!(!is_premium_unlocked(None, &current));
    }

    #[test]
    fn locked_can_only_unlock() {
        assert!(validate_transition(&GateState::Locked, &GateState::Unlocked(key("k"))).is_ok());
        assert!(validate_transition(&GateState::Locked, &GateState::Locked).is_err());
    }

    #[test]
    fn unlocked_transitions() {
        let a = GateState::Unlocked(key("a"));
        assert!(validate_transition(&a, &GateState::Locked).is_ok());
        assert!(validate_transition(&a, &a.clone()).is_ok());
        assert_eq!(
            validate_transition(&a, &GateState::Unlocked(key("b"))),
            Err(StateError::IllegalTransition {
                from: GrantState::Unlocked,
                to: GrantState::Unlocked,
            })
        );
    }

    #[test]
    fn state_allows_only_its_key() {
        let state = GateState::Unlocked(key("a"));
        assert!(state.allows(&key("a")));
        assert!(!state.allows(&key("b")));
        assert!(!GateState::Locked.allows(&key("a")));
    }
}
