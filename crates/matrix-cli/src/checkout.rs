//! Payment commands

use anyhow::{anyhow, Context};
use chrono::{DateTime, NaiveDate, Utc};
use matrix_gate::{ClientStore, GateState, MatrixInputs, MatrixKey, ServiceType, StorageKey};
use matrix_payment::{CalcData, PaymentBackend, PaymentCreated, PaymentFlow, PaymentOutcome, UserData};
use matrix_points::BirthInput;
use serde::Serialize;
use std::fmt;

/// Report a payment is made for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayTarget {
    /// Personal report
    Personal {
        /// Birth date, `YYYY-MM-DD`
        date: String,
        /// Name
        name: String,
    },
    /// Compatibility report
    Compatibility {
        /// First partner's birth date
        first: String,
        /// Second partner's birth date
        second: String,
    },
}

impl PayTarget {
    /// Validate the inputs and derive the key and saved form data
    ///
    /// # Errors
    /// `ValidationError` for bad input.
    pub fn prepare(&self, today: NaiveDate, now: DateTime<Utc>) -> anyhow::Result<(MatrixKey, CalcData)> {
        let prepared = match self {
            Self::Personal { date, name } => {
                let input = BirthInput::parse(date, Some(name), today)?;
                let calc = CalcData {
                    service_type: ServiceType::Personal,
                    user_data: UserData::personal(
                        input.iso_date(),
                        input.name().unwrap_or_default(),
                        now,
                    ),
                };
                (MatrixKey::personal(&input), calc)
            }
            Self::Compatibility { first, second } => {
                let first = BirthInput::parse(first, None, today)?;
                let second = BirthInput::parse(second, None, today)?;
                let calc = CalcData {
                    service_type: ServiceType::Compatibility,
                    user_data: UserData::compatibility(first.iso_date(), second.iso_date(), now),
                };
                (MatrixKey::compatibility(&first, &second), calc)
            }
        };
        Ok(prepared)
    }
}

/// Key of the report described by saved form data
///
/// # Errors
/// When the saved data lacks a field its service needs.
pub fn key_for(calc: &CalcData) -> anyhow::Result<MatrixKey> {
    let data = &calc.user_data;
    let missing = |field: &str| anyhow!("saved calculation data has no {field}");
    let inputs = match calc.service_type {
        ServiceType::Personal => MatrixInputs::Personal {
            date: data.birthdate.as_deref().ok_or_else(|| missing("birthdate"))?,
            name: data.name.as_deref().ok_or_else(|| missing("name"))?,
        },
        ServiceType::Compatibility => MatrixInputs::Compatibility {
            first: data
                .partner1_birthdate
                .as_deref()
                .ok_or_else(|| missing("partner1_birthdate"))?,
            second: data
                .partner2_birthdate
                .as_deref()
                .ok_or_else(|| missing("partner2_birthdate"))?,
        },
    };
    Ok(MatrixKey::build(&inputs))
}

/// Start a payment for `target`
///
/// # Errors
/// Validation, storage or backend failures.
pub async fn pay<B: PaymentBackend, S: ClientStore>(
    flow: &mut PaymentFlow<B, S>,
    target: &PayTarget,
    return_url: &str,
    today: NaiveDate,
) -> anyhow::Result<PaymentCreated> {
    let (key, calc) = target.prepare(today, Utc::now())?;
    let created = flow
        .start(&calc, &key, return_url)
        .await
        .context("payment could not be started")?;
    Ok(created)
}

/// Check the stored payment and unlock the report being shown
///
/// `shown` is the report on screen; without one the report restored from
/// the saved form data is used.
///
/// # Errors
/// When nothing is pending or the check fails.
pub async fn confirm<B: PaymentBackend, S: ClientStore>(
    flow: &mut PaymentFlow<B, S>,
    shown: Option<&PayTarget>,
    today: NaiveDate,
) -> anyhow::Result<PaymentOutcome> {
    let key = match shown {
        Some(target) => target.prepare(today, Utc::now())?.0,
        None => {
            let calc = flow
                .restore_calc_data()?
                .ok_or_else(|| anyhow!("no saved calculation data; start with `matrix pay`"))?;
            key_for(&calc)?
        }
    };
    let outcome = flow
        .complete(&key)
        .await
        .context("payment could not be confirmed")?;
    Ok(outcome)
}

/// Stored payment and grant state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusOutput {
    /// Report with premium access, if any
    pub unlocked_key: Option<MatrixKey>,
    /// Payment awaiting confirmation
    pub pending_payment_id: Option<String>,
    /// Report the pending payment is for
    pub pending_key: Option<MatrixKey>,
}

impl StatusOutput {
    /// Read from a payment flow
    ///
    /// # Errors
    /// `StoreError` when storage fails.
    pub fn read<B: PaymentBackend, S: ClientStore>(flow: &PaymentFlow<B, S>) -> anyhow::Result<Self> {
        let unlocked_key = match flow.gate().state() {
            GateState::Unlocked(key) => Some(key),
            GateState::Locked => None,
        };
        Ok(Self {
            unlocked_key,
            pending_payment_id: flow.gate().store().get(StorageKey::CurrentPaymentId)?,
            pending_key: flow.pending_key()?,
        })
    }
}

impl fmt::Display for StatusOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unlocked_key {
            Some(key) => writeln!(f, "premium: unlocked for {key}")?,
            None => writeln!(f, "premium: locked")?,
        }
        match (&self.pending_payment_id, &self.pending_key) {
            (Some(id), Some(key)) => write!(f, "pending payment: {id} for {key}"),
            (Some(id), None) => write!(f, "pending payment: {id}"),
            (None, _) => write!(f, "pending payment: none"),
        }
    }
}

/// One-line description of a confirmation outcome
#[must_use]
pub fn describe_outcome(outcome: &PaymentOutcome) -> String {
    match outcome {
        PaymentOutcome::NotPaid { status } => {
            format!("payment not completed yet (status: {status}); run `matrix confirm` again later")
        }
        PaymentOutcome::KeyMismatch { pending } => match pending {
            Some(key) => format!("payment belongs to another report ({key}); premium stays locked"),
            None => "payment has no recorded report; premium stays locked".to_string(),
        },
        PaymentOutcome::Unlocked(key) => format!("premium unlocked for {key}"),
    }
}
