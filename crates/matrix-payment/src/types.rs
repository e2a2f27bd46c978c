//! Wire types for the payment backend
//!
//! Field names follow the backend's snake_case JSON. `CalcData` is the one
//! exception: it is stored client-side in camelCase.

use chrono::{DateTime, Utc};
use matrix_gate::ServiceType;
use serde::{Deserialize, Serialize};

/// Report metadata sent with a payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    /// Page the payment was started from
    pub page: String,
    /// When the payment was started
    pub timestamp: DateTime<Utc>,
    /// Birth date, personal report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    /// Name, personal report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// First partner's birth date, compatibility report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner1_birthdate: Option<String>,
    /// Second partner's birth date, compatibility report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner2_birthdate: Option<String>,
}

impl UserData {
    /// Metadata for a personal report
    #[must_use]
    pub fn personal(birthdate: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            page: "personal".to_string(),
            timestamp: now,
            birthdate: Some(birthdate.into()),
            name: Some(name.into()),
            partner1_birthdate: None,
            partner2_birthdate: None,
        }
    }

    /// Metadata for a compatibility report
    #[must_use]
    pub fn compatibility(
        first: impl Into<String>,
        second: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            page: "compatibility".to_string(),
            timestamp: now,
            birthdate: None,
            name: None,
            partner1_birthdate: Some(first.into()),
            partner2_birthdate: Some(second.into()),
        }
    }
}

/// `POST /create-payment` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    /// Report being paid for
    pub service_type: ServiceType,
    /// Report metadata
    pub user_data: UserData,
    /// Where the provider sends the user afterwards
    pub return_url: String,
}

/// `POST /create-payment` reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatePaymentResponse {
    /// Backend accepted the request
    #[serde(default)]
    pub success: bool,
    /// Provider payment id
    #[serde(default)]
    pub payment_id: Option<String>,
    /// Page the user must visit to pay
    #[serde(default)]
    pub confirmation_url: Option<String>,
    /// Initial provider status
    #[serde(default)]
    pub status: Option<String>,
    /// Error text when `success` is false
    #[serde(default)]
    pub error: Option<String>,
}

/// A payment the user can now complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentCreated {
    /// Provider payment id
    pub payment_id: String,
    /// Page the user must visit to pay
    pub confirmation_url: String,
}

/// `GET /check-payment/{id}` reply
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CheckPaymentResponse {
    /// Backend found the payment
    #[serde(default)]
    pub success: bool,
    /// Provider status text
    #[serde(default)]
    pub status: Option<String>,
    /// Payment captured
    #[serde(default)]
    pub paid: bool,
    /// Amount, as reported
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    /// Metadata echoed back by the provider
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    /// Error text when `success` is false
    #[serde(default)]
    pub error: Option<String>,
}

/// Settled view of a payment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentStatus {
    /// Provider status text
    pub status: String,
    /// Payment captured
    pub paid: bool,
    /// Amount, as reported
    pub amount: Option<serde_json::Value>,
    /// Metadata echoed back by the provider
    pub metadata: Option<serde_json::Value>,
}

/// `GET /health` reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` when the backend is up
    pub status: String,
    /// Server time, if sent
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthResponse {
    /// Check if the backend reported itself healthy
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Form inputs saved before redirecting to the provider
///
/// Restored on return so the report can be recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcData {
    /// Report being paid for
    pub service_type: ServiceType,
    /// Report inputs
    pub user_data: UserData,
}
