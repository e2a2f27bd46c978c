//! Payment backend client
//!
//! `PaymentBackend` is the seam the payment flow talks to. `HttpPaymentClient`
//! implements it over HTTP with JSON-only replies, a deadline per attempt and
//! bounded retries.

use crate::error::NetworkError;
use crate::retry::RetryPolicy;
use crate::types::{
    CheckPaymentResponse, CreatePaymentRequest, CreatePaymentResponse, HealthResponse,
    PaymentCreated, PaymentStatus,
};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

/// Production backend
pub const DEFAULT_BASE_URL: &str = "https://matrix-backend.onrender.com";

/// Header carrying the per-request idempotency token
pub const IDEMPOTENCE_HEADER: &str = "Idempotence-Key";

/// Operations offered by the payment backend
#[async_trait]
pub trait PaymentBackend: Send + Sync {
    /// Create a payment and return where the user should pay
    async fn create_payment(&self, request: &CreatePaymentRequest) -> Result<PaymentCreated, NetworkError>;

    /// Look up a payment's current status
    async fn check_payment(&self, payment_id: &str) -> Result<PaymentStatus, NetworkError>;

    /// Probe the backend
    async fn health(&self) -> Result<HealthResponse, NetworkError>;
}

/// HTTP implementation of `PaymentBackend`
#[derive(Debug, Clone)]
pub struct HttpPaymentClient {
    client: Client,
    base: Url,
    policy: RetryPolicy,
}

impl HttpPaymentClient {
    /// Create a client for `base_url`
    ///
    /// # Errors
    /// `NetworkError::InvalidUrl` when `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, policy: RetryPolicy) -> Result<Self, NetworkError> {
        let invalid = |reason: String| NetworkError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(invalid("expected an http(s) URL".to_string()));
        }
        let client = Client::builder()
            .connect_timeout(policy.attempt_timeout())
            .build()
            .map_err(NetworkError::from)?;
        Ok(Self { client, base, policy })
    }

    /// Backend base URL
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Retry policy in use
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, NetworkError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| NetworkError::InvalidUrl {
                url: self.base.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Read a JSON reply, rejecting anything that is not JSON
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, NetworkError> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("json"));
    let body = response.text().await?;

    if !is_json {
        return Err(NetworkError::non_json(status.as_u16(), &body));
    }
    let value: serde_json::Value =
        serde_json::from_str(&body).map_err(|_| NetworkError::non_json(status.as_u16(), &body))?;

    if !status.is_success() {
        let message = value
            .get("error")
            .or_else(|| value.get("message"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(NetworkError::Status {
            status: status.as_u16(),
            message,
        });
    }
    serde_json::from_value(value).map_err(|e| NetworkError::Decode(e.to_string()))
}

fn rejected(error: Option<String>) -> NetworkError {
    NetworkError::Rejected(error.unwrap_or_else(|| "unknown error".to_string()))
}

#[async_trait]
impl PaymentBackend for HttpPaymentClient {
    async fn create_payment(&self, request: &CreatePaymentRequest) -> Result<PaymentCreated, NetworkError> {
        let url = self.endpoint(&["create-payment"])?;
        let idempotence_key = uuid::Uuid::new_v4().to_string();
        tracing::info!(service = %request.service_type, %idempotence_key, "creating payment");

        let (client, url, key) = (&self.client, &url, idempotence_key.as_str());
        let reply: CreatePaymentResponse = self
            .policy
            .run("create-payment", move || async move {
                let response = client
                    .post(url.clone())
                    .header(IDEMPOTENCE_HEADER, key)
                    .json(request)
                    .send()
                    .await?;
                decode(response).await
            })
            .await?;

        if !reply.success {
            return Err(rejected(reply.error));
        }
        match (reply.payment_id, reply.confirmation_url) {
            (Some(payment_id), Some(confirmation_url)) => {
                tracing::info!(%payment_id, "payment created");
                Ok(PaymentCreated {
                    payment_id,
                    confirmation_url,
                })
            }
            _ => Err(NetworkError::Decode(
                "reply lacks payment_id or confirmation_url".to_string(),
            )),
        }
    }

    async fn check_payment(&self, payment_id: &str) -> Result<PaymentStatus, NetworkError> {
        let url = self.endpoint(&["check-payment", payment_id])?;
        let (client, url) = (&self.client, &url);
        let reply: CheckPaymentResponse = self
            .policy
            .run("check-payment", move || async move {
                let response = client.get(url.clone()).send().await?;
                decode(response).await
            })
            .await?;

        if !reply.success {
            return Err(rejected(reply.error));
        }
        let status = PaymentStatus {
            status: reply.status.unwrap_or_else(|| "unknown".to_string()),
            paid: reply.paid,
            amount: reply.amount,
            metadata: reply.metadata,
        };
        tracing::debug!(payment_id, status = %status.status, paid = status.paid, "payment checked");
        Ok(status)
    }

    async fn health(&self) -> Result<HealthResponse, NetworkError> {
        let url = self.endpoint(&["health"])?;
        let (client, url) = (&self.client, &url);
        self.policy
            .run("health", move || async move {
                let response = client.get(url.clone()).send().await?;
                decode(response).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unusable_base_urls() {
        for url in ["not a url", "ftp://example.org", "mailto:someone@example.org"] {
            assert!(matches!(
                HttpPaymentClient::new(url, RetryPolicy::default()),
                Err(NetworkError::InvalidUrl { .. })
            ));
        }
    }

    #[test]
    fn endpoints_extend_the_base_path() {
        let client = HttpPaymentClient::new("https://host.test/api/", RetryPolicy::default()).unwrap();
        assert_eq!(
            client.endpoint(&["check-payment", "a/b"]).unwrap().as_str(),
            "https://host.test/api/check-payment/a%2Fb"
        );
        let client = HttpPaymentClient::new(DEFAULT_BASE_URL, RetryPolicy::default()).unwrap();
        assert_eq!(
            client.endpoint(&["health"]).unwrap().as_str(),
            "https://matrix-backend.onrender.com/health"
        );
    }
}
