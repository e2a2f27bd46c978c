use matrix_payment::{
    CreatePaymentRequest, HttpPaymentClient, NetworkError, PaymentBackend, RetryPolicy,
};
use matrix_test_utils::sample_calc_data;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use warp::http::StatusCode;
use warp::Filter;

macro_rules! serve {
    ($routes:expr) => {{
        let (addr, server) = warp::serve($routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        format!("http://{addr}")
    }};
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy::new()
        .with_initial_backoff(Duration::from_millis(1))
        .with_max_backoff(Duration::from_millis(5))
        .with_attempt_timeout(Duration::from_secs(2))
}

fn request() -> CreatePaymentRequest {
    let calc = sample_calc_data();
    CreatePaymentRequest {
        service_type: calc.service_type,
        user_data: calc.user_data,
        return_url: "https://site.test/personal".to_string(),
    }
}

#[tokio::test]
async fn test_create_payment_retries_5xx_with_same_idempotence_key() {
    let hits = Arc::new(AtomicUsize::new(0));
    let keys = Arc::new(Mutex::new(Vec::new()));
    let bodies = Arc::new(Mutex::new(Vec::new()));

    let route = {
        let (hits, keys, bodies) = (hits.clone(), keys.clone(), bodies.clone());
        warp::post()
            .and(warp::path!("create-payment"))
            .and(warp::header::<String>("idempotence-key"))
            .and(warp::body::json())
            .map(move |key: String, body: Value| {
                keys.lock().unwrap().push(key);
                bodies.lock().unwrap().push(body);
                if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                    warp::reply::with_status(
                        warp::reply::json(&json!({"error": "warming up"})),
                        StatusCode::SERVICE_UNAVAILABLE,
                    )
                } else {
                    warp::reply::with_status(
                        warp::reply::json(&json!({
                            "success": true,
                            "payment_id": "pay-77",
                            "confirmation_url": "https://pay.test/77"
                        })),
                        StatusCode::OK,
                    )
                }
            })
    };
    let base = serve!(route);

    let client = HttpPaymentClient::new(&base, fast_policy()).unwrap();
    let created = client.create_payment(&request()).await.unwrap();

    assert_eq!(created.payment_id, "pay-77");
    assert_eq!(created.confirmation_url, "https://pay.test/77");
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    let keys = keys.lock().unwrap();
    assert_eq!(keys[0], keys[1]);
    assert!(uuid::Uuid::parse_str(&keys[0]).is_ok());

    let bodies = bodies.lock().unwrap();
    let body = &bodies[0];
    assert_eq!(body["service_type"], "personal");
    assert_eq!(body["user_data"]["birthdate"], "1990-05-15");
    assert_eq!(body["return_url"], "https://site.test/personal");
}

#[tokio::test]
async fn test_non_json_reply_is_reported_not_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let route = {
        let hits = hits.clone();
        warp::path!("check-payment" / String).map(move |_id: String| {
            hits.fetch_add(1, Ordering::SeqCst);
            warp::reply::with_status(
                warp::reply::html("<html><body>Bad gateway</body></html>"),
                StatusCode::BAD_GATEWAY,
            )
        })
    };
    let base = serve!(route);

    let client = HttpPaymentClient::new(&base, fast_policy()).unwrap();
    let err = client.check_payment("pay-1").await.unwrap_err();

    match err {
        NetworkError::NonJson { status, snippet } => {
            assert_eq!(status, 502);
            assert!(snippet.starts_with("<html>"));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_check_payment_reads_paid_status() {
    let route = warp::path!("check-payment" / String).map(|id: String| {
        warp::reply::json(&json!({
            "success": true,
            "status": "succeeded",
            "paid": true,
            "amount": {"value": "490.00", "currency": "RUB"},
            "metadata": {"payment_id": id}
        }))
    });
    let base = serve!(route);

    let client = HttpPaymentClient::new(&base, fast_policy()).unwrap();
    let status = client.check_payment("pay-9").await.unwrap();

    assert!(status.paid);
    assert_eq!(status.status, "succeeded");
    assert_eq!(status.metadata.unwrap()["payment_id"], "pay-9");
}

#[tokio::test]
async fn test_backend_rejection_is_not_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let route = {
        let hits = hits.clone();
        warp::post().and(warp::path!("create-payment")).map(move || {
            hits.fetch_add(1, Ordering::SeqCst);
            warp::reply::json(&json!({"success": false, "error": "amount not configured"}))
        })
    };
    let base = serve!(route);

    let client = HttpPaymentClient::new(&base, fast_policy()).unwrap();
    let err = client.create_payment(&request()).await.unwrap_err();

    assert_eq!(err, NetworkError::Rejected("amount not configured".to_string()));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stalled_backend_times_out() {
    let route = warp::path!("health").and_then(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok::<_, warp::Rejection>(warp::reply::json(&json!({"status": "ok"})))
    });
    let base = serve!(route);

    let policy = fast_policy()
        .with_max_retries(0)
        .with_attempt_timeout(Duration::from_millis(100));
    let client = HttpPaymentClient::new(&base, policy).unwrap();

    assert_eq!(
        client.health().await.unwrap_err(),
        NetworkError::Timeout { after_ms: 100 }
    );
}

#[tokio::test]
async fn test_health_ok() {
    let route = warp::path!("health")
        .map(|| warp::reply::json(&json!({"status": "ok", "timestamp": "2026-10-18T00:00:00Z"})));
    let base = serve!(route);

    let client = HttpPaymentClient::new(&base, fast_policy()).unwrap();
    assert!(client.health().await.unwrap().is_ok());
}
