//! Testing utilities for the matrix workspace
//!
//! Fixed dates, sample corpora and a scripted payment backend.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use matrix_gate::{MatrixKey, ServiceType};
use matrix_payment::{
    CalcData, CreatePaymentRequest, HealthResponse, NetworkError, PaymentBackend, PaymentCreated,
    PaymentStatus, UserData,
};
use matrix_points::BirthInput;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const SAMPLE_DATE: &str = "1990-05-15";
pub const SAMPLE_NAME: &str = "Anna";
pub const PARTNER_DATE: &str = "1985-11-03";

/// Personal corpus covering the free spheres of `SAMPLE_DATE` (a = 15, c = 19)
/// and its talents point (e = 6)
pub const PERSONAL_CORPUS_JSON: &str = r#"{
  "15": {
    "title": "15 аркан: Дьявол",
    "spheres": {
      "ЛИЧНЫЕ КАЧЕСТВА": "=== 15 АРКАН ===\nХаризма и сила влияния.\n\n🔥 Сильная сторона: притягивает людей.",
      "ДЕНЬГИ И КАРЬЕРА": "Деньги через влияние."
    }
  },
  "19": {
    "title": "19 аркан: Солнце",
    "spheres": {
      "ПРОШЛАЯ ЖИЗНЬ": "Прошлое воплощение в роли лидера."
    }
  },
  "6": {
    "title": "6 аркан: Влюблённые",
    "spheres": {
      "ТАЛАНТЫ И СУПЕРСИЛЫ": "Талант выбирать сердцем.",
      "ЗАМЕТКИ АВТОРА": "Не относится ни к одной сфере."
    }
  }
}"#;

/// Compatibility corpus with canonical sphere headings
pub const COMPATIBILITY_CORPUS_JSON: &str = r#"{
  "18": {
    "title": "18 аркан: Луна",
    "spheres": {
      "Фундамент отношений / базовая энергия пары": "Союз на интуиции."
    }
  },
  "6": {
    "title": "6 аркан: Влюблённые",
    "spheres": {
      "Финансовая гармония / ресурсы": "Общие деньги через согласие."
    }
  }
}"#;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

pub fn sample_birth() -> BirthInput {
    BirthInput::parse(SAMPLE_DATE, Some(SAMPLE_NAME), today()).unwrap()
}

pub fn partner_birth() -> BirthInput {
    BirthInput::parse(PARTNER_DATE, None, today()).unwrap()
}

pub fn sample_key() -> MatrixKey {
    MatrixKey::personal(&sample_birth())
}

pub fn sample_calc_data() -> CalcData {
    CalcData {
        service_type: ServiceType::Personal,
        user_data: UserData::personal(
            SAMPLE_DATE,
            SAMPLE_NAME,
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
        ),
    }
}

/// Write `json` to `dir/name` and return the path
pub fn write_corpus(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, json).unwrap();
    path
}

/// Payment backend returning scripted replies
///
/// Unscripted calls succeed: `create_payment` hands out `pay-N`,
/// `check_payment` reports `pending`.
#[derive(Debug, Default)]
pub struct MockBackend {
    create_replies: Mutex<VecDeque<Result<PaymentCreated, NetworkError>>>,
    check_replies: Mutex<VecDeque<Result<PaymentStatus, NetworkError>>>,
    requests: Mutex<Vec<CreatePaymentRequest>>,
    checked: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_create(&self, reply: Result<PaymentCreated, NetworkError>) -> &Self {
        self.create_replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn push_check(&self, reply: Result<PaymentStatus, NetworkError>) -> &Self {
        self.check_replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn push_paid(&self) -> &Self {
        self.push_check(Ok(status("succeeded", true)))
    }

    pub fn requests(&self) -> Vec<CreatePaymentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn checked_ids(&self) -> Vec<String> {
        self.checked.lock().unwrap().clone()
    }
}

pub fn status(text: &str, paid: bool) -> PaymentStatus {
    PaymentStatus {
        status: text.to_string(),
        paid,
        amount: None,
        metadata: None,
    }
}

#[async_trait]
impl PaymentBackend for MockBackend {
    async fn create_payment(&self, request: &CreatePaymentRequest) -> Result<PaymentCreated, NetworkError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let n = requests.len();
        drop(requests);
        self.create_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(PaymentCreated {
                    payment_id: format!("pay-{n}"),
                    confirmation_url: format!("https://pay.test/confirm/{n}"),
                })
            })
    }

    async fn check_payment(&self, payment_id: &str) -> Result<PaymentStatus, NetworkError> {
        self.checked.lock().unwrap().push(payment_id.to_string());
        self.check_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(status("pending", false)))
    }

    async fn health(&self) -> Result<HealthResponse, NetworkError> {
        Ok(HealthResponse {
            status: "ok".to_string(),
            timestamp: None,
        })
    }
}
