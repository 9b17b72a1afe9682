#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use ftx_rest::core::kernel::codec::{decode_query, ParamValue};
use ftx_rest::core::kernel::{Clock, HttpRequest, HttpResponse, HttpTransport};
use ftx_rest::{FtxBuilder, FtxError, FtxRest, Region};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_KEY: &str = "test_api_key";
pub const TEST_SECRET: &str = "test_secret_key";
pub const TEST_TS: u64 = 1_600_000_000_000;

/// Replays canned responses in order and records every request it receives
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<HttpResponse>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: HttpResponse) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn push_result(&self, result: &str) -> &Self {
        self.push(HttpResponse::new(
            200,
            format!(r#"{{"success":true,"result":{}}}"#, result),
        ))
    }

    pub fn push_rejection(&self, error: &str) -> &Self {
        self.push(HttpResponse::new(
            200,
            format!(r#"{{"success":false,"error":"{}"}}"#, error),
        ))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FtxError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| FtxError::NetworkError("no canned response left".to_string()))
    }
}

/// Never answers; used to exercise cancellation
pub struct HangingTransport;

#[async_trait]
impl HttpTransport for HangingTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, FtxError> {
        futures::future::pending().await
    }
}

pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn timestamp_ms(&self) -> Result<u64, FtxError> {
        Ok(self.0)
    }
}

/// Ticks forward by one millisecond per read
pub struct TickingClock(pub AtomicU64);

impl Clock for TickingClock {
    fn timestamp_ms(&self) -> Result<u64, FtxError> {
        Ok(self.0.fetch_add(1, Ordering::SeqCst))
    }
}

pub fn signed_client(transport: &MockTransport) -> FtxRest<MockTransport> {
    FtxBuilder::new()
        .with_credentials(TEST_KEY.to_string(), TEST_SECRET.to_string())
        .with_clock(Arc::new(FixedClock(TEST_TS)))
        .build_with_transport(transport.clone())
}

pub fn us_subaccount_client(transport: &MockTransport, subaccount: &str) -> FtxRest<MockTransport> {
    FtxBuilder::new()
        .with_credentials(TEST_KEY.to_string(), TEST_SECRET.to_string())
        .with_region(Region::Us)
        .with_subaccount(subaccount.to_string())
        .with_clock(Arc::new(FixedClock(TEST_TS)))
        .build_with_transport(transport.clone())
}

pub fn public_client(transport: &MockTransport) -> FtxRest<MockTransport> {
    FtxBuilder::new().build_with_transport(transport.clone())
}

pub const BASE_TIME: i64 = 1_600_000_000;

/// JSON array of trades, one per id, in the given order. Trade time is `BASE_TIME + id` seconds.
pub fn trades_json(ids: impl IntoIterator<Item = u64>) -> String {
    let trades: Vec<String> = ids
        .into_iter()
        .map(|id| {
            let time = chrono::DateTime::from_timestamp(BASE_TIME + id as i64, 0)
                .unwrap()
                .to_rfc3339();
            format!(
                r#"{{"id":{},"liquidation":false,"price":10000.5,"side":"buy","size":0.01,"time":"{}"}}"#,
                id, time
            )
        })
        .collect();
    format!("[{}]", trades.join(","))
}

/// Trade listing that answers like the venue: newest first, at most `limit`
/// trades, none later than an inclusive `end_time`
pub struct TradeVenue {
    /// `(id, unix time in microseconds)`
    trades: Vec<(u64, i64)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl TradeVenue {
    pub fn new(trades: Vec<(u64, i64)>) -> Self {
        Self {
            trades,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn query_value(request: &HttpRequest, key: &str) -> Option<String> {
        let query = request.url.split_once('?').map_or("", |(_, q)| q);
        match decode_query(query).unwrap().get(key) {
            Some(ParamValue::Str(value)) => Some(value.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl HttpTransport for TradeVenue {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FtxError> {
        let limit: usize =
            Self::query_value(&request, "limit").map_or(20, |l| l.parse().unwrap());
        let end_time =
            Self::query_value(&request, "end_time").map(|e| Decimal::from_str(&e).unwrap());
        self.requests.lock().unwrap().push(request);

        let mut trades: Vec<&(u64, i64)> = self
            .trades
            .iter()
            .filter(|(_, micros)| end_time.map_or(true, |end| Decimal::new(*micros, 6) <= end))
            .collect();
        trades.sort_by(|a, b| b.1.cmp(&a.1));

        let page: Vec<String> = trades
            .into_iter()
            .take(limit)
            .map(|(id, micros)| {
                let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
                let time = DateTime::from_timestamp(micros.div_euclid(1_000_000), nanos)
                    .unwrap()
                    .to_rfc3339_opts(SecondsFormat::Micros, true);
                format!(
                    r#"{{"id":{},"liquidation":false,"price":10000.5,"side":"sell","size":0.01,"time":"{}"}}"#,
                    id, time
                )
            })
            .collect();

        Ok(HttpResponse::new(
            200,
            format!(r#"{{"success":true,"result":[{}]}}"#, page.join(",")),
        ))
    }
}
