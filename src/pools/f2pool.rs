/// f2pool client
///
/// API Documentation: https://www.f2pool.com/developer/api
///
/// Endpoints implemented:
/// 1. /{coin_path}/{address} - Paid, balance and the worker table
///
/// Requires the read-only API secret in the `F2P-API-SECRET` header.
use super::client::{parse_payload, parse_timestamp, value_as_f64, PoolClient, PoolContext};
use super::merge::WorkerSet;
use super::types::{PoolAddressData, PoolAddressWorkerData};
use crate::errors::{PoolError, PoolResult};
use crate::hashrate::HashRateValue;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

// ============================================================================
// API CONFIGURATION
// ============================================================================

const F2POOL_BASE_URL: &str = "https://api.f2pool.com";

/// Coin key to f2pool URL path segment
const COIN_PATHS: &[(&str, &str)] = &[
    ("btc", "bitcoin"),
    ("bch", "bitcoin-cash"),
    ("aleo", "aleo"),
    ("bells", "bells-mm"),
    ("cfx", "conflux"),
    ("ckb", "nervos"),
    ("dash", "dash"),
    ("ela", "elacoin"),
    ("etc", "ethereum-classic"),
    ("ehhw", "ethw"),
    ("fb", "fractal-bitcoin"),
    ("iron", "iron-fish"),
    ("htr", "hathor"),
    ("jkc", "junkcoin"),
    ("kda", "kadena"),
    ("kas", "kaspa"),
    ("ltc", "litecoin"),
    ("lky", "luckycoin"),
    ("nexa", "nexa"),
    ("nmc", "nmccoin"),
    ("pep", "pepecoin"),
    ("zec", "zcash"),
    ("zen", "zen"),
];

// Positions inside one worker row
const ROW_NAME: usize = 0;
const ROW_HASH_RATE: usize = 1;
const ROW_LAST_SEEN: usize = 6;

pub fn coin_path(coin_key: &str) -> Option<&'static str> {
    COIN_PATHS
        .iter()
        .find(|(key, _)| *key == coin_key)
        .map(|(_, path)| *path)
}

/// Coin keys f2pool serves
pub fn supported_coins() -> impl Iterator<Item = &'static str> {
    COIN_PATHS.iter().map(|(key, _)| *key)
}

// ============================================================================
// RESPONSE TYPES
// ============================================================================

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct F2PoolResponse {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub paid: f64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub balance: f64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub worker_length: u64,
    /// Rows of `[name, hash_rate, ..., last_seen, ...]`
    pub workers: Vec<Vec<Value>>,
}

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

pub struct F2PoolClient {
    context: PoolContext,
}

impl F2PoolClient {
    pub fn new(context: PoolContext) -> Self {
        Self { context }
    }

    fn endpoint(&self) -> PoolResult<String> {
        let coin_key = &self.context.config.coin_key;
        let path = coin_path(coin_key)
            .ok_or_else(|| PoolError::unexpected(format!("f2pool does not serve coin '{}'", coin_key)))?;

        Ok(format!(
            "{}/{}/{}",
            self.context.base_url_or(F2POOL_BASE_URL),
            path,
            self.context.config.address
        ))
    }

    fn parse_row(&self, row: &[Value]) -> PoolAddressWorkerData {
        let name = match row.get(ROW_NAME) {
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let hash_rate = row.get(ROW_HASH_RATE).and_then(value_as_f64).unwrap_or(0.0);

        let is_online = row
            .get(ROW_LAST_SEEN)
            .and_then(last_seen_from_value)
            .map(|last_seen| self.context.is_recent(last_seen))
            .unwrap_or(false);

        PoolAddressWorkerData::new(
            name,
            None,
            Some(HashRateValue::from_magnitude(hash_rate).to_gigahashes()),
            is_online,
        )
    }

    pub fn parse_response(&self, payload: Value) -> PoolResult<PoolAddressData> {
        let response: F2PoolResponse = parse_payload(payload, &self.context.lookup_context())?;

        let workers: WorkerSet = response
            .workers
            .iter()
            .map(|row| self.parse_row(row))
            .collect();

        let data = PoolAddressData {
            total_paid: Some(response.paid),
            current_balance: Some(response.balance),
            best_difficulty: None,
            worker_count: response.worker_length,
            workers: workers.into_workers(),
        };

        self.context.warn_if_no_workers(&data);
        Ok(data)
    }
}

/// Last-seen cell: ISO text, or unix seconds on some coins
fn last_seen_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_timestamp(text),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

#[async_trait]
impl PoolClient for F2PoolClient {
    fn context(&self) -> &PoolContext {
        &self.context
    }

    async fn get_data(&self) -> PoolResult<PoolAddressData> {
        let api_key = self.context.require_api_key()?;
        let url = self.endpoint()?;
        logger::debug(LogTag::Pool, &format!("Fetching workers from {}", url));

        let headers = [
            ("F2P-API-SECRET", api_key),
            ("Content-Type", "application/json"),
        ];

        let payload = self
            .context
            .http
            .get_json(&url, &headers, None, &self.context.lookup_context())
            .await?;

        self.parse_response(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pools::client::FixedClock;
    use crate::pools::types::{PoolConfig, PoolSource};
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Arc;

    fn client(coin: &str) -> F2PoolClient {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let config = PoolConfig::new(PoolSource::F2Pool, "miner01")
            .with_coin(coin)
            .with_api_key("secret");
        F2PoolClient::new(PoolContext::new(config).with_clock(Arc::new(FixedClock(now))))
    }

    #[test]
    fn test_endpoint_uses_coin_path() {
        assert_eq!(
            client("bch").endpoint().unwrap(),
            "https://api.f2pool.com/bitcoin-cash/miner01"
        );
        assert_eq!(
            client("ehhw").endpoint().unwrap(),
            "https://api.f2pool.com/ethw/miner01"
        );
    }

    #[test]
    fn test_unknown_coin_is_unexpected() {
        let err = client("doge").endpoint().unwrap_err();
        assert!(!err.is_connection());
        assert!(err.to_string().contains("doge"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_connection_error() {
        let config = PoolConfig::new(PoolSource::F2Pool, "miner01").with_coin("btc");
        let client = F2PoolClient::new(PoolContext::new(config));
        let err = client.get_data().await.unwrap_err();
        assert!(err.is_connection());
        assert_eq!(err.to_string(), "Pool api key is not configured.");
    }

    #[test]
    fn test_parse_worker_rows() {
        let payload = json!({
            "paid": 0.0123,
            "balance": "0.0004",
            "worker_length": 2,
            "workers": [
                ["s19.1", 110000000000000.0, 0, 0, 0, 0, "2024-05-01T11:50:00Z", false],
                ["s19.2", 95000000000000u64, 0, 0, 0, 0, "2024-04-30T11:50:00Z", false]
            ]
        });

        let data = client("btc").parse_response(payload).unwrap();
        assert_eq!(data.total_paid, Some(0.0123));
        assert_eq!(data.current_balance, Some(0.0004));
        assert_eq!(data.best_difficulty, None);
        assert_eq!(data.worker_count, 2);

        assert_eq!(data.workers[0].name, "s19.1");
        assert_eq!(data.workers[0].hash_rate, Some(110000.0));
        assert!(data.workers[0].is_online);
        assert_eq!(data.workers[1].hash_rate, Some(95000.0));
        assert!(!data.workers[1].is_online);
    }

    #[test]
    fn test_short_row_is_offline() {
        let payload = json!({
            "paid": 0,
            "balance": 0,
            "worker_length": 1,
            "workers": [["lonely", "12"]]
        });

        let data = client("btc").parse_response(payload).unwrap();
        assert_eq!(data.workers.len(), 1);
        assert!(!data.workers[0].is_online);
    }
}
