/// Public Pool client
///
/// Self-hostable solo pool (https://web.public-pool.io). The API lives on the
/// configured pool URL.
///
/// Endpoints implemented:
/// 1. /api/client/{address} - Workers, best difficulty and worker count
use super::client::{parse_payload, parse_timestamp, PoolClient, PoolContext};
use super::merge::{max_float, WorkerSet};
use super::types::{PoolAddressData, PoolAddressWorkerData};
use crate::errors::PoolResult;
use crate::hashrate::HashRateValue;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use std::time::Duration;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// Public Pool answers slowly for addresses with many workers
const TIMEOUT_SECS: u64 = 55;

// ============================================================================
// RESPONSE TYPES
// ============================================================================

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPoolResponse {
    pub workers: Vec<PublicPoolWorker>,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub workers_count: u64,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub best_difficulty: Option<f64>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPoolWorker {
    pub name: String,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub best_difficulty: Option<f64>,
    /// Raw H/s
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub hash_rate: Option<f64>,
    #[serde(default)]
    pub last_seen: Option<String>,
}

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

pub struct PublicPoolClient {
    context: PoolContext,
}

impl PublicPoolClient {
    pub fn new(context: PoolContext) -> Self {
        Self { context }
    }

    fn endpoint(&self) -> PoolResult<String> {
        let pool_url = self.context.require_pool_url()?;
        Ok(format!("{}/api/client/{}", pool_url, self.context.config.address))
    }

    /// Map a decoded response onto the canonical model
    pub fn parse_response(&self, payload: Value) -> PoolResult<PoolAddressData> {
        let response: PublicPoolResponse =
            parse_payload(payload, &self.context.lookup_context())?;

        let workers: WorkerSet = response
            .workers
            .into_iter()
            .map(|worker| {
                let is_online = worker
                    .last_seen
                    .as_deref()
                    .and_then(parse_timestamp)
                    .map(|last_seen| self.context.is_recent(last_seen))
                    .unwrap_or(false);

                let stored = self.get_max_best_difficulty(&worker.name);
                let best_difficulty =
                    max_float(Some(worker.best_difficulty.unwrap_or(0.0)), Some(stored));

                let hash_rate =
                    HashRateValue::from_magnitude(worker.hash_rate.unwrap_or(0.0)).to_gigahashes();

                PoolAddressWorkerData::new(worker.name, best_difficulty, Some(hash_rate), is_online)
            })
            .collect();

        let data = PoolAddressData {
            total_paid: None,
            current_balance: None,
            best_difficulty: Some(response.best_difficulty.unwrap_or(0.0)),
            worker_count: response.workers_count,
            workers: workers.into_workers(),
        };

        self.context.warn_if_no_workers(&data);
        Ok(data)
    }
}

#[async_trait]
impl PoolClient for PublicPoolClient {
    fn context(&self) -> &PoolContext {
        &self.context
    }

    async fn get_data(&self) -> PoolResult<PoolAddressData> {
        let url = self.endpoint()?;
        logger::debug(LogTag::Pool, &format!("Fetching workers from {}", url));

        let payload = self
            .context
            .http
            .get_json(
                &url,
                &[],
                Some(Duration::from_secs(TIMEOUT_SECS)),
                &self.context.lookup_context(),
            )
            .await?;

        self.parse_response(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pools::client::{FixedClock, MemoryDifficultyStore};
    use crate::pools::types::{PoolConfig, PoolSource};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::Arc;

    fn client(store: Arc<MemoryDifficultyStore>) -> PublicPoolClient {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let config = PoolConfig::new(PoolSource::PublicPool, "bc1qexample")
            .with_pool_url("https://public-pool.io:40557/");
        PublicPoolClient::new(
            PoolContext::new(config)
                .with_clock(Arc::new(FixedClock(now)))
                .with_difficulty_store(store),
        )
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = client(Arc::new(MemoryDifficultyStore::new()));
        assert_eq!(
            client.endpoint().unwrap(),
            "https://public-pool.io:40557/api/client/bc1qexample"
        );
    }

    #[test]
    fn test_missing_pool_url_is_connection_error() {
        let config = PoolConfig::new(PoolSource::PublicPool, "bc1qexample");
        let client = PublicPoolClient::new(PoolContext::new(config));
        let err = client.endpoint().unwrap_err();
        assert!(err.is_connection());
        assert_eq!(err.to_string(), "Pool url is not configured.");
    }

    #[test]
    fn test_parse_workers_with_duplicates_and_history() {
        let store = Arc::new(MemoryDifficultyStore::new());
        store.record("bitaxe", 9000.0);
        let client = client(store);

        let payload = json!({
            "bestDifficulty": "123456.7",
            "workersCount": 3,
            "workers": [
                {
                    "name": "bitaxe",
                    "bestDifficulty": "5000",
                    "hashRate": "500000000000",
                    "lastSeen": "2024-05-01T11:55:00.000Z"
                },
                {
                    "name": "nerdminer",
                    "bestDifficulty": 12.5,
                    "hashRate": 50000,
                    "lastSeen": "2024-05-01T09:00:00.000Z"
                },
                {
                    "name": "bitaxe",
                    "bestDifficulty": "7000",
                    "hashRate": 250000000000.0,
                    "lastSeen": "2024-05-01T08:00:00.000Z"
                }
            ]
        });

        let data = client.parse_response(payload).unwrap();
        assert_eq!(data.worker_count, 3);
        assert_eq!(data.best_difficulty, Some(123456.7));
        assert_eq!(data.total_paid, None);
        assert_eq!(data.current_balance, None);
        assert_eq!(data.workers.len(), 2);

        let bitaxe = &data.workers[0];
        assert_eq!(bitaxe.name, "bitaxe");
        assert_eq!(bitaxe.hash_rate, Some(750.0));
        assert_eq!(bitaxe.best_difficulty, Some(9000.0));
        assert!(bitaxe.is_online);

        let nerd = &data.workers[1];
        assert_eq!(nerd.best_difficulty, Some(12.5));
        assert!(!nerd.is_online);
    }

    #[test]
    fn test_missing_best_difficulty_defaults_to_zero() {
        let client = client(Arc::new(MemoryDifficultyStore::new()));
        let data = client
            .parse_response(json!({"workersCount": 0, "workers": []}))
            .unwrap();
        assert_eq!(data.best_difficulty, Some(0.0));
        assert!(data.workers.is_empty());
    }

    #[test]
    fn test_missing_workers_count_is_unexpected() {
        let client = client(Arc::new(MemoryDifficultyStore::new()));
        let err = client.parse_response(json!({"workers": []})).unwrap_err();
        assert!(!err.is_connection());
    }
}
