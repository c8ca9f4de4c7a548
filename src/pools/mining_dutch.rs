/// Mining Dutch client
///
/// API Documentation: https://www.mining-dutch.nl/index.php?page=api
///
/// Endpoints implemented:
/// 1. /pools/{coin_path}.php?page=api&action=getuserworkers - Worker list for an account
///
/// The configured address is the account id. Hash rates are reported in MH/s.
use super::client::{parse_payload, value_is_truthy, PoolClient, PoolContext};
use super::merge::WorkerSet;
use super::types::{PoolAddressData, PoolAddressWorkerData};
use crate::errors::{PoolError, PoolResult};
use crate::hashrate::{HashRateUnit, HashRateValue};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use url::Url;

const MINING_DUTCH_BASE_URL: &str = "https://www.mining-dutch.nl";

const COIN_PATHS: &[(&str, &str)] = &[
    ("btc", "bitcoin"),
    ("bch", "bitcoincashnode"),
    ("ltc", "litecoin"),
];

pub fn coin_path(coin_key: &str) -> Option<&'static str> {
    COIN_PATHS
        .iter()
        .find(|(key, _)| *key == coin_key)
        .map(|(_, path)| *path)
}

pub fn supported_coins() -> impl Iterator<Item = &'static str> {
    COIN_PATHS.iter().map(|(key, _)| *key)
}

// ============================================================================
// RESPONSE TYPES
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct MiningDutchResponse {
    #[serde(default)]
    pub getuserworkers: MiningDutchEnvelope,
}

#[derive(Debug, Default, Deserialize)]
pub struct MiningDutchEnvelope {
    #[serde(default)]
    pub data: MiningDutchData,
}

#[derive(Debug, Default, Deserialize)]
pub struct MiningDutchData {
    #[serde(default)]
    pub miners: Vec<MiningDutchMiner>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct MiningDutchMiner {
    pub username: String,
    /// MH/s
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub hashrate: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub difficulty: Option<f64>,
    /// 1/0, true/false or "1"/"0" depending on the coin
    #[serde(default)]
    pub alive: Value,
}

// ============================================================================
// CLIENT IMPLEMENTATION
// ============================================================================

pub struct MiningDutchPoolClient {
    context: PoolContext,
}

impl MiningDutchPoolClient {
    pub fn new(context: PoolContext) -> Self {
        Self { context }
    }

    fn endpoint(&self, api_key: &str) -> PoolResult<String> {
        let coin_key = &self.context.config.coin_key;
        let path = coin_path(coin_key).ok_or_else(|| {
            PoolError::unexpected(format!("Mining Dutch does not serve coin '{}'", coin_key))
        })?;

        let base = self.context.base_url_or(MINING_DUTCH_BASE_URL);
        let url = Url::parse_with_params(
            &format!("{}/pools/{}.php", base, path),
            &[
                ("page", "api"),
                ("action", "getuserworkers"),
                ("api_key", api_key),
                ("id", self.context.config.address.as_str()),
            ],
        )
        .map_err(|e| PoolError::unexpected(format!("Invalid pool url: {}", e)))?;

        Ok(url.into())
    }

    pub fn parse_response(&self, payload: Value) -> PoolResult<PoolAddressData> {
        let response: MiningDutchResponse =
            parse_payload(payload, &self.context.lookup_context())?;

        let workers: WorkerSet = response
            .getuserworkers
            .data
            .miners
            .into_iter()
            .map(|miner| {
                let stored = self.get_max_best_difficulty(&miner.username);
                let best_difficulty = stored.max(miner.difficulty.unwrap_or(0.0));

                let hash_rate = HashRateValue::new(miner.hashrate.unwrap_or(0.0), HashRateUnit::MH)
                    .to_gigahashes();

                PoolAddressWorkerData::new(
                    miner.username,
                    Some(best_difficulty),
                    Some(hash_rate),
                    value_is_truthy(&miner.alive),
                )
            })
            .collect();

        let best_difficulty = workers.max_best_difficulty().unwrap_or(0.0).max(0.0);

        let data = PoolAddressData {
            total_paid: None,
            current_balance: None,
            best_difficulty: Some(best_difficulty),
            worker_count: workers.len() as u64,
            workers: workers.into_workers(),
        };

        self.context.warn_if_no_workers(&data);
        Ok(data)
    }
}

#[async_trait]
impl PoolClient for MiningDutchPoolClient {
    fn context(&self) -> &PoolContext {
        &self.context
    }

    async fn get_data(&self) -> PoolResult<PoolAddressData> {
        let api_key = self.context.require_api_key()?;
        let url = self.endpoint(api_key)?;
        // The query string carries the api key
        logger::debug(
            LogTag::Pool,
            &format!("Fetching workers from {}", url.replace(api_key, "***")),
        );

        let payload = self
            .context
            .http
            .get_json(&url, &[], None, &self.context.lookup_context())
            .await?;

        self.parse_response(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pools::client::MemoryDifficultyStore;
    use crate::pools::types::{PoolConfig, PoolSource};
    use serde_json::json;
    use std::sync::Arc;

    fn client(coin: &str, store: Arc<MemoryDifficultyStore>) -> MiningDutchPoolClient {
        let config = PoolConfig::new(PoolSource::MiningDutch, "12345")
            .with_coin(coin)
            .with_api_key("abc");
        MiningDutchPoolClient::new(PoolContext::new(config).with_difficulty_store(store))
    }

    #[test]
    fn test_endpoint_query() {
        let client = client("bch", Arc::new(MemoryDifficultyStore::new()));
        assert_eq!(
            client.endpoint("abc").unwrap(),
            "https://www.mining-dutch.nl/pools/bitcoincashnode.php?page=api&action=getuserworkers&api_key=abc&id=12345"
        );
    }

    #[test]
    fn test_unknown_coin_is_unexpected() {
        let client = client("doge", Arc::new(MemoryDifficultyStore::new()));
        assert!(!client.endpoint("abc").unwrap_err().is_connection());
    }

    #[test]
    fn test_parse_miners() {
        let store = Arc::new(MemoryDifficultyStore::new());
        store.record("acct.rig2", 800.0);
        let client = client("btc", store);

        let payload = json!({
            "getuserworkers": {
                "data": {
                    "miners": [
                        {"username": "acct.rig1", "hashrate": 1500000.0, "difficulty": 300, "alive": 1},
                        {"username": "acct.rig2", "hashrate": null, "difficulty": null, "alive": "0"},
                        {"username": "acct.rig3", "hashrate": "250", "difficulty": 1200.5, "alive": true}
                    ]
                }
            }
        });

        let data = client.parse_response(payload).unwrap();
        assert_eq!(data.worker_count, 3);
        assert_eq!(data.best_difficulty, Some(1200.5));

        assert_eq!(data.workers[0].hash_rate, Some(1500.0));
        assert_eq!(data.workers[0].best_difficulty, Some(300.0));
        assert!(data.workers[0].is_online);

        assert_eq!(data.workers[1].hash_rate, Some(0.0));
        assert_eq!(data.workers[1].best_difficulty, Some(800.0));
        assert!(!data.workers[1].is_online);

        assert_eq!(data.workers[2].hash_rate, Some(0.25));
        assert!(data.workers[2].is_online);
    }

    #[test]
    fn test_missing_envelope_yields_empty_result() {
        let client = client("btc", Arc::new(MemoryDifficultyStore::new()));
        let data = client.parse_response(json!({})).unwrap();
        assert_eq!(data.best_difficulty, Some(0.0));
        assert!(data.workers.is_empty());
    }
}
