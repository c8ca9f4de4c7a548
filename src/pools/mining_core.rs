/// Miningcore client
///
/// Self-hosted pool software (https://github.com/oliverw/miningcore). The API
/// lives on the configured pool URL.
///
/// Endpoints implemented:
/// 1. /api/pools/{coin}/miners/{address} - Total paid and per-worker performance
use super::client::{parse_payload, value_as_f64, PoolClient, PoolContext};
use super::merge::WorkerSet;
use super::types::{PoolAddressData, PoolAddressWorkerData};
use crate::errors::PoolResult;
use crate::hashrate::HashRateValue;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

pub const SUPPORTED_COINS: &[&str] = &["bch", "doge"];

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningCoreResponse {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub total_paid: Option<f64>,
    #[serde(default)]
    pub performance: Option<MiningCorePerformance>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MiningCorePerformance {
    #[serde(default)]
    pub workers: Map<String, Value>,
}

pub struct MiningCorePoolClient {
    context: PoolContext,
}

impl MiningCorePoolClient {
    pub fn new(context: PoolContext) -> Self {
        Self { context }
    }

    fn endpoint(&self) -> PoolResult<String> {
        let pool_url = self.context.require_pool_url()?;
        Ok(format!(
            "{}/api/pools/{}/miners/{}",
            pool_url, self.context.config.coin_key, self.context.config.address
        ))
    }

    pub fn parse_response(&self, payload: Value) -> PoolResult<PoolAddressData> {
        let response: MiningCoreResponse = parse_payload(payload, &self.context.lookup_context())?;
        let performance = response.performance.unwrap_or_default();

        // No online flag upstream: a worker listed under performance is online
        let workers: WorkerSet = performance
            .workers
            .iter()
            .map(|(name, stats)| {
                let hash_rate = stats.get("hashrate").and_then(value_as_f64).unwrap_or(0.0);
                PoolAddressWorkerData::new(
                    name.clone(),
                    None,
                    Some(HashRateValue::from_magnitude(hash_rate).to_gigahashes()),
                    true,
                )
            })
            .collect();

        let data = PoolAddressData {
            total_paid: Some(response.total_paid.unwrap_or(0.0)),
            current_balance: None,
            best_difficulty: None,
            worker_count: workers.len() as u64,
            workers: workers.into_workers(),
        };

        self.context.warn_if_no_workers(&data);
        Ok(data)
    }
}

#[async_trait]
impl PoolClient for MiningCorePoolClient {
    fn context(&self) -> &PoolContext {
        &self.context
    }

    async fn get_data(&self) -> PoolResult<PoolAddressData> {
        let url = self.endpoint()?;
        logger::debug(LogTag::Pool, &format!("Fetching workers from {}", url));

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
    use crate::pools::types::{PoolConfig, PoolSource};
    use serde_json::json;

    fn client() -> MiningCorePoolClient {
        let config = PoolConfig::new(PoolSource::MiningCore, "qpaddr")
            .with_coin("bch")
            .with_pool_url("http://umbrel.local:4000/");
        MiningCorePoolClient::new(PoolContext::new(config))
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            client().endpoint().unwrap(),
            "http://umbrel.local:4000/api/pools/bch/miners/qpaddr"
        );
    }

    #[test]
    fn test_parse_performance_workers() {
        let payload = json!({
            "pendingShares": 10,
            "totalPaid": 0.5,
            "performance": {
                "created": "2024-05-01T12:00:00Z",
                "workers": {
                    "bitaxe": {"hashrate": 480000000000.0, "sharesPerSecond": 0.1},
                    "": {"hashrate": 1200000000000u64}
                }
            }
        });

        let data = client().parse_response(payload).unwrap();
        assert_eq!(data.total_paid, Some(0.5));
        assert_eq!(data.current_balance, None);
        assert_eq!(data.best_difficulty, None);
        assert_eq!(data.worker_count, 2);
        assert_eq!(data.workers[0].name, "bitaxe");
        assert_eq!(data.workers[0].hash_rate, Some(480.0));
        assert_eq!(data.workers[1].hash_rate, Some(1200.0));
        assert!(data.workers.iter().all(|w| w.is_online));
    }

    #[test]
    fn test_no_performance_yet() {
        let data = client().parse_response(json!({})).unwrap();
        assert_eq!(data.total_paid, Some(0.0));
        assert!(data.workers.is_empty());
    }
}
