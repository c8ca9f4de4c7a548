/// Coin-Miners.info client
///
/// The wallet endpoint reports the coin itself, so the coin key is discovered
/// during `initialize` instead of being chosen by the user.
///
/// The endpoint occasionally answers 200 with an empty body, and sometimes
/// emits `"field": ,` for missing values. The last successfully decoded body
/// is kept per client and replayed when the body is empty.
use super::client::{decode_json, ensure_ok, parse_payload, PoolClient, PoolContext};
use super::merge::WorkerSet;
use super::types::{PoolAddressData, PoolAddressWorkerData, PoolConfig};
use crate::errors::{PoolError, PoolResult};
use crate::hashrate::HashRateValue;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use url::Url;

const COIN_MINERS_BASE_URL: &str = "https://pool.coin-miners.info";

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct CoinMinersResponse {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub total: f64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub unpaid: f64,
    pub miners: Vec<CoinMinersWorker>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct CoinMinersWorker {
    #[serde(rename = "ID")]
    pub id: Value,
    /// Raw H/s
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub accepted: Option<f64>,
}

pub struct CoinMinersPoolClient {
    context: PoolContext,
    last_response: Mutex<Option<String>>,
}

impl CoinMinersPoolClient {
    pub fn new(context: PoolContext) -> Self {
        Self {
            context,
            last_response: Mutex::new(None),
        }
    }

    fn endpoint(&self) -> PoolResult<String> {
        let base = self.context.base_url_or(COIN_MINERS_BASE_URL);
        let url = Url::parse_with_params(
            &format!("{}/api/walletEx", base),
            &[("address", self.context.config.address.as_str())],
        )
        .map_err(|e| PoolError::unexpected(format!("Invalid pool url: {}", e)))?;
        Ok(url.into())
    }

    /// Turn a 200 body into JSON, falling back to the cached body when empty
    pub fn decode_body(&self, body: &str) -> PoolResult<Value> {
        let context = self.context.lookup_context();
        let mut last_response = self.last_response.lock();

        let text = if body.is_empty() {
            match last_response.as_ref() {
                Some(cached) => {
                    logger::debug(
                        LogTag::Pool,
                        "Empty response from coin-miners, reusing the last payload",
                    );
                    cached.clone()
                }
                None => body.to_string(),
            }
        } else {
            body.replace(": ,", ": 0,")
        };

        let payload = decode_json(&text, &context)?;
        *last_response = Some(text);
        Ok(payload)
    }

    async fn fetch(&self) -> PoolResult<CoinMinersResponse> {
        let url = self.endpoint()?;
        logger::debug(LogTag::Pool, &format!("Fetching workers from {}", url));

        let context = self.context.lookup_context();
        let response = self.context.http.get(&url, &[], None, &context).await?;
        ensure_ok(&response, &context)?;

        let payload = self.decode_body(&response.body)?;
        parse_payload(payload, &context)
    }

    pub fn parse_response(&self, response: CoinMinersResponse) -> PoolAddressData {
        let workers: WorkerSet = response
            .miners
            .into_iter()
            .map(|miner| {
                let name = match miner.id {
                    Value::String(id) => id,
                    other => other.to_string(),
                };
                let hash_rate =
                    HashRateValue::from_magnitude(miner.accepted.unwrap_or(0.0)).to_gigahashes();
                PoolAddressWorkerData::new(name, None, Some(hash_rate), true)
            })
            .collect();

        let data = PoolAddressData {
            total_paid: Some(response.total),
            current_balance: Some(response.unpaid),
            best_difficulty: None,
            worker_count: workers.len() as u64,
            workers: workers.into_workers(),
        };

        self.context.warn_if_no_workers(&data);
        data
    }
}

#[async_trait]
impl PoolClient for CoinMinersPoolClient {
    fn context(&self) -> &PoolContext {
        &self.context
    }

    async fn initialize(&self, mut config: PoolConfig) -> PoolResult<PoolConfig> {
        let response = self.fetch().await?;
        if let Some(currency) = response.currency {
            logger::debug(
                LogTag::Setup,
                &format!("Coin-miners reports currency {} for {}", currency, config.address),
            );
            config.coin_key = currency.to_lowercase();
        }
        Ok(config)
    }

    async fn get_data(&self) -> PoolResult<PoolAddressData> {
        let response = self.fetch().await?;
        Ok(self.parse_response(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pools::types::PoolSource;
    use serde_json::json;

    fn client() -> CoinMinersPoolClient {
        let config = PoolConfig::new(PoolSource::CoinMiners, "RAbc123");
        CoinMinersPoolClient::new(PoolContext::new(config))
    }

    #[test]
    fn test_endpoint_encodes_address() {
        assert_eq!(
            client().endpoint().unwrap(),
            "https://pool.coin-miners.info/api/walletEx?address=RAbc123"
        );
    }

    #[test]
    fn test_missing_values_are_repaired() {
        let client = client();
        let payload = client
            .decode_body(r#"{"currency": "RVN", "unpaid": , "total": 1.5, "miners": []}"#)
            .unwrap();
        assert_eq!(payload["unpaid"], json!(0));
    }

    #[test]
    fn test_empty_body_reuses_last_payload() {
        let client = client();
        client
            .decode_body(r#"{"currency": "RVN", "unpaid": 2, "total": 1, "miners": []}"#)
            .unwrap();

        let payload = client.decode_body("").unwrap();
        assert_eq!(payload["unpaid"], json!(2));
    }

    #[test]
    fn test_empty_body_without_cache_is_connection_error() {
        let err = client().decode_body("").unwrap_err();
        assert!(err.is_connection());
    }

    #[test]
    fn test_parse_miners() {
        let response: CoinMinersResponse = serde_json::from_value(json!({
            "currency": "RVN",
            "unpaid": "0.75",
            "total": 10.25,
            "miners": [
                {"ID": "rig-a", "accepted": 30000000000.0},
                {"ID": "rig-b", "accepted": "1500000000"},
                {"ID": "rig-a", "accepted": 10000000000u64}
            ]
        }))
        .unwrap();

        let data = client().parse_response(response);
        assert_eq!(data.total_paid, Some(10.25));
        assert_eq!(data.current_balance, Some(0.75));
        assert_eq!(data.worker_count, 2);
        assert_eq!(data.workers[0].hash_rate, Some(40.0));
        assert_eq!(data.workers[1].hash_rate, Some(1.5));
        assert!(data.workers.iter().all(|w| w.is_online));
    }
}
