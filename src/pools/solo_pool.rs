/// SoloPool.org client
///
/// Each coin is served from its own subdomain, e.g. https://btc.solopool.org.
///
/// Endpoints implemented:
/// 1. /api/accounts/{address} - Payments, balance and per-worker stats
use super::client::{parse_payload, value_as_f64, value_is_truthy, PoolClient, PoolContext};
use super::merge::WorkerSet;
use super::types::{PoolAddressData, PoolAddressWorkerData};
use crate::errors::PoolResult;
use crate::hashrate::HashRateValue;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

pub const SUPPORTED_COINS: &[&str] = &[
    "btc", "bch", "btg", "clore", "erg", "etc", "ethw", "fb", "kas", "neox", "octa", "rvn", "sdr",
    "xna", "xec", "xel", "xmr", "zeph",
];

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoloPoolResponse {
    /// Keyed by worker name, in upstream order
    pub workers: Map<String, Value>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub payments_total: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub payments: Option<f64>,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub workers_total: u64,
}

pub struct SoloPoolClient {
    context: PoolContext,
}

impl SoloPoolClient {
    pub fn new(context: PoolContext) -> Self {
        Self { context }
    }

    fn endpoint(&self) -> String {
        let config = &self.context.config;
        let host = self
            .context
            .base_url_or(&format!("https://{}.solopool.org", config.coin_key));
        format!("{}/api/accounts/{}", host, config.address)
    }

    pub fn parse_response(&self, payload: Value) -> PoolResult<PoolAddressData> {
        let response: SoloPoolResponse = parse_payload(payload, &self.context.lookup_context())?;

        let workers: WorkerSet = response
            .workers
            .iter()
            .map(|(name, stats)| {
                let hash_rate = stats.get("hr").and_then(value_as_f64).unwrap_or(0.0);
                let offline = stats.get("offline").map(value_is_truthy).unwrap_or(false);

                PoolAddressWorkerData::new(
                    name.clone(),
                    None,
                    Some(HashRateValue::from_magnitude(hash_rate).to_gigahashes()),
                    !offline,
                )
            })
            .collect();

        let data = PoolAddressData {
            total_paid: Some(response.payments_total.unwrap_or(0.0)),
            current_balance: Some(response.payments.unwrap_or(0.0)),
            best_difficulty: None,
            worker_count: response.workers_total,
            workers: workers.into_workers(),
        };

        self.context.warn_if_no_workers(&data);
        Ok(data)
    }
}

#[async_trait]
impl PoolClient for SoloPoolClient {
    fn context(&self) -> &PoolContext {
        &self.context
    }

    async fn get_data(&self) -> PoolResult<PoolAddressData> {
        let url = self.endpoint();
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

    fn client() -> SoloPoolClient {
        let config = PoolConfig::new(PoolSource::SoloPool, "0xabc").with_coin("etc");
        SoloPoolClient::new(PoolContext::new(config))
    }

    #[test]
    fn test_endpoint_uses_coin_subdomain() {
        assert_eq!(
            client().endpoint(),
            "https://etc.solopool.org/api/accounts/0xabc"
        );
    }

    #[test]
    fn test_parse_keeps_upstream_worker_order() {
        let payload = json!({
            "workers": {
                "zeta": {"hr": 2000000000, "offline": false},
                "alpha": {"hr": 500000000.0, "offline": true},
                "mid": {"offline": false}
            },
            "paymentsTotal": 12,
            "payments": null,
            "workersTotal": 3
        });

        let data = client().parse_response(payload).unwrap();
        let names: Vec<&str> = data.workers.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);

        assert_eq!(data.workers[0].hash_rate, Some(2.0));
        assert!(data.workers[0].is_online);
        assert_eq!(data.workers[1].hash_rate, Some(0.5));
        assert!(!data.workers[1].is_online);
        assert_eq!(data.workers[2].hash_rate, Some(0.0));

        assert_eq!(data.total_paid, Some(12.0));
        assert_eq!(data.current_balance, Some(0.0));
        assert_eq!(data.worker_count, 3);
    }

    #[test]
    fn test_missing_workers_is_unexpected() {
        let err = client()
            .parse_response(json!({"workersTotal": 0}))
            .unwrap_err();
        assert!(!err.is_connection());
    }
}
