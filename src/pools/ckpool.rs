/// CKPool solo client
///
/// Endpoints implemented:
/// 1. /users/{address} - Per-worker share stats and the all-time best share
///
/// Hash rates arrive as compact strings ("1.35T") and worker names are
/// prefixed with the payout address (`address.worker`).
use super::client::{parse_payload, PoolClient, PoolContext};
use super::merge::WorkerSet;
use super::types::{PoolAddressData, PoolAddressWorkerData};
use crate::errors::PoolResult;
use crate::hashrate::HashRateValue;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

const CKPOOL_BASE_URL: &str = "https://solo.ckpool.org";

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct CkPoolResponse {
    #[serde(default)]
    pub worker: Vec<CkPoolWorker>,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub bestever: f64,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct CkPoolWorker {
    pub workername: String,
    /// Unix seconds, possibly fractional
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub lastshare: Option<f64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub bestever: Option<f64>,
    #[serde(default)]
    pub hashrate5m: String,
}

/// Part after the last dot, or the whole name
pub fn display_name(workername: &str) -> &str {
    workername.rsplit('.').next().unwrap_or(workername)
}

pub struct CkPoolClient {
    context: PoolContext,
}

impl CkPoolClient {
    pub fn new(context: PoolContext) -> Self {
        Self { context }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/users/{}",
            self.context.base_url_or(CKPOOL_BASE_URL),
            self.context.config.address
        )
    }

    pub fn parse_response(&self, payload: Value) -> PoolResult<PoolAddressData> {
        let response: CkPoolResponse = parse_payload(payload, &self.context.lookup_context())?;

        let workers: WorkerSet = response
            .worker
            .into_iter()
            .map(|worker| {
                let is_online = worker
                    .lastshare
                    .filter(|secs| secs.is_finite())
                    .and_then(|secs| DateTime::from_timestamp(secs.trunc() as i64, 0))
                    .map(|last_share| self.context.is_recent(last_share))
                    .unwrap_or(false);

                PoolAddressWorkerData::new(
                    display_name(&worker.workername),
                    Some(worker.bestever.unwrap_or(0.0)),
                    Some(HashRateValue::from_compact_string(&worker.hashrate5m).to_gigahashes()),
                    is_online,
                )
            })
            .collect();

        let data = PoolAddressData {
            total_paid: None,
            current_balance: None,
            best_difficulty: Some(response.bestever),
            worker_count: workers.len() as u64,
            workers: workers.into_workers(),
        };

        self.context.warn_if_no_workers(&data);
        Ok(data)
    }
}

#[async_trait]
impl PoolClient for CkPoolClient {
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
    use crate::pools::client::FixedClock;
    use crate::pools::types::{PoolConfig, PoolSource};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::Arc;

    const NOW: i64 = 1_714_564_800; // 2024-05-01T12:00:00Z

    fn client() -> CkPoolClient {
        let now = Utc.timestamp_opt(NOW, 0).unwrap();
        let config = PoolConfig::new(PoolSource::CkPool, "bc1qsolo");
        CkPoolClient::new(PoolContext::new(config).with_clock(Arc::new(FixedClock(now))))
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("bc1qsolo.bitaxe"), "bitaxe");
        assert_eq!(display_name("bc1qsolo.a.b"), "b");
        assert_eq!(display_name("plain"), "plain");
    }

    #[test]
    fn test_parse_workers() {
        let payload = json!({
            "hashrate5m": "2.1T",
            "bestever": 98765432.1,
            "worker": [
                {
                    "workername": "bc1qsolo.bitaxe",
                    "hashrate5m": "1.35T",
                    "lastshare": NOW - 60,
                    "bestever": 4567.8
                },
                {
                    "workername": "bc1qsolo.nerd",
                    "hashrate5m": "750G",
                    "lastshare": NOW - 3600,
                    "bestever": 12
                }
            ]
        });

        let data = client().parse_response(payload).unwrap();
        assert_eq!(data.best_difficulty, Some(98765432.1));
        assert_eq!(data.worker_count, 2);
        assert_eq!(data.total_paid, None);
        assert_eq!(data.current_balance, None);

        let bitaxe = &data.workers[0];
        assert_eq!(bitaxe.name, "bitaxe");
        assert_eq!(bitaxe.hash_rate, Some(1350.0));
        assert_eq!(bitaxe.best_difficulty, Some(4567.8));
        assert!(bitaxe.is_online);

        let nerd = &data.workers[1];
        assert_eq!(nerd.hash_rate, Some(750.0));
        assert!(!nerd.is_online);
    }

    #[test]
    fn test_fractional_lastshare() {
        let payload = json!({
            "bestever": 1,
            "worker": [
                {"workername": "bc1qsolo.bitaxe", "hashrate5m": "1T", "lastshare": (NOW - 59) as f64 + 0.5},
                {"workername": "bc1qsolo.nerd", "hashrate5m": "1T", "lastshare": "1714560000.25"}
            ]
        });

        let data = client().parse_response(payload).unwrap();
        assert!(data.workers[0].is_online);
        assert!(!data.workers[1].is_online);
    }

    #[test]
    fn test_no_worker_list() {
        let data = client()
            .parse_response(json!({"bestever": 10}))
            .unwrap();
        assert_eq!(data.worker_count, 0);
        assert!(data.workers.is_empty());
    }

    #[test]
    fn test_missing_bestever_is_unexpected() {
        let err = client().parse_response(json!({"worker": []})).unwrap_err();
        assert!(!err.is_connection());
    }
}
