/// Pool client contract and the collaborators every adapter shares
///
/// - `HttpClient`: single-attempt GET with status classification
/// - `BestDifficultyStore`: read-only lookup of historic best difficulty
/// - `Clock`: current UTC time for staleness checks
/// - `PoolClient`: the trait each upstream adapter implements
use super::types::{PoolAddressData, PoolConfig};
use crate::errors::{PoolError, PoolResult};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, Utc};
use parking_lot::RwLock;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Default request timeout when the host does not provide one
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A worker that has not reported for this long is offline
pub const STALE_AFTER_MINUTES: i64 = 30;

// ============================================================================
// HTTP TRANSPORT
// ============================================================================

/// Status and body of one upstream response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP client wrapper with a default timeout
///
/// One call is one attempt: nothing here retries.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Wrap an already configured reqwest client
    pub fn from_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue one GET and return status and body text
    ///
    /// Transport failures become connection errors prefixed with `context`.
    pub async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Option<Duration>,
        context: &str,
    ) -> PoolResult<HttpResponse> {
        let mut builder = self.client.get(url).timeout(timeout.unwrap_or(self.timeout));
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PoolError::connection_with_source(format!("{}: {}", context, e), e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| PoolError::connection_with_source(format!("{}: {}", context, e), e))?;

        logger::debug(
            LogTag::Api,
            &format!("GET {} -> {} ({} bytes)", url, status, body.len()),
        );
        logger::verbose(LogTag::Api, &body);

        Ok(HttpResponse { status, body })
    }

    /// GET a JSON document, failing on any non-200 status
    pub async fn get_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        timeout: Option<Duration>,
        context: &str,
    ) -> PoolResult<Value> {
        let response = self.get(url, headers, timeout, context).await?;
        ensure_ok(&response, context)?;
        decode_json(&response.body, context)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::from_client(Client::new(), Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

/// Non-200 responses are connection errors carrying the status code
pub fn ensure_ok(response: &HttpResponse, context: &str) -> PoolResult<()> {
    if response.status == 200 {
        Ok(())
    } else {
        Err(PoolError::connection(format!(
            "{}: Status code {}",
            context, response.status
        )))
    }
}

/// Decode a body as JSON; an undecodable body is a connection error
pub fn decode_json(body: &str, context: &str) -> PoolResult<Value> {
    serde_json::from_str(body)
        .map_err(|e| PoolError::connection_with_source(format!("{}: {}", context, e), e))
}

/// Map a decoded document onto a typed payload
///
/// A document that decodes but lacks required fields is unusable, which is
/// not a connection problem.
pub fn parse_payload<T: serde::de::DeserializeOwned>(value: Value, context: &str) -> PoolResult<T> {
    serde_json::from_value(value)
        .map_err(|e| PoolError::unexpected(format!("{}: unexpected payload: {}", context, e)))
}

// ============================================================================
// COLLABORATORS
// ============================================================================

/// Previously observed best difficulty per worker
///
/// Writes happen outside the pool clients, after a poll completes.
pub trait BestDifficultyStore: Send + Sync {
    /// Best difficulty seen for `worker_name`, 0 when unknown
    fn get(&self, worker_name: &str) -> f64;
}

/// Store that remembers nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHistory;

impl BestDifficultyStore for NoHistory {
    fn get(&self, _worker_name: &str) -> f64 {
        0.0
    }
}

/// In-memory store the host updates after each poll
#[derive(Debug, Default)]
pub struct MemoryDifficultyStore {
    values: RwLock<HashMap<String, f64>>,
}

impl MemoryDifficultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the stored value for a worker, never lowering it
    pub fn record(&self, worker_name: &str, best_difficulty: f64) {
        let mut values = self.values.write();
        let entry = values.entry(worker_name.to_string()).or_insert(0.0);
        if best_difficulty > *entry {
            *entry = best_difficulty;
        }
    }

    /// Record every worker of a poll result
    pub fn record_poll(&self, data: &PoolAddressData) {
        for worker in &data.workers {
            if let Some(best) = worker.best_difficulty {
                self.record(&worker.name, best);
            }
        }
    }
}

impl BestDifficultyStore for MemoryDifficultyStore {
    fn get(&self, worker_name: &str) -> f64 {
        self.values.read().get(worker_name).copied().unwrap_or(0.0)
    }
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ============================================================================
// CLIENT CONTEXT
// ============================================================================

/// Read-only state an adapter closes over
#[derive(Clone)]
pub struct PoolContext {
    pub config: PoolConfig,
    pub http: HttpClient,
    pub difficulty_store: Arc<dyn BestDifficultyStore>,
    pub clock: Arc<dyn Clock>,
    /// Replaces the adapter's hard-coded API host (mirrors, testing)
    pub base_url: Option<String>,
}

impl PoolContext {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            http: HttpClient::default(),
            difficulty_store: Arc::new(NoHistory),
            clock: Arc::new(SystemClock),
            base_url: None,
        }
    }

    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    pub fn with_difficulty_store(mut self, store: Arc<dyn BestDifficultyStore>) -> Self {
        self.difficulty_store = store;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Configured base URL override, or the adapter's default
    pub fn base_url_or(&self, default: &str) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    /// Prefix used in every error message of one lookup
    pub fn lookup_context(&self) -> String {
        format!("Lookup of '{}' failed", self.config.address)
    }

    /// Configured pool URL without trailing slash
    pub fn require_pool_url(&self) -> PoolResult<String> {
        match self.config.pool_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(url.trim_end_matches('/').to_string()),
            _ => Err(PoolError::connection("Pool url is not configured.")),
        }
    }

    pub fn require_api_key(&self) -> PoolResult<&str> {
        match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(PoolError::connection("Pool api key is not configured.")),
        }
    }

    /// Whether a worker last seen at `last_seen` still counts as online
    pub fn is_recent(&self, last_seen: DateTime<Utc>) -> bool {
        self.clock.now() - last_seen < ChronoDuration::minutes(STALE_AFTER_MINUTES)
    }

    pub fn warn_if_no_workers(&self, data: &PoolAddressData) {
        if data.workers.is_empty() {
            logger::warning(
                LogTag::Pool,
                &format!("No workers found for address {}", self.config.address),
            );
        }
    }
}

// ============================================================================
// CLIENT TRAIT
// ============================================================================

/// Contract implemented by every upstream adapter
#[async_trait]
pub trait PoolClient: Send + Sync {
    fn context(&self) -> &PoolContext;

    /// One-time pre-flight step run before the configuration is stored
    ///
    /// Returns the (possibly enriched) configuration; identity by default.
    async fn initialize(&self, config: PoolConfig) -> PoolResult<PoolConfig> {
        Ok(config)
    }

    /// Fetch the current figures with exactly one upstream request
    async fn get_data(&self) -> PoolResult<PoolAddressData>;

    /// Best difficulty previously recorded for a worker, 0 when unknown
    fn get_max_best_difficulty(&self, worker_name: &str) -> f64 {
        self.context().difficulty_store.get(worker_name)
    }
}

// ============================================================================
// PAYLOAD HELPERS
// ============================================================================

/// Parse an upstream timestamp
///
/// Accepts RFC 3339 ("2024-05-01T12:00:00.000Z") and naive ISO 8601, which is
/// taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

/// Numeric field that may arrive as a number, a numeric string or null
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Loose truthiness for flag fields (1/0, true/false, "1"/"0")
pub fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false")
        }
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
