/// Pool entry setup and validation
///
/// The non-interactive half of adding a pool: per-source metadata used to
/// build a form, filling derived fields, and a live validation round trip
/// that produces the final title and unique id.
use crate::errors::{PoolError, SetupError};
use crate::logger::{self, LogTag};
use crate::pools::{self, f2pool, mining_core, mining_dutch, solo_pool};
use crate::pools::{CryptoCoin, PoolConfig, PoolContext, PoolSource};

pub const PUBLIC_POOL_DEFAULT_URL: &str = "https://public-pool.io:40557/";
pub const MINING_CORE_DEFAULT_URL: &str = "http://umbrel.local:4000";

// ============================================================================
// SOURCE METADATA
// ============================================================================

impl PoolSource {
    /// Coin keys the user may pick from; empty when the pool reports it
    pub fn coins(&self) -> Vec<&'static str> {
        match self {
            PoolSource::F2Pool => f2pool::supported_coins().collect(),
            PoolSource::SoloPool => solo_pool::SUPPORTED_COINS.to_vec(),
            PoolSource::MiningDutch => mining_dutch::supported_coins().collect(),
            PoolSource::MiningCore => mining_core::SUPPORTED_COINS.to_vec(),
            PoolSource::PublicPool | PoolSource::CkPool => vec![CryptoCoin::Btc.key()],
            PoolSource::CoinMiners => Vec::new(),
        }
    }

    /// Coin implied by the source itself
    pub fn fixed_coin(&self) -> Option<CryptoCoin> {
        match self {
            PoolSource::PublicPool | PoolSource::CkPool => Some(CryptoCoin::Btc),
            _ => None,
        }
    }

    pub fn default_pool_url(&self) -> Option<&'static str> {
        match self {
            PoolSource::PublicPool => Some(PUBLIC_POOL_DEFAULT_URL),
            PoolSource::MiningCore => Some(MINING_CORE_DEFAULT_URL),
            _ => None,
        }
    }

    pub fn requires_pool_url(&self) -> bool {
        matches!(self, PoolSource::PublicPool | PoolSource::MiningCore)
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, PoolSource::F2Pool | PoolSource::MiningDutch)
    }

    pub fn requires_account_id(&self) -> bool {
        matches!(self, PoolSource::MiningDutch)
    }

    /// Whether the user chooses the coin (as opposed to fixed or discovered)
    pub fn requires_coin(&self) -> bool {
        self.fixed_coin().is_none() && !self.coins().is_empty()
    }
}

// ============================================================================
// ENTRY PREPARATION
// ============================================================================

/// Fill the fields implied by the source
///
/// - pool name from the source
/// - fixed coin (Public Pool, CKPool)
/// - default pool URL when none was given
/// - Mining Dutch uses the account id as the address
pub fn prepare_config(mut config: PoolConfig) -> Result<PoolConfig, SetupError> {
    let source = config.source()?;

    config.pool_name = source.name().to_string();

    if let Some(coin) = source.fixed_coin() {
        config.coin_key = coin.key().to_string();
    }

    if config.pool_url.is_none() {
        config.pool_url = source.default_pool_url().map(str::to_string);
    }

    if source.requires_account_id() {
        if let Some(account_id) = config.account_id.clone() {
            config.address = account_id;
        }
    }

    Ok(config)
}

/// Display name for a coin key, or the key itself when unknown
pub fn coin_display_name(coin_key: &str) -> String {
    CryptoCoin::from_key(coin_key)
        .map(|coin| coin.name())
        .unwrap_or_else(|| coin_key.to_string())
}

/// Derive coin name, title and unique id
pub fn finalize_config(mut config: PoolConfig) -> PoolConfig {
    config.coin_name = coin_display_name(&config.coin_key);
    config.title = format!(
        "{} - {} - {}",
        config.pool_name, config.coin_name, config.address
    );
    config.unique_id = format!(
        "{}_{}_{}",
        config.pool_key,
        config.coin_key,
        config.address.to_lowercase()
    );
    config
}

/// Validate an entry against the live pool
///
/// Builds the client, runs its one-time initialization and a single data
/// fetch. `context.config` holds the user's input; the returned config is
/// complete and ready to store.
pub async fn validate_entry(context: PoolContext) -> Result<PoolConfig, SetupError> {
    let mut context = context;
    context.config = prepare_config(context.config)?;
    let config = context.config.clone();

    logger::debug(
        LogTag::Setup,
        &format!("Validating {} entry for {}", config.pool_key, config.address),
    );

    let client = pools::select(&config.pool_key, context)?;

    let result = async {
        let config = client.initialize(config).await?;
        client.get_data().await?;
        Ok::<_, PoolError>(config)
    }
    .await;

    match result {
        Ok(config) => {
            let config = finalize_config(config);
            logger::info(LogTag::Setup, &format!("Validated {}", config.title));
            Ok(config)
        }
        Err(error) => {
            let error = SetupError::from(error);
            logger::warning(
                LogTag::Setup,
                &format!("Validation failed ({}): {}", error.error_key(), error),
            );
            Err(error)
        }
    }
}
