/// Canonical pool data model
///
/// Every adapter maps its upstream payload into these shapes. `None` on an
/// optional field means the pool's API does not expose it, never zero.
use crate::config_struct;
use crate::errors::PoolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// POOL RESULT TYPES
// ============================================================================

/// One worker's figures from a single poll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolAddressWorkerData {
    /// Unique within one poll response
    pub name: String,
    pub best_difficulty: Option<f64>,
    /// Always GH/s once it leaves an adapter
    pub hash_rate: Option<f64>,
    pub is_online: bool,
}

impl PoolAddressWorkerData {
    pub fn new(
        name: impl Into<String>,
        best_difficulty: Option<f64>,
        hash_rate: Option<f64>,
        is_online: bool,
    ) -> Self {
        Self {
            name: name.into(),
            best_difficulty,
            hash_rate,
            is_online,
        }
    }
}

/// Aggregate result of one poll for one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolAddressData {
    pub total_paid: Option<f64>,
    pub current_balance: Option<f64>,
    pub best_difficulty: Option<f64>,
    pub worker_count: u64,
    pub workers: Vec<PoolAddressWorkerData>,
}

impl PoolAddressData {
    /// Look up a worker by name
    pub fn worker(&self, name: &str) -> Option<&PoolAddressWorkerData> {
        self.workers.iter().find(|w| w.name == name)
    }

    /// Sum of all workers' hash rate in GH/s
    pub fn total_hash_rate(&self) -> f64 {
        self.workers.iter().filter_map(|w| w.hash_rate).sum()
    }

    pub fn online_workers(&self) -> usize {
        self.workers.iter().filter(|w| w.is_online).count()
    }
}

// ============================================================================
// POOL CONFIGURATION
// ============================================================================

config_struct! {
    /// Settings for one monitored pool address
    ///
    /// Built once by the setup flow (or read from the config file) and
    /// read-only afterwards.
    #[derive(PartialEq)]
    pub struct PoolConfig {
        /// Source key, one of [`PoolSource`]
        pool_key: String = String::new(),
        pool_name: String = String::new(),
        pool_url: Option<String> = None,
        /// Wallet address or account name
        address: String = String::new(),
        coin_key: String = String::new(),
        coin_name: String = String::new(),
        api_key: Option<String> = None,
        account_id: Option<String> = None,
        title: String = String::new(),
        unique_id: String = String::new(),
    }
}

impl PoolConfig {
    pub fn new(source: PoolSource, address: impl Into<String>) -> Self {
        Self {
            pool_key: source.key().to_string(),
            pool_name: source.name().to_string(),
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_pool_url(mut self, url: impl Into<String>) -> Self {
        self.pool_url = Some(url.into());
        self
    }

    pub fn with_coin(mut self, coin_key: impl Into<String>) -> Self {
        self.coin_key = coin_key.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Parsed source, if the key is one of the supported ones
    pub fn source(&self) -> Result<PoolSource, PoolError> {
        self.pool_key.parse()
    }
}

// ============================================================================
// POOL SOURCES
// ============================================================================

/// The fixed set of supported upstream APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolSource {
    PublicPool,
    F2Pool,
    SoloPool,
    CoinMiners,
    CkPool,
    MiningDutch,
    MiningCore,
}

impl PoolSource {
    pub const ALL: [PoolSource; 7] = [
        PoolSource::CoinMiners,
        PoolSource::PublicPool,
        PoolSource::F2Pool,
        PoolSource::SoloPool,
        PoolSource::CkPool,
        PoolSource::MiningDutch,
        PoolSource::MiningCore,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PoolSource::PublicPool => "public_pool",
            PoolSource::F2Pool => "f2_pool",
            PoolSource::SoloPool => "solo_pool",
            PoolSource::CoinMiners => "coin_miners",
            PoolSource::CkPool => "ck_pool",
            PoolSource::MiningDutch => "mining_dutch",
            PoolSource::MiningCore => "mining_core",
        }
    }

    /// Human readable pool name
    pub fn name(&self) -> &'static str {
        match self {
            PoolSource::PublicPool => "Public Pool",
            PoolSource::F2Pool => "f2pool",
            PoolSource::SoloPool => "SoloPool.org",
            PoolSource::CoinMiners => "Coin-Miners.info",
            PoolSource::CkPool => "CKPool",
            PoolSource::MiningDutch => "Mining Dutch",
            PoolSource::MiningCore => "Mining Core",
        }
    }
}

impl FromStr for PoolSource {
    type Err = PoolError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        PoolSource::ALL
            .iter()
            .copied()
            .find(|source| source.key() == key)
            .ok_or_else(|| PoolError::UnsupportedSource(key.to_string()))
    }
}

impl fmt::Display for PoolSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ============================================================================
// COINS
// ============================================================================

macro_rules! crypto_coins {
    ($($variant:ident => $key:literal),* $(,)?) => {
        /// Coin keys known to at least one pool
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum CryptoCoin {
            $($variant,)*
        }

        impl CryptoCoin {
            pub const ALL: &'static [CryptoCoin] = &[$(CryptoCoin::$variant,)*];

            /// Lower-case key used in configuration and URLs
            pub fn key(&self) -> &'static str {
                match self {
                    $(CryptoCoin::$variant => $key,)*
                }
            }

            /// Upper-case ticker shown to users
            pub fn name(&self) -> String {
                self.key().to_uppercase()
            }

            pub fn from_key(key: &str) -> Option<CryptoCoin> {
                match key {
                    $($key => Some(CryptoCoin::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

crypto_coins! {
    Btc => "btc",
    Bch => "bch",
    Aleo => "aleo",
    Bells => "bells",
    Btg => "btg",
    Cfx => "cfx",
    Ckb => "ckb",
    Clore => "clore",
    Dash => "dash",
    Doge => "doge",
    Ela => "ela",
    Ehhw => "ehhw",
    Fb => "fb",
    Erg => "erg",
    Etc => "etc",
    Ethw => "ethw",
    Htr => "htr",
    Iron => "iron",
    Jkc => "jkc",
    Kas => "kas",
    Kda => "kda",
    Ltc => "ltc",
    Lky => "lky",
    Neox => "neox",
    Nexa => "nexa",
    Nmc => "nmc",
    Octa => "octa",
    Pep => "pep",
    Rvn => "rvn",
    Sdr => "sdr",
    Xna => "xna",
    Xec => "xec",
    Xel => "xel",
    Xmr => "xmr",
    Zec => "zec",
    Zen => "zen",
    Zeph => "zeph",
}

impl fmt::Display for CryptoCoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
